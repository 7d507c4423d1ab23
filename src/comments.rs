//! Line comment extraction and reinsertion.
//!
//! Rewrite rules must never see `--` comments, yet the translated query has
//! to carry them verbatim. [`extract`] strips every comment and records one
//! entry per newline of the stripped text; [`Extracted::restore`] zips the
//! final text back together with those records in a single pass.

use crate::scan;

/// A query with its line comments taken out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// The query without comments.
    pub text: String,
    /// One record per `\n` in `text`: either `"\n"` or `<spaces><comment>\n`.
    records: Vec<String>,
    /// A comment on the last line, which has no newline of its own.
    trailing: Option<String>,
}

/// Strip `--` comments outside quoted regions and block comments.
pub fn extract(query: &str) -> Extracted {
    let bytes = query.as_bytes();
    let mut text = String::with_capacity(query.len());
    let mut records = Vec::new();
    let mut trailing = None;
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(end) = scan::opaque_end(bytes, i) {
            let newlines = query[i..end].matches('\n').count();
            records.extend(std::iter::repeat_n("\n".to_string(), newlines));
            i = end;
            continue;
        }
        match bytes[i] {
            b'\n' => {
                records.push("\n".to_string());
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                text.push_str(&query[last..i]);
                let lead = take_trailing_blanks(&mut text);
                match query[i..].find('\n') {
                    Some(offset) => {
                        let end = i + offset;
                        records.push(format!("{lead}{}\n", &query[i..end]));
                        text.push('\n');
                        i = end + 1;
                    }
                    None => {
                        trailing = Some(format!("{lead}{}", &query[i..]));
                        i = bytes.len();
                    }
                }
                last = i;
            }
            _ => i += 1,
        }
    }
    text.push_str(&query[last..]);

    Extracted {
        text,
        records,
        trailing,
    }
}

fn take_trailing_blanks(text: &mut String) -> String {
    let kept = text.trim_end_matches([' ', '\t']).len();
    text.split_off(kept)
}

impl Extracted {
    /// Number of comments taken out of the query.
    pub fn comment_count(&self) -> usize {
        self.records.iter().filter(|r| r.as_str() != "\n").count() + usize::from(self.trailing.is_some())
    }

    /// Reinsert the recorded comments into `text`.
    ///
    /// Each `\n` of `text` is replaced by the next record. Newlines beyond
    /// the recorded ones stay bare, and comments left over when a rewrite
    /// removed lines are appended on their own lines.
    pub fn restore(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.records.iter().map(String::len).sum::<usize>());
        let mut records = self.records.iter();

        for (index, piece) in text.split('\n').enumerate() {
            if index > 0 {
                match records.next() {
                    Some(record) => out.push_str(record),
                    None => out.push('\n'),
                }
            }
            out.push_str(piece);
        }

        for record in records.filter(|r| r.as_str() != "\n") {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(record.trim_start_matches([' ', '\t']));
        }

        if let Some(comment) = &self.trailing {
            out.push_str(comment);
        }
        out
    }
}
