//! Balanced-expression scanning over raw SQL text.
//!
//! Nothing here tokenizes SQL. The scanners walk bytes, jump over quoted
//! regions (`'...'`, `"..."`, `` `...` ``) and `/* ... */` comments, and
//! track `(`/`[` depth on one stack. That is enough to find call sites, split argument lists on
//! top-level commas and locate the operands of infix operators.
//!
//! All offsets are byte offsets. Every delimiter the scanners stop at is
//! ASCII, so the offsets they return are always valid `str` boundaries.

use std::ops::Range;

/// Words that never form part of an operand to the left of an infix operator.
const OPERAND_STOP_WORDS: &[&str] = &[
    "select", "where", "and", "or", "not", "in", "on", "when", "then", "else", "by", "as", "from",
    "join", "case", "having", "like", "is", "return",
];

pub fn is_quote(b: u8) -> bool {
    matches!(b, b'\'' | b'"' | b'`')
}

pub fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Index just past the quoted region opened at `start`, or the end of input
/// when the quote is never closed. A doubled quote simply re-enters a new
/// region, which spans the same bytes as an escaped one.
pub fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    bytes[start + 1..]
        .iter()
        .position(|&b| b == quote)
        .map_or(bytes.len(), |p| start + 1 + p + 1)
}

fn is_comment_start(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*')
}

/// Index just past the block comment opened at `start`, or the end of input
/// when it is never closed.
pub fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |p| start + 2 + p + 2)
}

/// End of the quoted region or block comment that starts at `i`, if one does.
///
/// Rules never look inside either, so every forward scanner jumps over them
/// through this.
pub fn opaque_end(bytes: &[u8], i: usize) -> Option<usize> {
    if is_quote(bytes[i]) {
        Some(skip_quoted(bytes, i))
    } else if is_comment_start(bytes, i) {
        Some(skip_block_comment(bytes, i))
    } else {
        None
    }
}

/// `text` with every block comment blanked out, byte offsets unchanged.
pub fn blank_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        match opaque_end(bytes, i) {
            Some(end) if is_comment_start(bytes, i) => {
                out.push_str(&text[last..i]);
                out.extend(bytes[i..end].iter().map(|&b| if b == b'\n' { '\n' } else { ' ' }));
                i = end;
                last = end;
            }
            Some(end) => i = end,
            None => i += 1,
        }
    }
    out.push_str(&text[last..]);
    out
}

/// A slice of query text: plain code, or an opaque region (a quoted
/// literal or a block comment, delimiters included).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Code(&'a str),
    Opaque(&'a str),
}

pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = opaque_end(bytes, i) {
            if start < i {
                out.push(Segment::Code(&text[start..i]));
            }
            out.push(Segment::Opaque(&text[i..end]));
            start = end;
            i = end;
        } else {
            i += 1;
        }
    }
    if start < bytes.len() {
        out.push(Segment::Code(&text[start..]));
    }
    out
}

/// Apply `f` to every code segment, copying opaque regions verbatim.
pub fn map_code(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in segments(text) {
        match segment {
            Segment::Code(code) => out.push_str(&f(code)),
            Segment::Opaque(quoted) => out.push_str(quoted),
        }
    }
    out
}

/// The code parts of `text`, joined by single spaces.
pub fn code_only(text: &str) -> String {
    segments(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Code(code) => Some(code),
            Segment::Opaque(_) => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bracket depth of every byte; `None` inside quoted regions and comments.
///
/// Brackets carry the depth of the expression they sit in, so the `(` and
/// `)` of `f(x)` both report the depth of `f`.
pub fn depth_map(text: &str) -> Vec<Option<u32>> {
    let bytes = text.as_bytes();
    let mut map = vec![None; bytes.len()];
    let mut depth: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = opaque_end(bytes, i) {
            i = end;
            continue;
        }
        let b = bytes[i];
        if matches!(b, b')' | b']') {
            depth = depth.saturating_sub(1);
        }
        map[i] = Some(depth);
        if matches!(b, b'(' | b'[') {
            depth += 1;
        }
        i += 1;
    }
    map
}

/// Index of the delimiter closing the `(` or `[` at `open`.
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if !matches!(bytes.get(open), Some(b'(' | b'[')) {
        return None;
    }
    let mut stack = Vec::new();
    let mut i = open;
    while i < bytes.len() {
        if let Some(end) = opaque_end(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' => stack.push(b')'),
            b'[' => stack.push(b']'),
            b @ (b')' | b']') => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the delimiter opening the `)` or `]` at `close`.
pub fn matching_open(text: &str, close: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if !matches!(bytes.get(close), Some(b')' | b']')) {
        return None;
    }
    let mut stack = Vec::new();
    let mut i = close + 1;
    while i > 0 {
        i -= 1;
        match bytes[i] {
            q if is_quote(q) => i = text[..i].rfind(q as char)?,
            b'/' if i > 0 && bytes[i - 1] == b'*' => i = text[..i - 1].rfind("/*")?,
            b')' => stack.push(b'('),
            b']' => stack.push(b'['),
            b @ (b'(' | b'[') => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Spans of the pieces of `text` separated by commas at depth zero.
pub fn split_top_level_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = opaque_end(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                spans.push(start..i);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    spans.push(start..bytes.len());
    spans
}

pub fn split_top_level(text: &str) -> Vec<&str> {
    split_top_level_spans(text)
        .into_iter()
        .map(|span| &text[span])
        .collect()
}

/// Top-level arguments, trimmed. An empty argument list yields no arguments.
pub fn split_args(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    split_top_level(text).into_iter().map(str::trim).collect()
}

/// Spans of identifier-like words outside quoted regions and comments.
pub fn words(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = opaque_end(bytes, i) {
            i = end;
        } else if is_ident(bytes[i]) {
            let start = i;
            while i < bytes.len() && is_ident(bytes[i]) {
                i += 1;
            }
            out.push(start..i);
        } else {
            i += 1;
        }
    }
    out
}

/// The word ending right before `end`, ignoring whitespace in between.
pub fn word_before(text: &str, end: usize) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    let mut i = end;
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    let stop = i;
    while i > 0 && is_ident(bytes[i - 1]) {
        i -= 1;
    }
    (i < stop).then_some(i..stop)
}

pub fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn preceded_by_dot(bytes: &[u8], start: usize) -> bool {
    start > 0 && bytes[start - 1] == b'.'
}

/// A call site `name(...)` (or `name[...]`), all offsets absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub start: usize,
    pub name_end: usize,
    pub open: usize,
    pub close: usize,
}

/// Next balanced call to one of `names` starting at or after `from`.
///
/// The name must be a whole word, not a qualified member (`t.size(...)`), and
/// may be separated from its delimiter by whitespace.
pub fn find_call(text: &str, from: usize, names: &[&str], open: u8) -> Option<CallSite> {
    let bytes = text.as_bytes();
    words(text)
        .into_iter()
        .filter(|word| word.start >= from)
        .filter(|word| names.contains(&&text[word.clone()]) && !preceded_by_dot(bytes, word.start))
        .find_map(|word| {
            let delim = skip_whitespace(bytes, word.end);
            if bytes.get(delim) != Some(&open) {
                return None;
            }
            matching_close(text, delim).map(|close| CallSite {
                start: word.start,
                name_end: word.end,
                open: delim,
                close,
            })
        })
}

/// A matched call handed to a [`rewrite_calls`] callback.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub name: &'a str,
    /// Argument text, with nested calls already rewritten.
    pub args: &'a str,
    /// Everything after the closing delimiter.
    pub tail: &'a str,
}

/// Replacement for a call; `consumed` bytes of the tail are replaced as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    pub consumed: usize,
}

impl Splice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            consumed: 0,
        }
    }

    pub fn consuming(text: impl Into<String>, consumed: usize) -> Self {
        Self {
            text: text.into(),
            consumed,
        }
    }
}

/// Rewrite every call to one of `names`, innermost first.
///
/// Scanning resumes after each substitution, so a replacement that contains
/// the matched name again is never revisited. Returns the new text and the
/// number of calls the callback replaced.
pub fn rewrite_calls<F>(text: &str, names: &[&str], open: u8, mut f: F) -> (String, usize)
where
    F: FnMut(&Call<'_>) -> Option<Splice>,
{
    let mut count = 0;
    let out = rewrite_calls_in(text, names, open, &mut f, &mut count);
    (out, count)
}

fn rewrite_calls_in<F>(text: &str, names: &[&str], open: u8, f: &mut F, count: &mut usize) -> String
where
    F: FnMut(&Call<'_>) -> Option<Splice>,
{
    let close = if open == b'[' { ']' } else { ')' };
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(site) = find_call(text, pos, names, open) {
        out.push_str(&text[pos..site.start]);
        let args = rewrite_calls_in(&text[site.open + 1..site.close], names, open, f, count);
        let tail = &text[site.close + 1..];
        let call = Call {
            name: &text[site.start..site.name_end],
            args: &args,
            tail,
        };
        match f(&call) {
            Some(splice) => {
                let end = site.close + 1 + splice.consumed.min(tail.len());
                out.push_str(&carry_newlines(&text[site.start..end], splice.text));
                *count += 1;
                pos = end;
            }
            None => {
                out.push_str(&text[site.start..=site.open]);
                out.push_str(&args);
                out.push(close);
                pos = site.close + 1;
            }
        }
    }
    out.push_str(&text[pos..]);
    out
}

/// Rename calls: `from(` becomes `to(`, whitespace before the paren kept.
pub fn rename_calls(text: &str, from: &[&str], to: &str) -> (String, usize) {
    let bytes = text.as_bytes();
    rename_where(text, to, |word| {
        from.contains(&&text[word.clone()])
            && !preceded_by_dot(bytes, word.start)
            && bytes.get(skip_whitespace(bytes, word.end)) == Some(&b'(')
    })
}

/// Rename a whole word; with `unless_sized`, occurrences followed by `(` stay.
pub fn rename_words(text: &str, from: &str, to: &str, unless_sized: bool) -> (String, usize) {
    let bytes = text.as_bytes();
    rename_where(text, to, |word| {
        &text[word.clone()] == from
            && !preceded_by_dot(bytes, word.start)
            && !(unless_sized && bytes.get(skip_whitespace(bytes, word.end)) == Some(&b'('))
    })
}

fn rename_where(text: &str, to: &str, mut hit: impl FnMut(&Range<usize>) -> bool) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    for word in words(text) {
        if hit(&word) {
            out.push_str(&text[last..word.start]);
            out.push_str(to);
            last = word.end;
            count += 1;
        }
    }
    out.push_str(&text[last..]);
    (out, count)
}

/// Start of the operand that ends at `end` (trailing whitespace skipped).
///
/// Follows balanced brackets, call names, qualified names and quoted
/// literals leftwards, e.g. `t.col`, `f(a, b)`, `arr[1]`, `'x'`.
pub fn operand_start(text: &str, end: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = end;
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    let stop = i;
    while i > 0 {
        match bytes[i - 1] {
            b')' | b']' => {
                i = matching_open(text, i - 1)?;
                if let Some(word) = word_before(text, i) {
                    if word.end < i && !OPERAND_STOP_WORDS.contains(&&text[word.clone()]) {
                        i = word.end;
                    }
                }
            }
            q if is_quote(q) => i = text[..i - 1].rfind(q as char)?,
            b if is_ident(b) || b == b'.' => {
                while i > 0 && (is_ident(bytes[i - 1]) || bytes[i - 1] == b'.') {
                    i -= 1;
                }
            }
            _ => break,
        }
    }
    (i < stop).then_some(i)
}

/// End of the operand that starts at `start` (leading whitespace skipped).
pub fn operand_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let begin = skip_whitespace(bytes, start);
    let mut i = begin;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    while i < bytes.len() {
        match bytes[i] {
            q if is_quote(q) => i = skip_quoted(bytes, i),
            b'/' if is_comment_start(bytes, i) => break,
            b'(' | b'[' => i = matching_close(text, i)? + 1,
            b if is_ident(b) || b == b'.' => {
                while i < bytes.len() && (is_ident(bytes[i]) || bytes[i] == b'.') {
                    i += 1;
                }
            }
            _ => break,
        }
    }
    (i > begin).then_some(i)
}

/// Repeat a single-site rewrite until it reports no match.
///
/// The loop is capped at one iteration per input byte, so a step whose
/// output still matches cannot spin forever.
pub fn fixed_point(text: &str, mut step: impl FnMut(&str) -> Option<String>) -> (String, usize) {
    let mut current = text.to_string();
    let mut count = 0;
    for _ in 0..=text.len() {
        match step(&current) {
            Some(next) => {
                current = next;
                count += 1;
            }
            None => break,
        }
    }
    (current, count)
}

/// Replace `span` of `text`, keeping its newline count.
pub fn splice(text: &str, span: Range<usize>, replacement: String) -> String {
    let replacement = carry_newlines(&text[span.clone()], replacement);
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..span.start]);
    out.push_str(&replacement);
    out.push_str(&text[span.end..]);
    out
}

/// Re-append the newlines a rewrite dropped so line-based bookkeeping
/// (comment reinsertion) stays aligned.
pub fn carry_newlines(original: &str, mut replacement: String) -> String {
    let lost = original
        .matches('\n')
        .count()
        .saturating_sub(replacement.matches('\n').count());
    replacement.extend(std::iter::repeat_n('\n', lost));
    replacement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_close_nested() {
        let text = "f(a, g(b[1]), ')') + 1";
        assert_eq!(matching_close(text, 1), Some(17));
        assert_eq!(matching_open(text, 17), Some(1));
    }

    #[test]
    fn test_matching_close_unbalanced() {
        assert_eq!(matching_close("f(a, (b)", 1), None);
        assert_eq!(matching_close("f(a]", 1), None);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_args("a, f(b, c), 'x,y', arr[1, 2]"),
            vec!["a", "f(b, c)", "'x,y'", "arr[1, 2]"]
        );
        assert!(split_args("  ").is_empty());
    }

    #[test]
    fn test_segments_keep_quotes() {
        assert_eq!(
            segments("a = 'it''s' and \"b\""),
            vec![
                Segment::Code("a = "),
                Segment::Opaque("'it'"),
                Segment::Opaque("'s'"),
                Segment::Code(" and "),
                Segment::Opaque("\"b\""),
            ]
        );
    }

    #[test]
    fn test_block_comments_are_opaque() {
        let text = "a /* it's f(x */ , b";
        assert_eq!(
            segments(text),
            vec![
                Segment::Code("a "),
                Segment::Opaque("/* it's f(x */"),
                Segment::Code(" , b"),
            ]
        );
        assert_eq!(split_args(text), vec!["a /* it's f(x */", "b"]);
        assert_eq!(words(text), vec![0..1, 19..20]);
        assert_eq!(code_only("x /* y */ z"), "x   z");
    }

    #[test]
    fn test_brackets_inside_comments_are_ignored() {
        let text = "f(a /* ) don't */, b)";
        assert_eq!(matching_close(text, 1), Some(20));
        assert_eq!(matching_open(text, 20), Some(1));
        assert_eq!(skip_block_comment(b"/* open", 0), 7);
    }

    #[test]
    fn test_blank_comments_keeps_offsets() {
        assert_eq!(blank_comments("1 /* a\nb */ 'x/*y'"), "1     \n     'x/*y'");
    }

    #[test]
    fn test_rewrite_calls_innermost_first() {
        let (out, n) = rewrite_calls("array(1, array(2, 3))", &["array"], b'(', |call| {
            Some(Splice::new(format!("array[{}]", call.args)))
        });
        assert_eq!(out, "array[1, array[2, 3]]");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_rewrite_calls_skips_members_and_literals() {
        let (out, n) = rewrite_calls("t.size(a) + size(b) + 'size(c)'", &["size"], b'(', |call| {
            Some(Splice::new(format!("cardinality({})", call.args)))
        });
        assert_eq!(out, "t.size(a) + cardinality(b) + 'size(c)'");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_rewrite_calls_consumes_tail() {
        let (out, _) = rewrite_calls("f(x) over (w) y", &["f"], b'(', |call| {
            let window = " over (w)";
            call.tail
                .starts_with(window)
                .then(|| Splice::consuming(format!("g(f(x){window})"), window.len()))
        });
        assert_eq!(out, "g(f(x) over (w)) y");
    }

    #[test]
    fn test_rename_calls_and_words() {
        assert_eq!(rename_calls("pmod (a, 2), pmod", &["pmod"], "mod"), ("mod (a, 2), pmod".to_string(), 1));
        assert_eq!(
            rename_words("cast(a as varchar), cast(b as varchar(3))", "varchar", "string", true),
            ("cast(a as string), cast(b as varchar(3))".to_string(), 1)
        );
    }

    #[test]
    fn test_operand_bounds() {
        let text = "select f(a, b)::int, t.col::varchar";
        let cast = text.find("::").unwrap();
        assert_eq!(&text[operand_start(text, cast).unwrap()..cast], "f(a, b)");
        let text = "where name ilike '%x%'";
        let op = text.find("ilike").unwrap();
        assert_eq!(text[operand_start(text, op).unwrap()..op].trim_end(), "name");
        let end = operand_end(text, op + 5).unwrap();
        assert_eq!(text[op + 5..end].trim(), "'%x%'");
    }

    #[test]
    fn test_operand_start_stops_at_keyword() {
        let text = "where (a + b)::int";
        let cast = text.find("::").unwrap();
        assert_eq!(&text[operand_start(text, cast).unwrap()..cast], "(a + b)");
    }

    #[test]
    fn test_depth_map() {
        let map = depth_map("a(b)'c'");
        assert_eq!(map, vec![Some(0), Some(0), Some(1), Some(0), None, None, None]);
    }

    #[test]
    fn test_fixed_point_is_bounded() {
        let (_, n) = fixed_point("ab", |s| Some(s.to_string()));
        assert_eq!(n, 3);
    }

    #[test]
    fn test_carry_newlines() {
        assert_eq!(carry_newlines("a\nb\n", "ab".to_string()), "ab\n\n");
        assert_eq!(splice("x\ny z", 0..3, "q".to_string()), "q\n z");
    }
}
