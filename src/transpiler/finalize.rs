//! Casing and cosmetic spacing.
//!
//! Rules operate on lowercased code. Once they are done, keywords and call
//! names are re-capitalised and comma/parenthesis spacing is canonicalised.
//! Quoted regions and block comments are never touched.

use std::sync::LazyLock;

use regex::Regex;

use crate::scan;

const KEYWORDS: &[&str] = &[
    "select", "from", "where", "by", "union", "all", "intersect", "except", "interval", "left",
    "right", "inner", "full", "outer", "join", "cross", "unnest", "lateral", "view", "explode",
    "between", "in", "as", "or", "and", "with", "set", "having", "limit", "like", "ilike", "rlike",
    "is", "not", "null", "partition", "over", "on", "case", "when", "then", "else", "end",
    "preceding", "following", "rows", "range", "unbounded", "current", "row", "date", "timestamp",
    "varchar", "double", "int", "integer", "string", "bool", "boolean", "bigint", "smallint",
    "tinyint", "float", "decimal", "numeric", "char", "insert", "into", "table", "desc", "asc",
    "distinct", "exists", "cast", "true", "false", "array", "using", "parameters",
];

static CALL_OR_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"\b(?:(?:group|order|partition)\s+by\b|(\w+)\s*\(|(?:{})\b)",
        KEYWORDS.join("|")
    );
    Regex::new(&pattern).expect("valid regex")
});

/// Lowercase code, leaving quoted regions untouched.
pub fn lowercase(text: &str) -> String {
    scan::map_code(text, str::to_lowercase)
}

/// Uppercase keywords and call names.
///
/// Names after a `.` are qualified members and stay as written. A call-like
/// token after `as` is an alias with a column list (`as t (c)`) or a type,
/// and is only uppercased when it is itself a keyword.
pub fn capitalize(text: &str) -> String {
    scan::map_code(text, |code| {
        let mut out = String::with_capacity(code.len());
        let mut last = 0;
        for caps in CALL_OR_KEYWORD.captures_iter(code) {
            let Some(token) = caps.get(0) else {
                continue;
            };
            let qualified = code[..token.start()].ends_with('.');
            let alias = caps.get(1).is_some_and(|name| {
                !KEYWORDS.contains(&name.as_str())
                    && scan::word_before(code, token.start()).is_some_and(|w| &code[w] == "as")
            });
            out.push_str(&code[last..token.start()]);
            if qualified || alias {
                out.push_str(token.as_str());
            } else {
                out.push_str(&token.as_str().to_uppercase());
            }
            last = token.end();
        }
        out.push_str(&code[last..]);
        out
    })
}

/// `a ,b` → `a, b`, `f(x )` → `f(x)`; a comma ending a line keeps no trailing space.
pub fn tidy(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = scan::opaque_end(bytes, i) {
            out.push_str(&text[i..end]);
            i = end;
            continue;
        }
        match bytes[i] {
            b',' => {
                trim_blanks(&mut out);
                out.push(',');
                i += 1;
                while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
                    i += 1;
                }
                if i < bytes.len() && !matches!(bytes[i], b'\n' | b'\r') {
                    out.push(' ');
                }
            }
            b')' => {
                trim_blanks(&mut out);
                out.push(')');
                i += 1;
            }
            _ => {
                let next = (i + 1..bytes.len())
                    .find(|&p| matches!(bytes[p], b',' | b')') || scan::opaque_end(bytes, p).is_some())
                    .unwrap_or(bytes.len());
                out.push_str(&text[i..next]);
                i = next;
            }
        }
    }
    out
}

fn trim_blanks(out: &mut String) {
    let kept = out.trim_end_matches([' ', '\t']).len();
    out.truncate(kept);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_keeps_literals() {
        assert_eq!(lowercase("SELECT 'ABC', \"Col\" FROM T"), "select 'ABC', \"Col\" from t");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(
            capitalize("select count (x), t.date, a from t group by a order by 1"),
            "SELECT COUNT (x), t.date, a FROM t GROUP BY a ORDER BY 1"
        );
    }

    #[test]
    fn test_capitalize_skips_alias_lists_and_literals() {
        assert_eq!(
            capitalize("cross join unnest(arr) as t (c) where s = 'select'"),
            "CROSS JOIN UNNEST(arr) AS t (c) WHERE s = 'select'"
        );
        assert_eq!(capitalize("cast(a as varchar(3))"), "CAST(a AS VARCHAR(3))");
    }

    #[test]
    fn test_tidy() {
        assert_eq!(tidy("f(a ,b,  c ) , 'x , y'"), "f(a, b, c), 'x , y'");
        assert_eq!(tidy("select a,\n  b"), "select a,\n  b");
        assert_eq!(tidy("f(a /* x , y ) */ ,b )"), "f(a /* x , y ) */, b)");
    }

    #[test]
    fn test_comments_keep_their_case() {
        assert_eq!(lowercase("SELECT /* Don't */ A"), "select /* Don't */ a");
        assert_eq!(capitalize("select /* from */ a from t"), "SELECT /* from */ a FROM t");
    }
}
