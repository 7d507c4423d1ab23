//! Positional `GROUP BY` / `ORDER BY` resolution for Hive.
//!
//! Hive rejects `group by 1` unless a session parameter is set. Ordinals are
//! replaced by the select-list expression they point at; when the structure
//! cannot be scanned reliably the query is left alone and the session
//! parameter is emitted instead.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Match, Regex};
use thiserror::Error;
use tracing::debug;

use super::traits::Rewrite;
use crate::scan;

pub const POSITION_ALIAS_PREAMBLE: &str = "SET hive.groupby.orderby.position.alias=true;\n";

const GROUP_BY_LABEL: &str = "replace column positions in group by with column expressions";
const ORDER_BY_LABEL: &str = "replace column positions in order by with column expressions";
const FALLBACK_LABEL: &str = "change hive session parameters to use column positions";

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static SELECT: LazyLock<Regex> = LazyLock::new(|| regex(r"\bselect\b"));
static FROM: LazyLock<Regex> = LazyLock::new(|| regex(r"\bfrom\b"));
static GROUP_BY: LazyLock<Regex> = LazyLock::new(|| regex(r"\bgroup\s+by\b"));
static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| regex(r"\border\s+by\b"));
static GROUP_BY_END: LazyLock<Regex> =
    LazyLock::new(|| regex(r"\b(?:having|order\s+by|limit|union|window|qualify)\b|;"));
static ORDER_BY_END: LazyLock<Regex> = LazyLock::new(|| regex(r"\b(?:limit|union|window)\b|;"));
static FROM_SUBQUERY: LazyLock<Regex> = LazyLock::new(|| regex(r"\bfrom\s*\("));
static AS_ALIAS: LazyLock<Regex> = LazyLock::new(|| regex(r#"(?s)^(.*\S)\s+as\s+(?:\w+|`[^`]*`|"[^"]*")$"#));

/// Words after which a trailing identifier is an operand, not an alias.
const ALIAS_BLOCKERS: &[&str] = &[
    "and", "or", "not", "when", "then", "else", "is", "in", "like", "between", "case", "distinct",
    "interval", "by", "select", "from", "as",
];

/// Trailing words that are never aliases.
const NOT_ALIASES: &[&str] = &["end", "null", "true", "false"];

#[derive(Debug, Error)]
enum Unresolved {
    #[error("select without from references position {0}")]
    MissingFrom(usize),
    #[error("position {position} is out of range for {columns} columns")]
    OutOfRange { position: usize, columns: usize },
    #[error("position {0} refers to a star column")]
    Star(usize),
    #[error("positions used alongside a subquery in from")]
    Subquery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    GroupBy,
    OrderBy,
}

#[derive(Debug)]
struct Substitution {
    span: Range<usize>,
    expression: String,
    clause: Clause,
}

/// Replace ordinals in `group by` and `order by` clauses by column expressions.
pub fn resolve_positions(text: &str) -> Rewrite {
    match substitutions(text) {
        Ok(substitutions) => {
            let group_by = substitutions.iter().filter(|s| s.clause == Clause::GroupBy).count();
            let order_by = substitutions.len() - group_by;
            let mut out = text.to_string();
            for substitution in substitutions.iter().rev() {
                out.replace_range(substitution.span.clone(), &substitution.expression);
            }
            Rewrite::new(out)
                .counted(GROUP_BY_LABEL, group_by)
                .counted(ORDER_BY_LABEL, order_by)
        }
        Err(reason) => {
            debug!(%reason, "falling back to hive position aliases");
            Rewrite::new(text)
                .counted(FALLBACK_LABEL, 1)
                .with_preamble(POSITION_ALIAS_PREAMBLE)
        }
    }
}

fn substitutions(text: &str) -> Result<Vec<Substitution>, Unresolved> {
    let depth = scan::depth_map(text);
    let selects: Vec<(usize, usize, u32)> = SELECT
        .find_iter(text)
        .filter_map(|m| depth[m.start()].map(|d| (m.start(), m.end(), d)))
        .collect();

    let mut found = Vec::new();
    for (idx, &(_, body, d)) in selects.iter().enumerate() {
        let next_select = selects[idx + 1..].iter().find(|s| s.2 == d).map(|s| s.0);
        let scope_end = (body..text.len())
            .find(|&p| depth[p].is_some_and(|x| x < d))
            .unwrap_or(text.len())
            .min(next_select.unwrap_or(text.len()));

        let from = find_at_depth(&FROM, text, &depth, d, body..scope_end);
        let columns_end = from.map_or(scope_end, |m| m.start());
        let mut columns: Option<Vec<String>> = None;

        let clauses = [
            (Clause::GroupBy, &*GROUP_BY, &*GROUP_BY_END),
            (Clause::OrderBy, &*ORDER_BY, &*ORDER_BY_END),
        ];
        for (clause, keyword, terminator) in clauses {
            let Some(keyword) = find_at_depth(keyword, text, &depth, d, columns_end..scope_end) else {
                continue;
            };
            let clause_start = keyword.end();
            let clause_end = find_at_depth(terminator, text, &depth, d, clause_start..scope_end)
                .map_or(scope_end, |m| m.start());

            for span in scan::split_top_level_spans(&text[clause_start..clause_end]) {
                let entry_start = clause_start + span.start;
                let entry = &text[entry_start..clause_start + span.end];
                let Some((position, digits)) = ordinal(entry) else {
                    continue;
                };
                if from.is_none() {
                    return Err(Unresolved::MissingFrom(position));
                }
                let columns = columns.get_or_insert_with(|| select_columns(&text[body..columns_end]));
                let Some(expression) = position.checked_sub(1).and_then(|i| columns.get(i)) else {
                    return Err(Unresolved::OutOfRange {
                        position,
                        columns: columns.len(),
                    });
                };
                if expression == "*" || expression.ends_with(".*") {
                    return Err(Unresolved::Star(position));
                }
                found.push(Substitution {
                    span: entry_start + digits.start..entry_start + digits.end,
                    expression: expression.clone(),
                    clause,
                });
            }
        }
    }

    if !found.is_empty() && FROM_SUBQUERY.is_match(&scan::code_only(text)) {
        return Err(Unresolved::Subquery);
    }
    found.sort_by_key(|s| s.span.start);
    Ok(found)
}

fn find_at_depth<'t>(
    re: &Regex,
    text: &'t str,
    depth: &[Option<u32>],
    d: u32,
    range: Range<usize>,
) -> Option<Match<'t>> {
    re.find_iter(&text[..range.end])
        .find(|m| m.start() >= range.start && depth[m.start()] == Some(d))
}

/// The ordinal an entry refers to, with the span of its digits inside the entry.
fn ordinal(entry: &str) -> Option<(usize, Range<usize>)> {
    let entry = scan::blank_comments(entry);
    let core: String = entry
        .split_whitespace()
        .filter(|w| !matches!(*w, "asc" | "desc" | "nulls" | "first" | "last"))
        .collect();
    let core = core.trim_end_matches([')', ']']);
    if core.is_empty() || !core.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let position = core.parse().ok()?;
    let start = entry.find(core)?;
    Some((position, start..start + core.len()))
}

fn select_columns(list: &str) -> Vec<String> {
    let list = scan::blank_comments(list);
    let list = list.trim_start();
    let list = ["distinct", "all"]
        .iter()
        .find_map(|word| {
            list.strip_prefix(word)
                .filter(|rest| rest.starts_with(|c: char| c.is_ascii_whitespace()))
        })
        .unwrap_or(list);
    scan::split_top_level(list)
        .into_iter()
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(column_expression)
        .collect()
}

fn column_expression(column: &str) -> String {
    let expression = match AS_ALIAS.captures(column).and_then(|caps| caps.get(1)) {
        Some(expression) => expression.as_str(),
        None => strip_bare_alias(column),
    };
    scan::map_code(expression, collapse_whitespace)
}

fn strip_bare_alias(column: &str) -> &str {
    let Some(split) = column.rfind(|c: char| c.is_ascii_whitespace()) else {
        return column;
    };
    let head = column[..split].trim_end();
    let alias = &column[split + 1..];
    let is_alias = !alias.is_empty()
        && alias.bytes().all(scan::is_ident)
        && !alias.bytes().all(|b| b.is_ascii_digit())
        && !NOT_ALIASES.contains(&alias);
    if !is_alias || head.is_empty() {
        return column;
    }
    if head.ends_with(['+', '-', '*', '/', '%', '=', '<', '>', '|', '&', ',', '(', '\'', '"']) {
        return column;
    }
    match scan::word_before(head, head.len()) {
        Some(word) if word.end == head.len() && ALIAS_BLOCKERS.contains(&&head[word.clone()]) => column,
        _ => head,
    }
}

fn collapse_whitespace(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut blank = false;
    for ch in code.chars() {
        if ch.is_whitespace() {
            if !blank {
                out.push(' ');
            }
            blank = true;
        } else {
            out.push(ch);
            blank = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(text: &str) -> String {
        resolve_positions(text).text
    }

    #[test]
    fn test_group_by_positions() {
        let rewrite = resolve_positions("select a+1 as x, b from t group by 1, 2");
        assert_eq!(rewrite.text, "select a+1 as x, b from t group by a+1, b");
        assert_eq!(rewrite.total(), 2);
        assert_eq!(rewrite.preamble, None);
    }

    #[test]
    fn test_order_by_keeps_direction() {
        assert_eq!(
            resolved("select a, count(*) c from t group by 1 order by 2 desc"),
            "select a, count(*) c from t group by a order by count(*) desc"
        );
    }

    #[test]
    fn test_window_order_by_is_ignored() {
        assert_eq!(
            resolved("select a, row_number() over (partition by b order by 1) from t group by 1"),
            "select a, row_number() over (partition by b order by 1) from t group by a"
        );
    }

    #[test]
    fn test_nested_select_uses_its_own_columns() {
        assert_eq!(
            resolved("select x from t where y in (select z from u group by 1) group by 1"),
            "select x from t where y in (select z from u group by z) group by x"
        );
    }

    #[test]
    fn test_multiline_column_collapses() {
        assert_eq!(
            resolved("select case\n  when a then 1\n  else 2\nend as k\nfrom t\ngroup by 1"),
            "select case\n  when a then 1\n  else 2\nend as k\nfrom t\ngroup by case when a then 1 else 2 end"
        );
    }

    #[test]
    fn test_distinct_and_bare_alias() {
        assert_eq!(
            resolved("select distinct lower(name) n, a - b from t group by 1, 2"),
            "select distinct lower(name) n, a - b from t group by lower(name), a - b"
        );
    }

    #[test]
    fn test_operand_after_keyword_is_not_an_alias() {
        assert_eq!(
            resolved("select a, not b from t group by 2"),
            "select a, not b from t group by not b"
        );
    }

    #[test]
    fn test_block_comments_between_columns() {
        assert_eq!(
            resolved("select a /* the key */, /* it's */ b + 1 c from t group by 1, 2 /* last */"),
            "select a /* the key */, /* it's */ b + 1 c from t group by a, b + 1 /* last */"
        );
    }

    #[test]
    fn test_commented_out_select_is_ignored() {
        assert_eq!(
            resolved("select a /* select z from u group by 1 */ from t group by 1"),
            "select a /* select z from u group by 1 */ from t group by a"
        );
    }

    #[test]
    fn test_out_of_range_falls_back() {
        let rewrite = resolve_positions("select a from t group by 2");
        assert_eq!(rewrite.text, "select a from t group by 2");
        assert_eq!(rewrite.preamble.as_deref(), Some(POSITION_ALIAS_PREAMBLE));
        assert_eq!(rewrite.replacements[0].rule, FALLBACK_LABEL);
    }

    #[test]
    fn test_subquery_in_from_falls_back() {
        let rewrite = resolve_positions("select a from (select a from t) s group by 1");
        assert!(rewrite.preamble.is_some());
    }

    #[test]
    fn test_no_positions_no_preamble() {
        let rewrite = resolve_positions("select a from (select a from t) s group by a");
        assert_eq!(rewrite.preamble, None);
        assert_eq!(rewrite.total(), 0);
    }
}
