//! Rewrites shared by several dialect pairs.

use std::ops::Range;

use crate::parser;
use crate::scan::{self, Segment, Splice};

pub const DATE_PATTERN_WARNING: &str =
    "Warning: Make sure you use the correct date patterns for your target language.";

/// Wrap a date-valued argument in `date(...)` unless it already starts with one.
pub fn wrap_date(expr: &str) -> String {
    let expr = expr.trim();
    if expr.starts_with("date(") {
        expr.to_string()
    } else {
        format!("date({expr})")
    }
}

fn is_simple(expr: &str) -> bool {
    !expr.is_empty() && expr.bytes().all(|b| scan::is_ident(b) || b == b'.')
}

/// A date unit argument, quoted (`'day'`) or bare (`day`).
pub fn unit_name(arg: &str) -> &str {
    parser::quoted_word(arg).unwrap_or_else(|| arg.trim())
}

/// Arithmetic negation, parenthesising compound expressions.
pub fn negate(expr: &str) -> String {
    let expr = expr.trim();
    if let Some(positive) = expr.strip_prefix('-').map(str::trim_start) {
        if is_simple(positive) {
            return positive.to_string();
        }
    }
    if is_simple(expr) {
        format!("-{expr}")
    } else {
        format!("-({expr})")
    }
}

/// Shift every array subscript by `delta` (`-1` turns 1-based indexes into 0-based ones).
///
/// Array literals (`array[...]`) and quoted map keys are not subscripts.
pub fn shift_subscripts(text: &str, delta: i64) -> (String, usize) {
    let mut count = 0;
    let out = shift_in(text, delta, &mut count);
    (out, count)
}

fn shift_in(text: &str, delta: i64, count: &mut usize) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = scan::opaque_end(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'[' => {
                let Some(close) = scan::matching_close(text, i) else {
                    i += 1;
                    continue;
                };
                let inner = shift_in(&text[i + 1..close], delta, count);
                out.push_str(&text[last..=i]);
                let key = inner.trim_start();
                if is_subscript(text, i) && !key.is_empty() && !key.starts_with(['\'', '"']) {
                    out.push_str(&shift_index(&inner, delta));
                    *count += 1;
                } else {
                    out.push_str(&inner);
                }
                out.push(']');
                i = close + 1;
                last = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&text[last..]);
    out
}

fn is_subscript(text: &str, open: usize) -> bool {
    let bytes = text.as_bytes();
    match open.checked_sub(1).map(|p| bytes[p]) {
        Some(b')' | b']') => true,
        Some(b) if scan::is_ident(b) => scan::word_before(text, open).is_none_or(|word| &text[word] != "array"),
        _ => false,
    }
}

fn shift_index(index: &str, delta: i64) -> String {
    let index = index.trim();
    if let Some(n) = index.parse::<i64>().ok().and_then(|n| n.checked_add(delta)) {
        return n.to_string();
    }
    if delta.abs() == 1 {
        let undo = if delta < 0 { '+' } else { '-' };
        let base = index
            .strip_suffix('1')
            .map(str::trim_end)
            .and_then(|rest| rest.strip_suffix(undo))
            .map(str::trim_end);
        if let Some(base) = base {
            if !base.is_empty() && !base.ends_with(['+', '-', '*', '/', '%']) {
                return base.to_string();
            }
        }
    }
    if delta < 0 {
        format!("{index}-{}", -delta)
    } else {
        format!("{index}+{delta}")
    }
}

/// Split `array_agg(x)[ over (w)]` into `x` and the window clause.
pub fn distinct_aggregate(args: &str) -> Option<(String, String)> {
    let args = args.trim();
    let site = scan::find_call(args, 0, &["array_agg"], b'(')?;
    if site.start != 0 {
        return None;
    }
    let rest = &args[site.close + 1..];
    let window = if rest.trim().is_empty() {
        ""
    } else {
        let (left, window) = parser::over_clause(rest).ok()?;
        if !left.trim().is_empty() {
            return None;
        }
        window
    };
    Some((args[site.open + 1..site.close].trim().to_string(), window.to_string()))
}

/// `extract(epoch from x)` → `function(x)`.
pub fn epoch_to_call(text: &str, function: &str) -> (String, usize) {
    scan::rewrite_calls(text, &["extract"], b'(', |call| {
        parser::epoch_source(call.args).map(|source| Splice::new(format!("{function}({source})")))
    })
}

/// `function(x)` → `extract(epoch from x)`; without arguments the current time is used.
pub fn call_to_epoch(text: &str, functions: &[&str]) -> (String, usize) {
    scan::rewrite_calls(text, functions, b'(', |call| match scan::split_args(call.args).as_slice() {
        [] => Some(Splice::new("extract(epoch from current_timestamp)")),
        [source] => Some(Splice::new(format!("extract(epoch from {source})"))),
        _ => None,
    })
}

/// `date_part(part, x)` → `extract(part from x)`.
pub fn date_part_to_extract(text: &str) -> (String, usize) {
    scan::rewrite_calls(text, &["date_part"], b'(', |call| match scan::split_args(call.args).as_slice() {
        [part, source] => {
            let part = parser::quoted_word(part).unwrap_or(*part);
            Some(Splice::new(format!("extract({part} from {source})")))
        }
        _ => None,
    })
}

/// Two-argument percentile calls → Vertica `approximate_percentile(x using parameters percentile=p)`.
pub fn percentile_to_vertica(text: &str, functions: &[&str]) -> (String, usize) {
    scan::rewrite_calls(text, functions, b'(', |call| match scan::split_args(call.args).as_slice() {
        [expr, percentile] => Some(Splice::new(format!(
            "approximate_percentile({expr} using parameters percentile={percentile})"
        ))),
        _ => None,
    })
}

/// Vertica `approximate_percentile(...)` → `function(x, p)`.
pub fn percentile_from_vertica(text: &str, function: &str) -> (String, usize) {
    scan::rewrite_calls(text, &["approximate_percentile"], b'(', |call| {
        parser::percentile_parameters(call.args)
            .map(|(expr, percentile)| Splice::new(format!("{function}({expr}, {percentile})")))
    })
}

/// `if(c, a, b)` → `case when c then a else b end`.
pub fn if_to_case(text: &str) -> (String, usize) {
    scan::rewrite_calls(text, &["if"], b'(', |call| match scan::split_args(call.args).as_slice() {
        [condition, then, otherwise] => Some(Splice::new(format!(
            "case when {condition} then {then} else {otherwise} end"
        ))),
        _ => None,
    })
}

/// Single-branch searched `case when c then a else b end` → `if(c, a, b)`.
pub fn case_to_if(text: &str) -> (String, usize) {
    let mut count = 0;
    let out = case_to_if_in(text, &mut count);
    (out, count)
}

fn case_to_if_in(text: &str, count: &mut usize) -> String {
    let words = scan::words(text);
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    let mut idx = 0;
    while idx < words.len() {
        let case = &words[idx];
        if &text[case.clone()] != "case" {
            idx += 1;
            continue;
        }
        let Some(end_idx) = matching_end(text, &words, idx) else {
            break;
        };
        let end = &words[end_idx];
        let body = case_to_if_in(&text[case.end..end.start], count);
        out.push_str(&text[pos..case.start]);
        match single_branch(&body) {
            Some((condition, then, otherwise)) => {
                let replacement = format!("if({condition}, {then}, {otherwise})");
                out.push_str(&scan::carry_newlines(&text[case.start..end.end], replacement));
                *count += 1;
            }
            None => {
                out.push_str("case");
                out.push_str(&body);
                out.push_str("end");
            }
        }
        pos = end.end;
        idx = end_idx + 1;
    }
    out.push_str(&text[pos..]);
    out
}

fn matching_end(text: &str, words: &[Range<usize>], case_idx: usize) -> Option<usize> {
    let mut nesting = 0usize;
    for (idx, word) in words.iter().enumerate().skip(case_idx + 1) {
        match &text[word.clone()] {
            "case" => nesting += 1,
            "end" if nesting == 0 => return Some(idx),
            "end" => nesting -= 1,
            _ => {}
        }
    }
    None
}

fn single_branch(body: &str) -> Option<(&str, &str, &str)> {
    let depth = scan::depth_map(body);
    let mut nesting = 0usize;
    let mut marks = Vec::new();
    for word in scan::words(body) {
        let name = &body[word.clone()];
        match name {
            "case" => nesting += 1,
            "end" => nesting = nesting.saturating_sub(1),
            "when" | "then" | "else" if nesting == 0 && depth[word.start] == Some(0) => marks.push((name, word)),
            _ => {}
        }
    }
    let [(when, w), (then, t), (otherwise, e)] = marks.as_slice() else {
        return None;
    };
    if (*when, *then, *otherwise) != ("when", "then", "else") || !body[..w.start].trim().is_empty() {
        return None;
    }
    let parts = (
        body[w.end..t.start].trim(),
        body[t.end..e.start].trim(),
        body[e.end..].trim(),
    );
    (!parts.0.is_empty() && !parts.1.is_empty() && !parts.2.is_empty()).then_some(parts)
}

/// One `lhs [not] op rhs` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfixSite {
    pub span: Range<usize>,
    pub lhs: Range<usize>,
    pub negated: bool,
    pub rhs: Range<usize>,
}

/// First `op` word whose operands can be located.
pub fn find_infix(text: &str, op: &str) -> Option<InfixSite> {
    let bytes = text.as_bytes();
    scan::words(text)
        .into_iter()
        .filter(|word| &text[word.clone()] == op)
        .find_map(|word| {
            let (negated, lhs_end) = match scan::word_before(text, word.start) {
                Some(prev) if &text[prev.clone()] == "not" => (true, prev.start),
                _ => (false, word.start),
            };
            let lhs_start = scan::operand_start(text, lhs_end)?;
            let rhs_end = scan::operand_end(text, word.end)?;
            let lhs_end = text[..lhs_end].trim_end().len();
            Some(InfixSite {
                span: lhs_start..rhs_end,
                lhs: lhs_start..lhs_end,
                negated,
                rhs: scan::skip_whitespace(bytes, word.end)..rhs_end,
            })
        })
}

/// Rewrite every `lhs [not] op rhs` with `build(lhs, negated, rhs)`.
pub fn rewrite_infix(text: &str, op: &str, build: impl Fn(&str, bool, &str) -> String) -> (String, usize) {
    scan::fixed_point(text, |current| {
        let site = find_infix(current, op)?;
        let replacement = build(&current[site.lhs.clone()], site.negated, &current[site.rhs.clone()]);
        Some(scan::splice(current, site.span, replacement))
    })
}

/// Swap the delimiters of `from`-quoted regions for `to`, counting characters.
pub fn swap_quotes(text: &str, from: char, to: char) -> (String, usize) {
    let mut count = 0;
    let out = scan::segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Opaque(quoted) if quoted.starts_with(from) => {
                count += quoted.matches(from).count();
                quoted.replace(from, to.encode_utf8(&mut [0; 4]))
            }
            Segment::Code(other) | Segment::Opaque(other) => other.to_string(),
        })
        .collect::<String>();
    (out, count)
}
