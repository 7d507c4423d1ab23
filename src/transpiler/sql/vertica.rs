//! Vertica rules.

use std::ops::Range;

use crate::scan::{self, Splice};
use crate::transpiler::common::{self, DATE_PATTERN_WARNING};
use crate::transpiler::dialect::Dialect;
use crate::transpiler::traits::{DialectRules, Rewrite, Rule};

pub const TO_CHAR_WARNING: &str =
    "Warning: This function can only translate TO_CHAR when it's used to cast a date as a string.";
pub const CONCAT_WARNING: &str =
    "Warning: CONCAT() was translated to ARRAY_JOIN(ARRAY[...], ','), which puts a comma between the parts.";
pub const LISTAGG_WARNING: &str =
    "Warning: Vertica's LISTAGG returns a comma-separated string, while Hive's COLLECT_LIST returns an array.";

pub struct VerticaRules;

impl DialectRules for VerticaRules {
    fn dialect(&self) -> Dialect {
        Dialect::Vertica
    }

    fn normalizer(&self, destination: Dialect) -> Vec<Rule> {
        let mut rules = vec![
            Rule::calls("ifnull -> coalesce", &["ifnull"], "coalesce"),
            Rule::custom("zeroifnull(x) -> coalesce(x, 0)", zeroifnull_to_coalesce),
            Rule::custom("nullifzero(x) -> if(x = 0, null, x)", nullifzero_to_if),
            Rule::word("bool -> boolean", "bool", "boolean"),
            Rule::custom(":: -> cast", double_colon_casts),
            Rule::calls("to_timestamp() -> from_unixtime()", &["to_timestamp"], "from_unixtime"),
            Rule::custom("remove ilike and consequently insert lower()", ilike_to_lower_like),
            Rule::custom("to_char() -> date_format()", to_char_to_date_format),
            Rule::custom("case when -> if", case_to_if),
        ];
        match destination {
            Dialect::Presto => rules.extend([
                Rule::custom("extract(epoch from date) -> to_unixtime()", epoch_to_unixtime),
                Rule::calls("array_length() -> cardinality()", &["array_length"], "cardinality"),
                Rule::custom("listagg() -> array_join(array_agg())", listagg_to_array_join),
                Rule::calls("array_avg() -> array_average()", &["array_avg"], "array_average"),
                Rule::custom("concat() -> array_join()", concat_to_array_join),
                Rule::calls(
                    "datediff() or timestampdiff() -> date_diff()",
                    &["datediff", "timestampdiff"],
                    "date_diff",
                ),
                Rule::calls("timestampadd() -> date_add()", &["timestampadd"], "date_add"),
                Rule::custom("timestamp_trunc() or trunc() -> date_format()", truncs_to_date_format),
                Rule::custom("date_part(part, date) -> extract(part from date)", date_part_to_extract),
                Rule::custom(
                    "approximate_percentile(using parameters) -> approx_percentile()",
                    percentile_to_presto,
                ),
            ]),
            Dialect::Hive => rules.extend([
                Rule::custom("extract(epoch from date) -> unix_timestamp()", epoch_to_unix_timestamp),
                Rule::calls("array_length() -> size()", &["array_length"], "size"),
                Rule::custom("listagg() -> collect_list()", listagg_to_collect_list),
                Rule::calls("timestamp_trunc() -> trunc()", &["timestamp_trunc"], "trunc"),
                Rule::custom(
                    "approximate_percentile(using parameters) -> percentile_approx()",
                    percentile_to_hive,
                ),
            ]),
            Dialect::Vertica => {}
        }
        rules
    }

    fn specializer(&self) -> Vec<Rule> {
        vec![
            Rule::calls("from_unixtime() -> to_timestamp()", &["from_unixtime"], "to_timestamp"),
            Rule::custom("if -> case when", if_to_case),
            Rule::custom("date_format() -> to_char() + cast as date", date_format_to_char),
        ]
    }
}

fn single_argument(text: &str, name: &str, build: impl Fn(&str) -> String) -> (String, usize) {
    scan::rewrite_calls(text, &[name], b'(', |call| match scan::split_args(call.args).as_slice() {
        [arg] => Some(Splice::new(build(arg))),
        _ => None,
    })
}

fn zeroifnull_to_coalesce(text: &str) -> Rewrite {
    let (out, count) = single_argument(text, "zeroifnull", |arg| format!("coalesce({arg}, 0)"));
    Rewrite::new(out).counted("zeroifnull(x) -> coalesce(x, 0)", count)
}

fn nullifzero_to_if(text: &str) -> Rewrite {
    let (out, count) = single_argument(text, "nullifzero", |arg| format!("if({arg} = 0, null, {arg})"));
    Rewrite::new(out).counted("nullifzero(x) -> if(x = 0, null, x)", count)
}

fn double_colon_casts(text: &str) -> Rewrite {
    let (out, count) = scan::fixed_point(text, |current| {
        let (span, replacement) = find_cast(current)?;
        Some(scan::splice(current, span, replacement))
    });
    Rewrite::new(out).counted(":: -> cast", count)
}

/// The first `operand::type` in code, with its `cast(operand as type)` form.
fn find_cast(text: &str) -> Option<(Range<usize>, String)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if let Some(end) = scan::opaque_end(bytes, i) {
            i = end;
            continue;
        }
        if bytes[i] == b':' && bytes[i + 1] == b':' {
            let operand = scan::operand_start(text, i);
            let ty = type_end(text, i + 2);
            if let (Some(start), Some(end)) = (operand, ty) {
                let replacement = format!("cast({} as {})", text[start..i].trim(), text[i + 2..end].trim());
                return Some((start..end, replacement));
            }
            i += 2;
            continue;
        }
        i += 1;
    }
    None
}

/// End of a type name such as `int`, `varchar(20)` or `numeric(10, 2)`.
fn type_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let begin = scan::skip_whitespace(bytes, start);
    let mut end = begin;
    while end < bytes.len() && scan::is_ident(bytes[end]) {
        end += 1;
    }
    if end == begin {
        return None;
    }
    let open = scan::skip_whitespace(bytes, end);
    if bytes.get(open) == Some(&b'(') {
        if let Some(close) = scan::matching_close(text, open) {
            return Some(close + 1);
        }
    }
    Some(end)
}

fn ilike_to_lower_like(text: &str) -> Rewrite {
    let (out, count) = common::rewrite_infix(text, "ilike", |lhs, negated, rhs| {
        let not = if negated { "not " } else { "" };
        format!("lower({lhs}) {not}like {rhs}")
    });
    Rewrite::new(out).counted("remove ilike and consequently insert lower()", count)
}

fn to_char_to_date_format(text: &str) -> Rewrite {
    let (out, count) = scan::rename_calls(text, &["to_char"], "date_format");
    Rewrite::new(out)
        .counted("to_char() -> date_format()", count)
        .warn_if(count > 0, TO_CHAR_WARNING)
        .warn_if(count > 0, DATE_PATTERN_WARNING)
}

fn case_to_if(text: &str) -> Rewrite {
    let (out, count) = common::case_to_if(text);
    Rewrite::new(out).counted("case when -> if", count)
}

fn if_to_case(text: &str) -> Rewrite {
    let (out, count) = common::if_to_case(text);
    Rewrite::new(out).counted("if -> case when", count)
}

fn epoch_to_unixtime(text: &str) -> Rewrite {
    let (out, count) = common::epoch_to_call(text, "to_unixtime");
    Rewrite::new(out).counted("extract(epoch from date) -> to_unixtime()", count)
}

fn epoch_to_unix_timestamp(text: &str) -> Rewrite {
    let (out, count) = common::epoch_to_call(text, "unix_timestamp");
    Rewrite::new(out).counted("extract(epoch from date) -> unix_timestamp()", count)
}

fn listagg_to_array_join(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["listagg"], b'(', |call| {
        Some(Splice::new(format!("array_join(array_agg({}), ',')", call.args.trim())))
    });
    Rewrite::new(out).counted("listagg() -> array_join(array_agg())", count)
}

fn concat_to_array_join(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["concat"], b'(', |call| {
        Some(Splice::new(format!("array_join(array[{}], ',')", call.args.trim())))
    });
    Rewrite::new(out)
        .counted("concat() -> array_join()", count)
        .warn_if(count > 0, CONCAT_WARNING)
}

fn listagg_to_collect_list(text: &str) -> Rewrite {
    let (out, count) = scan::rename_calls(text, &["listagg"], "collect_list");
    Rewrite::new(out)
        .counted("listagg() -> collect_list()", count)
        .warn_if(count > 0, LISTAGG_WARNING)
}

fn truncs_to_date_format(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["timestamp_trunc", "trunc"], b'(', |call| {
        match scan::split_args(call.args).as_slice() {
            [date, pattern] => Some(Splice::new(format!("date_format({date}, {pattern})"))),
            _ => None,
        }
    });
    Rewrite::new(out)
        .counted("timestamp_trunc() or trunc() -> date_format()", count)
        .warn_if(count > 0, DATE_PATTERN_WARNING)
}

fn date_part_to_extract(text: &str) -> Rewrite {
    let (out, count) = common::date_part_to_extract(text);
    Rewrite::new(out).counted("date_part(part, date) -> extract(part from date)", count)
}

fn percentile_to_presto(text: &str) -> Rewrite {
    let (out, count) = common::percentile_from_vertica(text, "approx_percentile");
    Rewrite::new(out).counted("approximate_percentile(using parameters) -> approx_percentile()", count)
}

fn percentile_to_hive(text: &str) -> Rewrite {
    let (out, count) = common::percentile_from_vertica(text, "percentile_approx");
    Rewrite::new(out).counted("approximate_percentile(using parameters) -> percentile_approx()", count)
}

fn date_format_to_char(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["date_format"], b'(', |call| {
        Some(Splice::new(format!("date(to_char({}))", call.args)))
    });
    Rewrite::new(out)
        .counted("date_format() -> to_char() + cast as date", count)
        .warn_if(count > 0, DATE_PATTERN_WARNING)
}
