//! HiveQL rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser;
use crate::scan::{self, Splice};
use crate::transpiler::common;
use crate::transpiler::dialect::Dialect;
use crate::transpiler::positional;
use crate::transpiler::traits::{DialectRules, Rewrite, Rule};

pub const NAMED_STRUCT_WARNING: &str =
    "Warning: Hive's NAMED_STRUCT doesn't have an equivalent in Presto and Vertica.";
pub const STRUCT_FIELDS_WARNING: &str = "Warning: UNNEST cannot re-alias the fields of an exploded struct; \
     check the field references of the LATERAL VIEW column after translation.";
pub const HIVE_PATTERN_WARNING: &str =
    "Warning: There can be different date string patterns in Presto vs. Hive QL (patterns not translated here).";
pub const REALIAS_WARNING: &str = "Warning: You cannot re-alias column names in Hive's LATERAL VIEW. \
     Translation to Hive is only available for expressions such as CROSS JOIN UNNEST (original_column) AS new_column.";
pub const MULTI_UNNEST_WARNING: &str =
    "Warning: Hive's LATERAL VIEW explodes a single array or map; UNNEST over several arrays was left unchanged.";
pub const DAY_DIFF_WARNING: &str = "Warning: Hive only supports 'day' difference between 2 dates.";
pub const DAY_ADD_WARNING: &str = "Warning: In Hive, you can only add or remove days (no other units).";

static NUMERIC_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\s)(\d[a-z_]+)\b").expect("valid regex"));
static INTERVAL_QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\binterval(\s+)(\d+)\b").expect("valid regex"));

/// Date parts that an `extract` can read without losing the time of day.
const DATE_ONLY_PARTS: &[&str] = &["year", "quarter", "month", "week", "day", "dow", "doy"];

pub struct HiveRules;

impl DialectRules for HiveRules {
    fn dialect(&self) -> Dialect {
        Dialect::Hive
    }

    fn normalizer(&self, destination: Dialect) -> Vec<Rule> {
        let mut rules = vec![
            Rule::custom("lateral view explode -> cross join unnest", lateral_view_to_unnest),
            Rule::calls("pmod -> mod", &["pmod"], "mod"),
            Rule::word("string -> varchar", "string", "varchar"),
            Rule::custom("add \"\" when col name starts with numeric", quote_numeric_names),
            Rule::custom("` -> \"", backticks_to_double_quotes),
            Rule::custom("array() -> array[]", array_parens_to_brackets),
            Rule::calls("to_date() -> date()", &["to_date"], "date"),
            Rule::custom("add '' to interval quantity", quote_interval_quantity),
            Rule::custom("rlike -> regexp_like()", rlike_to_regexp_like),
            Rule::custom("cast inside of extract() to date", extract_from_date),
            Rule::custom("named_struct() -> row()", named_struct_to_row),
        ];
        match destination {
            Dialect::Presto => rules.extend([
                Rule::custom("unix_timestamp() -> to_unixtime()", unix_timestamp_to_presto),
                Rule::calls("size() -> cardinality()", &["size"], "cardinality"),
                Rule::calls("collect_list() -> array_agg()", &["collect_list"], "array_agg"),
                Rule::custom("collect_set() -> array_agg(distinct)", collect_set_to_presto),
                Rule::custom("datediff() -> date_diff() + add unit + cast inside as date", datediff_to_presto),
                Rule::custom("date_add(str, value) -> date_add('day', value, date)", date_add_to_presto),
                Rule::custom("date_sub(str, value) -> date_add('day', -value, date)", date_sub_to_presto),
                Rule::custom("trunc(str, pattern) -> date_format(date, pattern)", trunc_to_presto),
                Rule::calls(
                    "percentile_approx() -> approx_percentile()",
                    &["percentile_approx"],
                    "approx_percentile",
                ),
            ]),
            Dialect::Vertica => rules.extend([
                Rule::custom("unix_timestamp() -> extract(epoch from date)", unix_timestamp_to_vertica),
                Rule::calls("size() -> array_length()", &["size"], "array_length"),
                Rule::calls("collect_list() -> listagg()", &["collect_list"], "listagg"),
                Rule::custom("collect_set() -> listagg(distinct)", collect_set_to_vertica),
                Rule::custom("datediff -> timestampdiff + add unit + cast inside as date", datediff_to_vertica),
                Rule::custom("date_add(str, value) -> date(timestampadd('day', value, date))", date_add_to_vertica),
                Rule::custom("date_sub(str, value) -> date(timestampadd('day', -value, date))", date_sub_to_vertica),
                Rule::custom(
                    "percentile_approx() -> approximate_percentile(using parameters)",
                    percentile_to_vertica,
                ),
            ]),
            Dialect::Hive => {}
        }
        rules
    }

    fn specializer(&self) -> Vec<Rule> {
        vec![
            Rule::custom("replace column positions with column expressions", positional::resolve_positions),
            Rule::custom("cross join unnest -> lateral view explode", unnest_to_lateral_view),
            Rule::calls("mod -> pmod", &["mod"], "pmod"),
            Rule::unsized_word(
                "varchar -> string, only when varchar length isn't specified",
                "varchar",
                "string",
            ),
            Rule::custom("\" -> `", double_quotes_to_backticks),
            Rule::custom("array[] -> array()", array_brackets_to_parens),
            Rule::calls("date() -> to_date()", &["date"], "to_date"),
            Rule::custom(
                "datediff() or date_diff() or timestampdiff() -> datediff() + remove unit",
                date_diffs_to_hive,
            ),
            Rule::custom(
                "timestampadd or date_add(unit_str, value, date) -> date_add(date, value)",
                date_adds_to_hive,
            ),
            Rule::custom("date_part(part, date) -> extract(part from date)", date_parts_to_hive),
            Rule::custom("row() -> struct()", row_to_struct),
        ]
    }
}

fn lateral_view_to_unnest(text: &str) -> Rewrite {
    const PLAIN: &str = "lateral view explode -> cross join unnest";
    const REALIASED: &str = "lateral view explode -> cross join unnest with realiasing";
    const MAP: &str = "lateral view explode (map) -> cross join unnest with key/value realiasing";
    const OUTER: &str = "lateral view outer explode -> left join unnest on true";

    let (mut plain, mut realiased, mut map, mut outer) = (0, 0, 0, 0);
    let mut struct_fields = false;
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for word in scan::words(text) {
        if word.start < last || &text[word.clone()] != "lateral" {
            continue;
        }
        let Ok((rest, view)) = parser::lateral_view(&text[word.start..]) else {
            continue;
        };
        let end = text.len() - rest.len();
        let (join, on) = if view.outer { ("left join", " on true") } else { ("cross join", "") };
        let (replacement, shape) = match view.columns.as_slice() {
            [key, value] => (
                format!("{join} unnest({}) as {} ({key}, {value}){on}", view.source, view.table),
                &mut map,
            ),
            [column] if reads_fields(text, column) => {
                struct_fields = true;
                (format!("{join} unnest({}) as {column}{on}", view.source), &mut plain)
            }
            [column] => (
                format!("{join} unnest({}) as {} ({column}){on}", view.source, view.table),
                &mut realiased,
            ),
            _ => continue,
        };
        // Outer views are only reported on their own ledger line.
        if view.outer {
            outer += 1;
        } else {
            *shape += 1;
        }
        out.push_str(&text[last..word.start]);
        out.push_str(&scan::carry_newlines(&text[word.start..end], replacement));
        last = end;
    }
    out.push_str(&text[last..]);

    Rewrite::new(out)
        .counted(PLAIN, plain)
        .counted(REALIASED, realiased)
        .counted(MAP, map)
        .counted(OUTER, outer)
        .warn_if(struct_fields, STRUCT_FIELDS_WARNING)
}

/// Whether `column.field` appears anywhere, i.e. the exploded values are structs.
fn reads_fields(text: &str, column: &str) -> bool {
    let bytes = text.as_bytes();
    scan::words(text)
        .into_iter()
        .any(|word| &text[word.clone()] == column && bytes.get(word.end) == Some(&b'.'))
}

fn quote_numeric_names(text: &str) -> Rewrite {
    let mut count = 0;
    let out = scan::map_code(text, |code| {
        count += NUMERIC_NAME.find_iter(code).count();
        NUMERIC_NAME.replace_all(code, "$1\"$2\"").into_owned()
    });
    Rewrite::new(out).counted("add \"\" when col name starts with numeric", count)
}

fn backticks_to_double_quotes(text: &str) -> Rewrite {
    let (out, count) = common::swap_quotes(text, '`', '"');
    Rewrite::new(out).counted("` -> \"", count)
}

fn double_quotes_to_backticks(text: &str) -> Rewrite {
    let (out, count) = common::swap_quotes(text, '"', '`');
    Rewrite::new(out).counted("\" -> `", count)
}

fn array_parens_to_brackets(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["array"], b'(', |call| {
        Some(Splice::new(format!("array[{}]", call.args)))
    });
    Rewrite::new(out).counted("array() -> array[]", count)
}

fn array_brackets_to_parens(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["array"], b'[', |call| {
        Some(Splice::new(format!("array({})", call.args)))
    });
    Rewrite::new(out).counted("array[] -> array()", count)
}

fn quote_interval_quantity(text: &str) -> Rewrite {
    let mut count = 0;
    let out = scan::map_code(text, |code| {
        count += INTERVAL_QUANTITY.find_iter(code).count();
        INTERVAL_QUANTITY.replace_all(code, "interval$1'$2'").into_owned()
    });
    Rewrite::new(out).counted("add '' to interval quantity", count)
}

fn rlike_to_regexp_like(text: &str) -> Rewrite {
    let (out, count) = common::rewrite_infix(text, "rlike", |lhs, negated, rhs| {
        let not = if negated { "not " } else { "" };
        format!("{not}regexp_like({lhs}, {rhs})")
    });
    Rewrite::new(out).counted("rlike -> regexp_like()", count)
}

fn extract_from_date(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["extract"], b'(', |call| {
        let depth = scan::depth_map(call.args);
        let from = scan::words(call.args)
            .into_iter()
            .find(|w| &call.args[w.clone()] == "from" && depth[w.start] == Some(0))?;
        let part = call.args[..from.start].trim();
        let source = call.args[from.end..].trim();
        if !DATE_ONLY_PARTS.contains(&part) || source.is_empty() || source.starts_with("date(") {
            return None;
        }
        Some(Splice::new(format!("extract({part} from date({source}))")))
    });
    Rewrite::new(out).counted("cast inside of extract() to date", count)
}

fn named_struct_to_row(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["named_struct"], b'(', |call| {
        let args = scan::split_args(call.args);
        if args.is_empty() || args.len() % 2 != 0 {
            return None;
        }
        let values: Vec<&str> = args.iter().skip(1).step_by(2).copied().collect();
        Some(Splice::new(format!("row({})", values.join(", "))))
    });
    Rewrite::new(out)
        .counted("named_struct() -> row()", count)
        .warn_if(count > 0, NAMED_STRUCT_WARNING)
}

fn unix_timestamp_to_presto(text: &str) -> Rewrite {
    let mut patterned = false;
    let (out, count) = scan::rewrite_calls(text, &["unix_timestamp"], b'(', |call| {
        match scan::split_args(call.args).as_slice() {
            [] => Some(Splice::new("to_unixtime(now())")),
            [source] => Some(Splice::new(format!("to_unixtime({source})"))),
            [source, pattern] => {
                patterned = true;
                Some(Splice::new(format!("to_unixtime(date_parse({source}, {pattern}))")))
            }
            _ => None,
        }
    });
    Rewrite::new(out)
        .counted("unix_timestamp() -> to_unixtime()", count)
        .warn_if(patterned, HIVE_PATTERN_WARNING)
}

fn unix_timestamp_to_vertica(text: &str) -> Rewrite {
    let (out, count) = common::call_to_epoch(text, &["unix_timestamp"]);
    Rewrite::new(out).counted("unix_timestamp() -> extract(epoch from date)", count)
}

fn collect_set_to_presto(text: &str) -> Rewrite {
    let mut windowed = 0;
    let (out, count) = scan::rewrite_calls(text, &["collect_set"], b'(', |call| {
        let args = call.args.trim();
        match parser::over_clause(call.tail) {
            Ok((_, window)) => {
                windowed += 1;
                Some(Splice::consuming(
                    format!("array_distinct(array_agg({args}){window})"),
                    window.len(),
                ))
            }
            Err(_) => Some(Splice::new(format!("array_agg(distinct {args})"))),
        }
    });
    Rewrite::new(out)
        .counted("collect_set() -> array_distinct(array_agg() over window)", windowed)
        .counted("collect_set() -> array_agg(distinct)", count - windowed)
}

fn collect_set_to_vertica(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["collect_set"], b'(', |call| {
        Some(Splice::new(format!("listagg(distinct {})", call.args.trim())))
    });
    Rewrite::new(out).counted("collect_set() -> listagg(distinct)", count)
}

/// Hive `datediff(end, start)` as `function('day', date(start), date(end))`.
fn datediff_with_unit(text: &str, function: &str) -> (String, usize) {
    scan::rewrite_calls(text, &["datediff"], b'(', |call| match scan::split_args(call.args).as_slice() {
        [end, start] => Some(Splice::new(format!(
            "{function}('day', {}, {})",
            common::wrap_date(start),
            common::wrap_date(end)
        ))),
        _ => None,
    })
}

fn datediff_to_presto(text: &str) -> Rewrite {
    let (out, count) = datediff_with_unit(text, "date_diff");
    Rewrite::new(out).counted("datediff() -> date_diff() + add unit + cast inside as date", count)
}

fn datediff_to_vertica(text: &str) -> Rewrite {
    let (out, count) = datediff_with_unit(text, "timestampdiff");
    Rewrite::new(out).counted("datediff -> timestampdiff + add unit + cast inside as date", count)
}

/// Hive `name(date, days)` through `build(days, date(date))`.
fn day_arithmetic(text: &str, name: &str, build: impl Fn(&str, &str) -> String) -> (String, usize) {
    scan::rewrite_calls(text, &[name], b'(', |call| match scan::split_args(call.args).as_slice() {
        [date, days] => Some(Splice::new(build(days, &common::wrap_date(date)))),
        _ => None,
    })
}

fn date_add_to_presto(text: &str) -> Rewrite {
    let (out, count) = day_arithmetic(text, "date_add", |days, date| format!("date_add('day', {days}, {date})"));
    Rewrite::new(out).counted("date_add(str, value) -> date_add('day', value, date)", count)
}

fn date_sub_to_presto(text: &str) -> Rewrite {
    let (out, count) = day_arithmetic(text, "date_sub", |days, date| {
        format!("date_add('day', {}, {date})", common::negate(days))
    });
    Rewrite::new(out).counted("date_sub(str, value) -> date_add('day', -value, date)", count)
}

fn date_add_to_vertica(text: &str) -> Rewrite {
    let (out, count) = day_arithmetic(text, "date_add", |days, date| {
        format!("date(timestampadd('day', {days}, {date}))")
    });
    Rewrite::new(out).counted("date_add(str, value) -> date(timestampadd('day', value, date))", count)
}

fn date_sub_to_vertica(text: &str) -> Rewrite {
    let (out, count) = day_arithmetic(text, "date_sub", |days, date| {
        format!("date(timestampadd('day', {}, {date}))", common::negate(days))
    });
    Rewrite::new(out).counted("date_sub(str, value) -> date(timestampadd('day', -value, date))", count)
}

fn trunc_to_presto(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["trunc"], b'(', |call| match scan::split_args(call.args).as_slice() {
        [date, pattern] => Some(Splice::new(format!("date_format({}, {pattern})", common::wrap_date(date)))),
        _ => None,
    });
    Rewrite::new(out)
        .counted("trunc(str, pattern) -> date_format(date, pattern)", count)
        .warn_if(count > 0, HIVE_PATTERN_WARNING)
}

fn percentile_to_vertica(text: &str) -> Rewrite {
    let (out, count) = common::percentile_to_vertica(text, &["percentile_approx"]);
    Rewrite::new(out).counted("percentile_approx() -> approximate_percentile(using parameters)", count)
}

fn unnest_to_lateral_view(text: &str) -> Rewrite {
    const CROSS: &str = "cross join unnest -> lateral view explode";
    const LEFT: &str = "left join unnest -> lateral view outer explode";

    let (mut cross, mut left) = (0, 0);
    let (mut realiased, mut multi) = (false, false);
    let mut synthesized = 0;
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for word in scan::words(text) {
        if word.start < last || !matches!(&text[word.clone()], "cross" | "left") {
            continue;
        }
        let Ok((rest, join)) = parser::unnest_join(&text[word.start..]) else {
            continue;
        };
        if scan::split_args(join.source).len() != 1 {
            multi = true;
            continue;
        }
        let end = text.len() - rest.len();
        let explode = if join.left { "lateral view outer explode" } else { "lateral view explode" };
        let replacement = match join.columns.as_slice() {
            [] => {
                let table = match synthesized {
                    0 => "t".to_string(),
                    n => format!("t{n}"),
                };
                synthesized += 1;
                format!("{explode}({}) {table} as {}", join.source, join.alias)
            }
            [column] => format!("{explode}({}) {} as {column}", join.source, join.alias),
            [key, value] => {
                realiased = true;
                format!("{explode}({}) {} as {key}, {value}", join.source, join.alias)
            }
            [first, ..] => {
                realiased = true;
                format!("{explode}({}) {} as {first}", join.source, join.alias)
            }
        };
        if join.left {
            left += 1;
        } else {
            cross += 1;
        }
        out.push_str(&text[last..word.start]);
        out.push_str(&scan::carry_newlines(&text[word.start..end], replacement));
        last = end;
    }
    out.push_str(&text[last..]);

    Rewrite::new(out)
        .counted(CROSS, cross)
        .counted(LEFT, left)
        .warn_if(realiased, REALIAS_WARNING)
        .warn_if(multi, MULTI_UNNEST_WARNING)
}

fn date_diffs_to_hive(text: &str) -> Rewrite {
    let mut other_units = false;
    let (out, count) = scan::rewrite_calls(
        text,
        &["datediff", "date_diff", "timestampdiff"],
        b'(',
        |call| match scan::split_args(call.args).as_slice() {
            [unit, start, end] => {
                other_units |= common::unit_name(unit) != "day";
                Some(Splice::new(format!("datediff({end}, {start})")))
            }
            _ => None,
        },
    );
    Rewrite::new(out)
        .counted("datediff() or date_diff() or timestampdiff() -> datediff() + remove unit", count)
        .warn_if(other_units, DAY_DIFF_WARNING)
}

fn date_adds_to_hive(text: &str) -> Rewrite {
    let mut other_units = false;
    let (out, count) = scan::rewrite_calls(text, &["date_add", "timestampadd"], b'(', |call| {
        match scan::split_args(call.args).as_slice() {
            [unit, value, date] => {
                other_units |= common::unit_name(unit) != "day";
                Some(Splice::new(format!("date_add({date}, {value})")))
            }
            _ => None,
        }
    });
    Rewrite::new(out)
        .counted("timestampadd or date_add(unit_str, value, date) -> date_add(date, value)", count)
        .warn_if(other_units, DAY_ADD_WARNING)
}

fn date_parts_to_hive(text: &str) -> Rewrite {
    let (text, parts) = common::date_part_to_extract(text);
    let (out, truncs) = scan::rewrite_calls(&text, &["date_trunc"], b'(', |call| {
        match scan::split_args(call.args).as_slice() {
            [part, source] => Some(Splice::new(format!("trunc({source}, {part})"))),
            _ => None,
        }
    });
    Rewrite::new(out)
        .counted("date_part(part, date) -> extract(part from date)", parts)
        .counted("date_trunc(part, date) -> trunc(date, part)", truncs)
}

/// `row(...)` → `struct(...)`, except after `as` where `row(...)` names a type.
fn row_to_struct(text: &str) -> Rewrite {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    for word in scan::words(text) {
        if &text[word.clone()] != "row"
            || (word.start > 0 && bytes[word.start - 1] == b'.')
            || bytes.get(scan::skip_whitespace(bytes, word.end)) != Some(&b'(')
            || scan::word_before(text, word.start).is_some_and(|w| &text[w] == "as")
        {
            continue;
        }
        out.push_str(&text[last..word.start]);
        out.push_str("struct");
        last = word.end;
        count += 1;
    }
    out.push_str(&text[last..]);
    Rewrite::new(out).counted("row() -> struct()", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lateral_view_shapes() {
        let rewrite = lateral_view_to_unnest(
            "select c from t lateral view explode(arr) x as c lateral view outer explode(m) y as k, v",
        );
        assert_eq!(
            rewrite.text,
            "select c from t cross join unnest(arr) as x (c) left join unnest(m) as y (k, v) on true"
        );
        assert_eq!(rewrite.total(), 2);
        assert_eq!(rewrite.replacements[3].rule, "lateral view outer explode -> left join unnest on true");
        assert_eq!(rewrite.replacements[3].count, 1);
        assert!(rewrite.warnings.is_empty());
    }

    #[test]
    fn test_lateral_view_struct_fields() {
        let rewrite = lateral_view_to_unnest("select s.id from t lateral view explode(items) x as s");
        assert_eq!(rewrite.text, "select s.id from t cross join unnest(items) as s");
        assert_eq!(rewrite.warnings, vec![STRUCT_FIELDS_WARNING.to_string()]);
    }

    #[test]
    fn test_unnest_to_lateral_view() {
        let rewrite = unnest_to_lateral_view(
            "from t cross join unnest(arr) as a cross join unnest(b) as u (c) left join unnest(m) as w (k, v) on true",
        );
        assert_eq!(
            rewrite.text,
            "from t lateral view explode(arr) t as a lateral view explode(b) u as c lateral view outer explode(m) w as k, v"
        );
        assert_eq!(rewrite.warnings, vec![REALIAS_WARNING.to_string()]);
    }

    #[test]
    fn test_multi_array_unnest_is_kept() {
        let text = "from t cross join unnest(a, b) as u (x, y)";
        let rewrite = unnest_to_lateral_view(text);
        assert_eq!(rewrite.text, text);
        assert_eq!(rewrite.warnings, vec![MULTI_UNNEST_WARNING.to_string()]);
    }

    #[test]
    fn test_numeric_names_and_intervals() {
        assert_eq!(quote_numeric_names("select 1st_col, 10 from t").text, "select \"1st_col\", 10 from t");
        assert_eq!(
            quote_interval_quantity("ds - interval 3 day").text,
            "ds - interval '3' day"
        );
    }

    #[test]
    fn test_extract_keeps_time_parts() {
        assert_eq!(
            extract_from_date("extract(month from ts), extract(hour from ts)").text,
            "extract(month from date(ts)), extract(hour from ts)"
        );
    }

    #[test]
    fn test_named_struct() {
        let rewrite = named_struct_to_row("named_struct('a', 1, 'b', x + 1)");
        assert_eq!(rewrite.text, "row(1, x + 1)");
        assert_eq!(rewrite.warnings, vec![NAMED_STRUCT_WARNING.to_string()]);
    }

    #[test]
    fn test_collect_set_window() {
        let rewrite = collect_set_to_presto("collect_set(a) over (partition by b), collect_set(c)");
        assert_eq!(
            rewrite.text,
            "array_distinct(array_agg(a) over (partition by b)), array_agg(distinct c)"
        );
        assert_eq!(rewrite.total(), 2);
    }

    #[test]
    fn test_dates_to_presto() {
        assert_eq!(
            datediff_to_presto("datediff(end_ds, date(start_ds))").text,
            "date_diff('day', date(start_ds), date(end_ds))"
        );
        assert_eq!(
            date_sub_to_presto("date_sub(ds, n + 1)").text,
            "date_add('day', -(n + 1), date(ds))"
        );
        assert_eq!(
            date_add_to_vertica("date_add(ds, 7)").text,
            "date(timestampadd('day', 7, date(ds)))"
        );
    }

    #[test]
    fn test_dates_to_hive() {
        let rewrite = date_diffs_to_hive("date_diff('day', f(a, b), g(c, d))");
        assert_eq!(rewrite.text, "datediff(g(c, d), f(a, b))");
        assert!(rewrite.warnings.is_empty());

        let rewrite = date_adds_to_hive("date_add('month', 1, ds)");
        assert_eq!(rewrite.text, "date_add(ds, 1)");
        assert_eq!(rewrite.warnings, vec![DAY_ADD_WARNING.to_string()]);

        assert_eq!(
            date_parts_to_hive("date_part('year', ds), date_trunc('month', ds)").text,
            "extract(year from ds), trunc(ds, 'month')"
        );
    }

    #[test]
    fn test_row_to_struct() {
        assert_eq!(
            row_to_struct("row(a, b), cast(x as row(a int)), row_number()").text,
            "struct(a, b), cast(x as row(a int)), row_number()"
        );
    }
}
