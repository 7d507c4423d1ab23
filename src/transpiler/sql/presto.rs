//! Presto rules.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::scan::{self, Splice};
use crate::transpiler::common;
use crate::transpiler::dialect::Dialect;
use crate::transpiler::traits::{DialectRules, Rewrite, Rule};

pub const INTERVAL_WARNING: &str = "Warning: Note that in Presto, the INTERVAL operation returns a date, \
     while in Hive and Vertica it returns a full timestamp (shouldn't be an issue).";

static INTERVAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\binterval\b").expect("valid regex"));
static INTERVAL_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|[^<>!=])=([ \t]*)([^=\n;]*?\binterval\b[ \t'"\d]+[a-z_]+)"#).expect("valid regex")
});

pub struct PrestoRules;

impl DialectRules for PrestoRules {
    fn dialect(&self) -> Dialect {
        Dialect::Presto
    }

    fn normalizer(&self, destination: Dialect) -> Vec<Rule> {
        let mut rules = vec![
            Rule::custom("1-indexing -> 0-indexing", zero_based_subscripts),
            Rule::custom("presto interval arithmetic returns a date", interval_note),
        ];
        match destination {
            Dialect::Vertica => rules.extend([
                Rule::custom("to_unixtime() -> extract(epoch from date)", to_unixtime_to_epoch),
                Rule::calls("cardinality() -> array_length()", &["cardinality"], "array_length"),
                Rule::custom("array_distinct(array_agg()) -> listagg(distinct)", distinct_agg_to_listagg),
                Rule::calls("array_agg() -> listagg()", &["array_agg"], "listagg"),
                Rule::calls("array_average() -> array_avg()", &["array_average"], "array_avg"),
                Rule::calls("date_diff() -> datediff()", &["date_diff"], "datediff"),
                Rule::custom("date_add() -> date(timestampadd())", date_add_to_timestampadd),
                Rule::custom(
                    "approx_percentile() -> approximate_percentile(using parameters)",
                    percentile_to_vertica,
                ),
            ]),
            Dialect::Hive => rules.extend([
                Rule::calls("to_unixtime() -> unix_timestamp()", &["to_unixtime"], "unix_timestamp"),
                Rule::calls("cardinality() -> size()", &["cardinality"], "size"),
                Rule::custom("array_distinct(array_agg()) -> collect_set()", distinct_agg_to_collect_set),
                Rule::calls("array_agg() -> collect_list()", &["array_agg"], "collect_list"),
                Rule::calls(
                    "approx_percentile() -> percentile_approx()",
                    &["approx_percentile"],
                    "percentile_approx",
                ),
            ]),
            Dialect::Presto => {}
        }
        rules
    }

    fn specializer(&self) -> Vec<Rule> {
        vec![
            Rule::custom("cast division as float", float_division),
            Rule::custom("0-indexing -> 1-indexing", one_based_subscripts),
            Rule::custom("add date() when interval is used", date_around_interval),
        ]
    }
}

fn zero_based_subscripts(text: &str) -> Rewrite {
    let (out, count) = common::shift_subscripts(text, -1);
    Rewrite::new(out).counted("1-indexing -> 0-indexing", count)
}

fn one_based_subscripts(text: &str) -> Rewrite {
    let (out, count) = common::shift_subscripts(text, 1);
    Rewrite::new(out).counted("0-indexing -> 1-indexing", count)
}

/// Only warns; the zero-count entry keeps the rule in the ledger.
fn interval_note(text: &str) -> Rewrite {
    let uses_interval = INTERVAL.is_match(&scan::code_only(text));
    Rewrite::new(text)
        .counted("presto interval arithmetic returns a date", 0)
        .warn_if(uses_interval, INTERVAL_WARNING)
}

fn to_unixtime_to_epoch(text: &str) -> Rewrite {
    let (out, count) = common::call_to_epoch(text, &["to_unixtime"]);
    Rewrite::new(out).counted("to_unixtime() -> extract(epoch from date)", count)
}

fn distinct_agg(text: &str, function: &str, distinct: bool) -> (String, usize) {
    scan::rewrite_calls(text, &["array_distinct"], b'(', |call| {
        let (expr, window) = common::distinct_aggregate(call.args)?;
        let modifier = if distinct { "distinct " } else { "" };
        Some(Splice::new(format!("{function}({modifier}{expr}){window}")))
    })
}

fn distinct_agg_to_listagg(text: &str) -> Rewrite {
    let (out, count) = distinct_agg(text, "listagg", true);
    Rewrite::new(out).counted("array_distinct(array_agg()) -> listagg(distinct)", count)
}

fn distinct_agg_to_collect_set(text: &str) -> Rewrite {
    let (out, count) = distinct_agg(text, "collect_set", false);
    Rewrite::new(out).counted("array_distinct(array_agg()) -> collect_set()", count)
}

fn date_add_to_timestampadd(text: &str) -> Rewrite {
    let (out, count) = scan::rewrite_calls(text, &["date_add"], b'(', |call| match scan::split_args(call.args).as_slice() {
        [unit, value, date] => Some(Splice::new(format!("date(timestampadd({unit}, {value}, {date}))"))),
        _ => None,
    });
    Rewrite::new(out).counted("date_add() -> date(timestampadd())", count)
}

fn percentile_to_vertica(text: &str) -> Rewrite {
    let (out, count) = common::percentile_to_vertica(text, &["approx_percentile"]);
    Rewrite::new(out).counted("approx_percentile() -> approximate_percentile(using parameters)", count)
}

/// `a / b` → `a *1.0000 / b`, leaving block comments alone.
fn float_division(text: &str) -> Rewrite {
    let mut count = 0;
    let out = scan::map_code(text, |code| {
        let bytes = code.as_bytes();
        let mut out = String::with_capacity(code.len());
        let mut last = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'/' {
                i += 1;
                continue;
            }
            out.push_str(&code[last..i]);
            out.push_str("*1.0000 /");
            count += 1;
            i += 1;
            last = i;
        }
        out.push_str(&code[last..]);
        out
    });
    Rewrite::new(out).counted("cast division as float", count)
}

fn date_around_interval(text: &str) -> Rewrite {
    let mut count = 0;
    let out = INTERVAL_ASSIGNMENT.replace_all(text, |caps: &Captures<'_>| {
        let expression = caps[3].trim();
        if expression.starts_with("date(") {
            return caps[0].to_string();
        }
        count += 1;
        format!("{}= date({expression})", &caps[1])
    });
    Rewrite::new(out.into_owned()).counted("add date() when interval is used", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_note() {
        let rewrite = interval_note("where ds > current_date - interval '3' day");
        assert_eq!(rewrite.warnings, vec![INTERVAL_WARNING.to_string()]);
        assert!(interval_note("select 'interval'").warnings.is_empty());
        assert!(interval_note("select /* no interval here */ 1").warnings.is_empty());
        let ledger = interval_note("select 1").replacements;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].count, 0);
    }

    #[test]
    fn test_distinct_aggregates() {
        assert_eq!(
            distinct_agg_to_collect_set("array_distinct(array_agg(a) over (partition by b))").text,
            "collect_set(a) over (partition by b)"
        );
        assert_eq!(
            distinct_agg_to_listagg("array_distinct(array_agg(a))").text,
            "listagg(distinct a)"
        );
        let text = "array_distinct(split(a, ','))";
        assert_eq!(distinct_agg_to_listagg(text).text, text);
    }

    #[test]
    fn test_date_add_to_timestampadd() {
        assert_eq!(
            date_add_to_timestampadd("date_add('day', 1, ds)").text,
            "date(timestampadd('day', 1, ds))"
        );
    }

    #[test]
    fn test_float_division() {
        let rewrite = float_division("select a / b /* a/b */ from t where s = 'x/y'");
        assert_eq!(rewrite.text, "select a *1.0000 / b /* a/b */ from t where s = 'x/y'");
        assert_eq!(rewrite.total(), 1);
    }

    #[test]
    fn test_date_around_interval() {
        assert_eq!(
            date_around_interval("where ds = current_date - interval '3' day").text,
            "where ds = date(current_date - interval '3' day)"
        );
        let text = "where ds >= current_date - interval '3' day";
        assert_eq!(date_around_interval(text).text, text);
        let text = "where ds = date(current_date - interval '3' day)";
        assert_eq!(date_around_interval(text).total(), 0);
    }

    #[test]
    fn test_subscript_rules() {
        assert_eq!(zero_based_subscripts("a[1]").text, "a[0]");
        assert_eq!(one_based_subscripts("a[0]").text, "a[1]");
    }
}
