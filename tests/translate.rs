//! End-to-end translations through the public API.

use pretty_assertions::assert_eq;
use sqlbridge::transpiler::{CONCATENATION_WARNING, Dialect, Transpiler};
use sqlbridge::translate;

fn quiet(query: &str, source: Dialect, destination: Dialect) -> String {
    translate(query, source, destination, false)
}

#[test]
fn test_group_by_positions_to_hive() {
    assert_eq!(
        quiet("SELECT a+1 AS x, b FROM t GROUP BY 1, 2", Dialect::Presto, Dialect::Hive),
        "SELECT a+1 AS x, b FROM t GROUP BY a+1, b"
    );
}

#[test]
fn test_unresolvable_positions_emit_preamble() {
    assert_eq!(
        translate("select * from t group by 1", Dialect::Presto, Dialect::Hive, true),
        "1 replacement in total:\n  • change hive session parameters to use column positions:  1\n\n\
         SET hive.groupby.orderby.position.alias=true;\nSELECT * FROM t GROUP BY 1"
    );
}

#[test]
fn test_nested_datediff_to_hive() {
    assert_eq!(
        quiet("SELECT DATEDIFF('day', f(a,b), g(c,d))", Dialect::Presto, Dialect::Hive),
        "SELECT DATEDIFF(G(c, d), F(a, b))"
    );
}

#[test]
fn test_indexing_round_trip() {
    let hive = quiet("select x[1], y[i] from t", Dialect::Presto, Dialect::Hive);
    assert_eq!(hive, "SELECT x[0], y[i-1] FROM t");
    assert_eq!(quiet(&hive, Dialect::Hive, Dialect::Presto), "SELECT x[1], y[i] FROM t");
}

#[test]
fn test_if_case_round_trip() {
    let vertica = quiet("select if(a > 1, 'x', 'y') from t", Dialect::Hive, Dialect::Vertica);
    assert_eq!(vertica, "SELECT CASE WHEN a > 1 THEN 'x' ELSE 'y' END FROM t");
    assert_eq!(
        quiet(&vertica, Dialect::Vertica, Dialect::Hive),
        "SELECT IF(a > 1, 'x', 'y') FROM t"
    );
}

#[test]
fn test_array_round_trip() {
    let vertica = quiet("select array(1, 2) from t", Dialect::Hive, Dialect::Vertica);
    assert_eq!(vertica, "SELECT ARRAY[1, 2] FROM t");
    assert_eq!(quiet(&vertica, Dialect::Vertica, Dialect::Hive), "SELECT ARRAY(1, 2) FROM t");
}

#[test]
fn test_comments_are_preserved() {
    assert_eq!(
        quiet("select a, -- the Key\n  b[1]\nfrom t -- Source", Dialect::Presto, Dialect::Hive),
        "SELECT a, -- the Key\n  b[0]\nFROM t -- Source"
    );
}

#[test]
fn test_same_dialect_is_idempotent() {
    let once = quiet("select a ,b from t where c = 'X'", Dialect::Presto, Dialect::Presto);
    assert_eq!(once, "SELECT a, b FROM t WHERE c = 'X'");
    assert_eq!(quiet(&once, Dialect::Presto, Dialect::Presto), once);
}

#[test]
fn test_zero_replacements_report() {
    assert_eq!(
        translate("select a from t", Dialect::Presto, Dialect::Hive, true),
        "0 replacements in total:\n\nSELECT a FROM t"
    );
}

#[test]
fn test_warnings_follow_verbosity() {
    let verbose = translate("select a || b from t", Dialect::Presto, Dialect::Vertica, true);
    assert!(verbose.starts_with(&format!("{CONCATENATION_WARNING}\n\n0 replacements in total:")));
    let quiet = translate("select a || b from t", Dialect::Presto, Dialect::Vertica, false);
    assert_eq!(quiet, "SELECT a || b FROM t");
}

#[test]
fn test_lateral_view_to_presto() {
    let translation = Transpiler::new(Dialect::Hive, Dialect::Presto)
        .translate("select c from t lateral view explode(arr) x as c");
    assert_eq!(translation.sql, "SELECT c FROM t CROSS JOIN UNNEST(arr) AS x (c)");
    let rules: Vec<&str> = translation.report.replacements().map(|r| r.rule.as_str()).collect();
    assert_eq!(rules, vec!["lateral view explode -> cross join unnest with realiasing"]);
}

#[test]
fn test_unnest_to_hive() {
    assert_eq!(
        quiet("select a from t cross join unnest(arr) as u (a)", Dialect::Presto, Dialect::Hive),
        "SELECT a FROM t LATERAL VIEW EXPLODE(arr) u AS a"
    );
}

#[test]
fn test_vertica_to_presto() {
    assert_eq!(
        quiet(
            "select name::varchar, zeroifnull(cnt) from t where name ilike 'a%'",
            Dialect::Vertica,
            Dialect::Presto
        ),
        "SELECT CAST(name AS VARCHAR), COALESCE(cnt, 0) FROM t WHERE LOWER(name) LIKE 'a%'"
    );
}

#[test]
fn test_hive_dates_to_vertica() {
    assert_eq!(
        quiet("select datediff(end_ds, start_ds) from t", Dialect::Hive, Dialect::Vertica),
        "SELECT TIMESTAMPDIFF('day', DATE(start_ds), DATE(end_ds)) FROM t"
    );
}

#[test]
fn test_quoted_identifiers_to_presto() {
    assert_eq!(
        quiet("select cast(`My Col` as string) from t", Dialect::Hive, Dialect::Presto),
        "SELECT CAST(\"My Col\" AS VARCHAR) FROM t"
    );
}

#[test]
fn test_percentile_to_hive() {
    assert_eq!(
        quiet(
            "select approximate_percentile(x using parameters percentile=0.9) from t",
            Dialect::Vertica,
            Dialect::Hive
        ),
        "SELECT PERCENTILE_APPROX(x, 0.9) FROM t"
    );
}

#[test]
fn test_block_comment_with_quote_to_hive() {
    assert_eq!(
        quiet("select /* don't */ x[1] from t group by 1", Dialect::Presto, Dialect::Hive),
        "SELECT /* don't */ x[0] FROM t GROUP BY x[0]"
    );
}

#[test]
fn test_block_comment_with_quote_to_presto() {
    assert_eq!(
        quiet("select a /* it's */ from t where c = 1/2", Dialect::Hive, Dialect::Presto),
        "SELECT a /* it's */ FROM t WHERE c = 1*1.0000 /2"
    );
}

#[test]
fn test_line_comment_with_quote() {
    assert_eq!(
        quiet("select a, -- it's the Key\n  b[1]\nfrom t", Dialect::Presto, Dialect::Hive),
        "SELECT a, -- it's the Key\n  b[0]\nFROM t"
    );
}

#[test]
fn test_block_comment_between_columns_to_hive() {
    assert_eq!(
        quiet(
            "select a, /* it's\n The Key */ b\nfrom t\ngroup by 1, 2",
            Dialect::Presto,
            Dialect::Hive
        ),
        "SELECT a, /* it's\n The Key */ b\nFROM t\nGROUP BY a, b"
    );
}

#[test]
fn test_huge_index_does_not_overflow() {
    assert_eq!(
        quiet("select a[9223372036854775807] from t", Dialect::Hive, Dialect::Presto),
        "SELECT a[9223372036854775807+1] FROM t"
    );
}
