//! Dialect-to-dialect translation pipeline.
//!
//! A query is lowercased outside quoted regions, its comments are set aside,
//! then the source dialect's normalizer and the destination dialect's
//! specializer rewrite it rule by rule. Keywords are re-capitalised and the
//! comments restored at the end.
//!
//! ```
//! use sqlbridge::transpiler::{Dialect, Transpiler};
//!
//! let translation = Transpiler::new(Dialect::Presto, Dialect::Hive)
//!     .translate("select a from t where x[1] = 2");
//! assert_eq!(translation.sql, "SELECT a FROM t WHERE x[0] = 2");
//! ```

pub mod common;
pub mod dialect;
pub mod finalize;
pub mod positional;
pub mod sql;
pub mod traits;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::comments;
use crate::report::Report;
use crate::scan;

pub use dialect::Dialect;
pub use traits::{DialectRules, Rewrite, Rule};

pub const CONCATENATION_WARNING: &str = "Warning: Translation doesn't support all concatenation operations yet.";
pub const MAPPING_WARNING: &str = "Warning: Translation doesn't support all presto mapping functions yet.";

static CONCATENATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\||\bconcat_ws\b|\barray_join\b").expect("valid regex"));
static MAPPING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:map|transform|map_from_entries)\b").expect("valid regex"));

/// The result of translating one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub sql: String,
    /// Session statement to run before the query, e.g. Hive's position alias switch.
    pub preamble: Option<String>,
    pub report: Report,
}

impl Translation {
    /// The text handed back to callers: the report (when verbose), the preamble, then the query.
    pub fn render(&self, verbose: bool) -> String {
        let preamble = self.preamble.as_deref().unwrap_or("");
        if verbose {
            format!("{}\n{preamble}{}", self.report, self.sql)
        } else {
            format!("{preamble}{}", self.sql)
        }
    }
}

/// Translator for one (source, destination) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transpiler {
    source: Dialect,
    destination: Dialect,
}

impl Transpiler {
    pub fn new(source: Dialect, destination: Dialect) -> Self {
        Self { source, destination }
    }

    pub fn source(&self) -> Dialect {
        self.source
    }

    pub fn destination(&self) -> Dialect {
        self.destination
    }

    /// The ordered rule table for this pair; empty when both dialects agree.
    pub fn rules(&self) -> Vec<Rule> {
        if self.source == self.destination {
            return Vec::new();
        }
        let mut rules = self.source.rules().normalizer(self.destination);
        rules.extend(self.destination.rules().specializer());
        rules
    }

    pub fn translate(&self, query: &str) -> Translation {
        let extracted = comments::extract(query);
        let rules = self.rules();
        debug!(
            source = %self.source,
            destination = %self.destination,
            rules = rules.len(),
            comments = extracted.comment_count(),
            "translating query"
        );

        let mut text = finalize::lowercase(&extracted.text);
        let mut report = Report::new();
        let mut preamble = None;

        if !rules.is_empty() {
            let code = scan::code_only(&text);
            if CONCATENATION.is_match(&code) {
                report.warn(CONCATENATION_WARNING);
            }
            if self.source == Dialect::Presto && MAPPING.is_match(&code) {
                report.warn(MAPPING_WARNING);
            }
        }

        for rule in &rules {
            let rewrite = rule.apply(&text);
            let replaced = rewrite.total();
            if replaced > 0 {
                debug!(rule = rule.name(), replaced, "rule applied");
            }
            for replacement in rewrite.replacements {
                report.record(replacement);
            }
            for warning in rewrite.warnings {
                report.warn(warning);
            }
            if rewrite.preamble.is_some() {
                preamble = rewrite.preamble;
            }
            text = rewrite.text;
        }

        let text = finalize::tidy(&finalize::capitalize(&text));
        Translation {
            sql: extracted.restore(&text),
            preamble,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_dialect_has_no_rules() {
        let transpiler = Transpiler::new(Dialect::Hive, Dialect::Hive);
        assert!(transpiler.rules().is_empty());
        let translation = transpiler.translate("select a ,b from t");
        assert_eq!(translation.sql, "SELECT a, b FROM t");
        assert_eq!(translation.report.total(), 0);
    }

    #[test]
    fn test_rule_table_order() {
        let names: Vec<&str> = Transpiler::new(Dialect::Presto, Dialect::Hive)
            .rules()
            .iter()
            .map(Rule::name)
            .collect();
        assert_eq!(names.first(), Some(&"1-indexing -> 0-indexing"));
        assert!(names.contains(&"cross join unnest -> lateral view explode"));
    }

    #[test]
    fn test_global_warnings() {
        let translation = Transpiler::new(Dialect::Presto, Dialect::Vertica)
            .translate("select a || b, transform(x, e -> e + 1) from t");
        assert_eq!(
            translation.report.warnings(),
            &[CONCATENATION_WARNING.to_string(), MAPPING_WARNING.to_string()]
        );
        let translation = Transpiler::new(Dialect::Hive, Dialect::Vertica).translate("select map from t");
        assert!(translation.report.warnings().is_empty());
    }

    #[test]
    fn test_render() {
        let translation = Transpiler::new(Dialect::Presto, Dialect::Hive).translate("select a[1] from t");
        assert_eq!(translation.render(false), "SELECT a[0] FROM t");
        assert_eq!(
            translation.render(true),
            "1 replacement in total:\n  • 1-indexing -> 0-indexing:  1\n\nSELECT a[0] FROM t"
        );
    }

    #[test]
    fn test_preamble_is_rendered_before_query() {
        let translation = Transpiler::new(Dialect::Presto, Dialect::Hive).translate("select a from t group by 2");
        assert_eq!(
            translation.render(false),
            "SET hive.groupby.orderby.position.alias=true;\nSELECT a FROM t GROUP BY 2"
        );
    }
}
