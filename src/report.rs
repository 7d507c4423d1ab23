//! Replacement ledger and warnings collected during a translation.

use std::fmt;

use serde::Serialize;

/// How many times one rule rewrote the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub rule: String,
    pub count: usize,
}

impl Replacement {
    pub fn new(rule: impl Into<String>, count: usize) -> Self {
        Self {
            rule: rule.into(),
            count,
        }
    }
}

/// Diagnostics for one translation.
///
/// The ledger keeps every rule that ran, zero counts included; only
/// non-zero entries are reported. Warnings are deduplicated and keep the
/// order in which they were first raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    ledger: Vec<Replacement>,
    warnings: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, replacement: Replacement) {
        self.ledger.push(replacement);
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Every ledger entry, in execution order.
    pub fn ledger(&self) -> &[Replacement] {
        &self.ledger
    }

    /// Ledger entries that actually replaced something.
    pub fn replacements(&self) -> impl Iterator<Item = &Replacement> {
        self.ledger.iter().filter(|r| r.count > 0)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn total(&self) -> usize {
        self.ledger.iter().map(|r| r.count).sum()
    }

    /// `N replacement(s) in total:` line.
    pub fn headline(&self) -> String {
        match self.total() {
            1 => "1 replacement in total:".to_string(),
            n => format!("{n} replacements in total:"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "{warning}")?;
        }
        if !self.warnings.is_empty() {
            writeln!(f)?;
        }
        writeln!(f, "{}", self.headline())?;
        for replacement in self.replacements() {
            writeln!(f, "  • {}:  {}", replacement.rule, replacement.count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        assert_eq!(Report::new().to_string(), "0 replacements in total:\n");
    }

    #[test]
    fn test_report_filters_zero_counts() {
        let mut report = Report::new();
        report.record(Replacement::new("pmod -> mod", 0));
        report.record(Replacement::new("size() -> cardinality()", 1));
        assert_eq!(report.ledger().len(), 2);
        assert_eq!(
            report.to_string(),
            "1 replacement in total:\n  • size() -> cardinality():  1\n"
        );
    }

    #[test]
    fn test_warnings_are_deduplicated() {
        let mut report = Report::new();
        report.warn("Warning: a");
        report.warn("Warning: b");
        report.warn("Warning: a");
        report.record(Replacement::new("x", 2));
        report.record(Replacement::new("y", 1));
        assert_eq!(
            report.to_string(),
            "Warning: a\nWarning: b\n\n3 replacements in total:\n  • x:  2\n  • y:  1\n"
        );
    }
}
