use std::fmt;

use super::dialect::Dialect;
use crate::report::Replacement;
use crate::scan;

/// The rule tables of one dialect.
///
/// A translation from `A` to `B` runs `A.normalizer(B)` followed by
/// `B.specializer()`. Order inside each table is significant: later rules
/// see the output of earlier ones.
pub trait DialectRules {
    fn dialect(&self) -> Dialect;

    /// Rules rewriting this dialect's own constructs, translating towards `destination`.
    fn normalizer(&self, destination: Dialect) -> Vec<Rule>;

    /// Rules producing this dialect's syntax out of the other dialects'.
    fn specializer(&self) -> Vec<Rule>;
}

/// The outcome of one rule over the whole query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub replacements: Vec<Replacement>,
    pub warnings: Vec<String>,
    pub preamble: Option<String>,
}

impl Rewrite {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Add a ledger entry, zero counts included.
    pub fn counted(mut self, rule: &str, count: usize) -> Self {
        self.replacements.push(Replacement::new(rule, count));
        self
    }

    pub fn warn(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn warn_if(self, condition: bool, warning: impl Into<String>) -> Self {
        if condition { self.warn(warning) } else { self }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    pub fn total(&self) -> usize {
        self.replacements.iter().map(|r| r.count).sum()
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    /// `from(` → `to(` for any of the names.
    Calls(&'static [&'static str], &'static str),
    /// Whole-word rename; the flag keeps occurrences followed by `(`.
    Word(&'static str, &'static str, bool),
    Custom(fn(&str) -> Rewrite),
}

/// A named text rewrite.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    name: &'static str,
    action: Action,
}

impl Rule {
    /// Rename calls to any of `from` into calls to `to`.
    pub const fn calls(name: &'static str, from: &'static [&'static str], to: &'static str) -> Self {
        Self {
            name,
            action: Action::Calls(from, to),
        }
    }

    /// Rename every occurrence of the word `from`.
    pub const fn word(name: &'static str, from: &'static str, to: &'static str) -> Self {
        Self {
            name,
            action: Action::Word(from, to, false),
        }
    }

    /// Rename the word `from` unless it carries a size, as in `varchar(20)`.
    pub const fn unsized_word(name: &'static str, from: &'static str, to: &'static str) -> Self {
        Self {
            name,
            action: Action::Word(from, to, true),
        }
    }

    /// A rule implemented by a function, which reports its own ledger entries.
    pub const fn custom(name: &'static str, rewrite: fn(&str) -> Rewrite) -> Self {
        Self {
            name,
            action: Action::Custom(rewrite),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, text: &str) -> Rewrite {
        match self.action {
            Action::Calls(from, to) => {
                let (text, count) = scan::rename_calls(text, from, to);
                Rewrite::new(text).counted(self.name, count)
            }
            Action::Word(from, to, unless_sized) => {
                let (text, count) = scan::rename_words(text, from, to, unless_sized);
                Rewrite::new(text).counted(self.name, count)
            }
            Action::Custom(rewrite) => rewrite(text),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_rule_reports_zero() {
        let rule = Rule::calls("size() -> cardinality()", &["size"], "cardinality");
        let rewrite = rule.apply("select a from t");
        assert_eq!(rewrite.text, "select a from t");
        assert_eq!(rewrite.replacements, vec![Replacement::new("size() -> cardinality()", 0)]);
    }

    #[test]
    fn test_unsized_word_rule() {
        let rule = Rule::unsized_word("varchar -> string", "varchar", "string");
        let rewrite = rule.apply("cast(a as varchar), cast(b as varchar(3))");
        assert_eq!(rewrite.text, "cast(a as string), cast(b as varchar(3))");
        assert_eq!(rewrite.total(), 1);
    }

    #[test]
    fn test_custom_rule() {
        fn shout(text: &str) -> Rewrite {
            Rewrite::new(text.to_uppercase()).counted("shout", 1).warn("loud")
        }
        let rewrite = Rule::custom("shout", shout).apply("a");
        assert_eq!(rewrite.text, "A");
        assert_eq!(rewrite.warnings, vec!["loud".to_string()]);
    }
}
