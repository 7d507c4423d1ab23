use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TranslateError;
use crate::transpiler::sql::hive::HiveRules;
use crate::transpiler::sql::presto::PrestoRules;
use crate::transpiler::sql::vertica::VerticaRules;
use crate::transpiler::traits::DialectRules;

/// Supported SQL Dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Presto,
    Hive,
    Vertica,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Presto
    }
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Presto, Dialect::Hive, Dialect::Vertica];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Presto => "presto",
            Dialect::Hive => "hive",
            Dialect::Vertica => "vertica",
        }
    }

    pub fn rules(&self) -> Box<dyn DialectRules> {
        match self {
            Dialect::Presto => Box::new(PrestoRules),
            Dialect::Hive => Box::new(HiveRules),
            Dialect::Vertica => Box::new(VerticaRules),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "presto" => Ok(Dialect::Presto),
            "hive" => Ok(Dialect::Hive),
            "vertica" => Ok(Dialect::Vertica),
            other => Err(TranslateError::unknown_dialect(other)),
        }
    }
}
