//! # sqlbridge
//!
//! Translate SQL queries between Presto, Hive and Vertica by lexical
//! pattern rewriting.
//!
//! ## Quick Example
//!
//! ```rust
//! use sqlbridge::prelude::*;
//!
//! let sql = sqlbridge::translate(
//!     "select a+1 as x, b from t group by 1, 2",
//!     Dialect::Presto,
//!     Dialect::Hive,
//!     false,
//! );
//! assert_eq!(sql, "SELECT a+1 AS x, b FROM t GROUP BY a+1, b");
//! ```
//!
//! ## Pipeline
//!
//! | Stage       | Module                     | Does                                  |
//! |-------------|----------------------------|---------------------------------------|
//! | Extract     | [`comments`]               | sets `--` comments aside              |
//! | Normalize   | [`transpiler::sql`]        | source constructs to a shared shape   |
//! | Specialize  | [`transpiler::sql`]        | shared shape to destination syntax    |
//! | Finalize    | [`transpiler::finalize`]   | casing, spacing, comments back        |
//!
//! Nothing here parses SQL into a tree. Rules see the query as text and
//! rely on [`scan`] for quote and bracket awareness and on [`parser`] for
//! the few clauses that need a grammar.

pub mod comments;
pub mod config;
pub mod error;
pub mod parser;
pub mod report;
pub mod scan;
pub mod transpiler;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::*;
    pub use crate::report::{Replacement, Report};
    pub use crate::transpiler::{Dialect, Transpiler, Translation};
}

use transpiler::{Dialect, Transpiler};

/// Translate `query` from `source` to `destination`.
///
/// With `verbose`, the replacement report is prepended to the query. A
/// Hive session preamble, when one is needed, always precedes the query.
///
/// # Example
///
/// ```
/// use sqlbridge::transpiler::Dialect;
///
/// let sql = sqlbridge::translate("select x[1] from t", Dialect::Presto, Dialect::Hive, true);
/// assert!(sql.starts_with("1 replacement in total:"));
/// assert!(sql.ends_with("SELECT x[0] FROM t"));
/// ```
pub fn translate(query: &str, source: Dialect, destination: Dialect, verbose: bool) -> String {
    Transpiler::new(source, destination).translate(query).render(verbose)
}
