//! Per-dialect rule tables.

pub mod hive;
pub mod presto;
pub mod vertica;
