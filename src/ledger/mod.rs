//! Ledger read boundary: header validation and row normalization

pub mod sheet;

pub use sheet::*;
