//! Reconciliation of pending ownership transfers against the ledger
//!
//! Each pass walks the ledger in order and moves eligible rows from
//! `Pending` to `Accepted` or `Moved to Default Folder`. The pure rules live
//! in [`decision`], the orchestration in [`engine`].

pub mod decision;
pub mod engine;
pub mod report;

pub use decision::*;
pub use engine::*;
pub use report::*;
