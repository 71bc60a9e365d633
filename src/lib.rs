//! # Transfer Acceptance
//!
//! Reconciles ownership transfers of storage items against a ledger of
//! tracked items.
//!
//! ## Features
//!
//! - **Idempotent acceptance**: only rows still pending are ever touched, and
//!   terminal states never regress
//! - **Fallback relocation**: items whose intended parent is gone or foreign are
//!   moved to a root-level `Transferidos de <owner>` folder
//! - **Row isolation**: a failing row is logged and reported, the pass goes on
//! - **Collaborator abstraction**: ledger, storage and identity are traits
//!
//! ## Quick Start
//!
//! ```rust
//! use transfer_acceptance::utils::{MemoryDrive, MemoryLedger};
//! use transfer_acceptance::{LedgerSchema, StaticIdentity, TransferReconciler};
//!
//! let ledger = MemoryLedger::new(LedgerSchema::default());
//! let drive = MemoryDrive::new("me@example.com");
//! let reconciler = TransferReconciler::new(ledger, drive, StaticIdentity::new("me@example.com"));
//! // reconciler.reconcile_all().await?;
//! # let _ = reconciler;
//! ```

pub mod config;
pub mod description;
pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use description::parse_description;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
