//! In-memory collaborators for tests and demos

pub mod memory_drive;
pub mod memory_ledger;

pub use memory_drive::*;
pub use memory_ledger::*;

use crate::types::TransferError;

pub(crate) fn poisoned<E>(_: E) -> TransferError {
    TransferError::Storage("In-memory state lock poisoned".to_string())
}
