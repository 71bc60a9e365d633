//! Core types and data structures for transfer acceptance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Acceptance state recorded in the ledger's `TransferAccepted` column
///
/// Transitions only ever go from `Pending` to one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Transfer not yet confirmed (empty cell)
    Pending,
    /// New owner confirmed and the item's parent is valid
    Accepted,
    /// New owner confirmed and the item was relocated to the fallback folder
    MovedToDefault,
}

impl TransferStatus {
    /// Text stored in the ledger cell for this status
    pub fn as_cell(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "",
            TransferStatus::Accepted => "Accepted",
            TransferStatus::MovedToDefault => "Moved to Default Folder",
        }
    }

    /// Normalize a ledger cell. Unrecognised text counts as pending.
    pub fn from_cell(value: &str) -> Self {
        match value {
            "Accepted" => TransferStatus::Accepted,
            "Moved to Default Folder" => TransferStatus::MovedToDefault,
            _ => TransferStatus::Pending,
        }
    }

    /// Whether this status can never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Pending => f.write_str("Pending"),
            other => f.write_str(other.as_cell()),
        }
    }
}

/// Which reconciliation pass a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Folder,
    File,
}

impl ItemKind {
    /// Whether a mime type belongs to this pass
    pub fn matches(&self, mime_type: &str, folder_mime_type: &str) -> bool {
        match self {
            ItemKind::Folder => mime_type == folder_mime_type,
            ItemKind::File => mime_type != folder_mime_type,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Folder => f.write_str("folders"),
            ItemKind::File => f.write_str("files"),
        }
    }
}

/// One tracked item in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// 1-indexed position in the sheet (the header is row 1)
    pub row_index: usize,
    pub id: String,
    pub title: String,
    pub mime_type: String,
    pub parent_id: String,
    pub path: String,
    pub owner_email: String,
    pub owner_name: String,
    pub tag_processed: String,
    /// Transfer initiation has been issued for this item
    pub transfer_processed: bool,
    pub transfer_accepted: TransferStatus,
}

/// Owner entry of a remote item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub email: String,
}

impl Owner {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Live snapshot of a storage item, always re-fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub title: String,
    pub mime_type: String,
    pub owners: Vec<Owner>,
    pub parents: Vec<String>,
    pub description: Option<String>,
}

impl RemoteItem {
    /// Email of the first listed owner, if any
    pub fn first_owner_email(&self) -> Option<&str> {
        self.owners.first().map(|owner| owner.email.as_str())
    }

    /// Case-insensitive check of the first owner against `email`
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.first_owner_email()
            .is_some_and(|owner| owner.to_lowercase() == email.to_lowercase())
    }
}

/// Destination and previous owner recovered from an item description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDescriptor {
    /// Intended parent folder id, empty when absent
    pub parent_id: String,
    /// Owner before the transfer, empty when absent
    pub original_owner: String,
}

/// Errors that can occur while reconciling transfers
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Ledger access error: {0}")]
    LedgerAccess(String),
    #[error("Identity error: {0}")]
    Identity(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Failed to fetch item {item_id}: {message}")]
    ItemFetch { item_id: String, message: String },
    #[error("Failed to move item {item_id}: {message}")]
    Move { item_id: String, message: String },
    #[error("Failed to update ledger row {row_index}: {message}")]
    LedgerWrite { row_index: usize, message: String },
}

impl TransferError {
    /// Row-scoped errors are recorded and the pass continues; the rest abort it
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            TransferError::ItemFetch { .. }
                | TransferError::Move { .. }
                | TransferError::LedgerWrite { .. }
        )
    }
}

/// Result type for transfer operations
pub type TransferResult<T> = Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_cell_round_trip() {
        assert_eq!(TransferStatus::from_cell(""), TransferStatus::Pending);
        assert_eq!(TransferStatus::from_cell("Accepted"), TransferStatus::Accepted);
        assert_eq!(
            TransferStatus::from_cell("Moved to Default Folder"),
            TransferStatus::MovedToDefault
        );
        assert_eq!(TransferStatus::from_cell("accepted"), TransferStatus::Pending);
        assert!(!TransferStatus::Pending.is_terminal());
        assert!(TransferStatus::MovedToDefault.is_terminal());
    }

    #[test]
    fn test_item_kind_filters_are_disjoint() {
        let folder = "application/vnd.google-apps.folder";
        for mime in [folder, "application/pdf", ""] {
            assert_ne!(
                ItemKind::Folder.matches(mime, folder),
                ItemKind::File.matches(mime, folder)
            );
        }
    }

    #[test]
    fn test_owner_check_is_case_insensitive() {
        let item = RemoteItem {
            id: "a".to_string(),
            title: "A".to_string(),
            mime_type: "text/plain".to_string(),
            owners: vec![Owner::new("New.Owner@Example.com"), Owner::new("x@example.com")],
            parents: vec![],
            description: None,
        };
        assert!(item.is_owned_by("new.owner@example.com"));
        assert!(!item.is_owned_by("x@example.com"));

        let orphan = RemoteItem { owners: vec![], ..item };
        assert!(!orphan.is_owned_by("new.owner@example.com"));
    }
}
