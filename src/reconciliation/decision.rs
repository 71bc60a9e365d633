//! Pure decision rules for a single ledger row

use serde::{Deserialize, Serialize};

use crate::config::ReconcilerConfig;
use crate::types::*;

/// Why a row was not picked up by a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Belongs to the other pass
    WrongKind,
    /// Transfer was never initiated
    NotInitiated,
    /// Already in a terminal state
    AlreadyResolved,
    /// Row carries no item id
    MissingId,
}

/// Decide whether a row is processed by the pass for `kind`
pub fn check_eligibility(
    row: &LedgerRow,
    kind: ItemKind,
    config: &ReconcilerConfig,
) -> Result<(), SkipReason> {
    if !kind.matches(&row.mime_type, &config.folder_mime_type) {
        return Err(SkipReason::WrongKind);
    }
    if !row.transfer_processed {
        return Err(SkipReason::NotInitiated);
    }
    if row.transfer_accepted.is_terminal() {
        return Err(SkipReason::AlreadyResolved);
    }
    if row.id.is_empty() {
        return Err(SkipReason::MissingId);
    }
    Ok(())
}

/// State of the destination folder recorded in the description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentCheck {
    /// No parent id, or the "no parent" sentinel
    NotDeclared,
    /// The folder could not be fetched
    Missing,
    /// The folder exists but the acting user does not own it
    ForeignOwner { owner: Option<String> },
    /// The folder exists and belongs to the acting user
    Acceptable,
}

/// The parent id worth checking, if the descriptor declares one
pub fn declared_parent<'a>(
    descriptor: &'a TransferDescriptor,
    config: &ReconcilerConfig,
) -> Option<&'a str> {
    let parent_id = descriptor.parent_id.as_str();
    if parent_id.is_empty() || parent_id == config.no_parent_sentinel {
        None
    } else {
        Some(parent_id)
    }
}

/// Classify a fetched parent folder against the acting user
pub fn evaluate_parent(folder: Option<&RemoteItem>, acting_user: &str) -> ParentCheck {
    match folder {
        None => ParentCheck::Missing,
        Some(folder) if folder.is_owned_by(acting_user) => ParentCheck::Acceptable,
        Some(folder) => ParentCheck::ForeignOwner {
            owner: folder.first_owner_email().map(str::to_string),
        },
    }
}

/// What to do with an owned item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Leave the item where it is and record it as accepted
    Accept,
    /// Move the item into the fallback folder for this owner
    Relocate { original_owner: String },
}

/// Accept when the parent is usable, relocate otherwise
pub fn decide(parent: &ParentCheck, original_owner: &str) -> Decision {
    match parent {
        ParentCheck::Acceptable => Decision::Accept,
        _ => Decision::Relocate {
            original_owner: original_owner.to_string(),
        },
    }
}

/// Owner name from the description, falling back to the ledger's record
pub fn resolve_original_owner(descriptor: &TransferDescriptor, row: &LedgerRow) -> String {
    if descriptor.original_owner.is_empty() {
        row.owner_name.clone()
    } else {
        descriptor.original_owner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FOLDER_MIME_TYPE;

    fn row(mime_type: &str, processed: bool, status: TransferStatus) -> LedgerRow {
        LedgerRow {
            row_index: 2,
            id: "item-1".to_string(),
            title: "Item".to_string(),
            mime_type: mime_type.to_string(),
            parent_id: String::new(),
            path: String::new(),
            owner_email: "old@example.com".to_string(),
            owner_name: "Old Owner".to_string(),
            tag_processed: String::new(),
            transfer_processed: processed,
            transfer_accepted: status,
        }
    }

    fn folder(owner: &str) -> RemoteItem {
        RemoteItem {
            id: "parent".to_string(),
            title: "Parent".to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            owners: vec![Owner::new(owner)],
            parents: vec![],
            description: None,
        }
    }

    #[test]
    fn test_eligibility_filters() {
        let config = ReconcilerConfig::default();
        let pending_folder = row(FOLDER_MIME_TYPE, true, TransferStatus::Pending);

        assert_eq!(check_eligibility(&pending_folder, ItemKind::Folder, &config), Ok(()));
        assert_eq!(
            check_eligibility(&pending_folder, ItemKind::File, &config),
            Err(SkipReason::WrongKind)
        );
        assert_eq!(
            check_eligibility(&row(FOLDER_MIME_TYPE, false, TransferStatus::Pending), ItemKind::Folder, &config),
            Err(SkipReason::NotInitiated)
        );
        assert_eq!(
            check_eligibility(&row("text/plain", true, TransferStatus::Accepted), ItemKind::File, &config),
            Err(SkipReason::AlreadyResolved)
        );
        assert_eq!(
            check_eligibility(&row("text/plain", true, TransferStatus::MovedToDefault), ItemKind::File, &config),
            Err(SkipReason::AlreadyResolved)
        );

        let mut no_id = row("text/plain", true, TransferStatus::Pending);
        no_id.id.clear();
        assert_eq!(
            check_eligibility(&no_id, ItemKind::File, &config),
            Err(SkipReason::MissingId)
        );
    }

    #[test]
    fn test_sentinel_and_empty_parent_are_not_declared() {
        let config = ReconcilerConfig::default();
        let mut descriptor = TransferDescriptor {
            parent_id: "N/A".to_string(),
            original_owner: String::new(),
        };
        assert_eq!(declared_parent(&descriptor, &config), None);

        descriptor.parent_id.clear();
        assert_eq!(declared_parent(&descriptor, &config), None);

        descriptor.parent_id = "P".to_string();
        assert_eq!(declared_parent(&descriptor, &config), Some("P"));
    }

    #[test]
    fn test_parent_evaluation_and_decision() {
        let acting = "me@example.com";

        let owned = evaluate_parent(Some(&folder("ME@example.com")), acting);
        assert_eq!(owned, ParentCheck::Acceptable);
        assert_eq!(decide(&owned, "Y"), Decision::Accept);

        let foreign = evaluate_parent(Some(&folder("other@example.com")), acting);
        assert_eq!(
            foreign,
            ParentCheck::ForeignOwner {
                owner: Some("other@example.com".to_string())
            }
        );
        assert_eq!(
            decide(&foreign, "Y"),
            Decision::Relocate {
                original_owner: "Y".to_string()
            }
        );

        assert_eq!(evaluate_parent(None, acting), ParentCheck::Missing);
        assert!(matches!(decide(&ParentCheck::NotDeclared, "Y"), Decision::Relocate { .. }));
    }

    #[test]
    fn test_original_owner_falls_back_to_ledger() {
        let ledger_row = row("text/plain", true, TransferStatus::Pending);
        let mut descriptor = TransferDescriptor::default();
        assert_eq!(resolve_original_owner(&descriptor, &ledger_row), "Old Owner");

        descriptor.original_owner = "Fulano".to_string();
        assert_eq!(resolve_original_owner(&descriptor, &ledger_row), "Fulano");
    }
}
