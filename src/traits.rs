//! Traits for the external collaborators of the reconciler

use async_trait::async_trait;

use crate::types::*;

/// Access to the transfer ledger
///
/// Implementations normalize raw cells into [`LedgerRow`] at the read
/// boundary (see [`crate::ledger::parse_sheet`]). The reconciler only ever
/// writes the acceptance column.
#[async_trait]
pub trait LedgerAccessor: Send + Sync {
    /// Read every data row in sheet order
    async fn read_rows(&self) -> TransferResult<Vec<LedgerRow>>;

    /// Set the acceptance status of a single row
    async fn write_acceptance(
        &mut self,
        row_index: usize,
        status: TransferStatus,
    ) -> TransferResult<()>;
}

/// Storage backend holding the transferred items
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fetch item metadata (owners, parents, description)
    async fn get_item(&self, item_id: &str) -> TransferResult<RemoteItem>;

    /// Fetch a folder, returning `None` if it does not exist
    async fn get_folder(&self, folder_id: &str) -> TransferResult<Option<RemoteItem>>;

    /// Id of the acting user's root folder
    async fn root_folder_id(&self) -> TransferResult<String>;

    /// Ids of folders directly under `parent_id` whose title is exactly `name`
    async fn find_folders_by_name(&self, parent_id: &str, name: &str)
        -> TransferResult<Vec<String>>;

    /// Create a folder under `parent_id` and return its id
    async fn create_folder(&mut self, name: &str, parent_id: &str) -> TransferResult<String>;

    /// Add one parent and remove the listed parents in a single update
    async fn update_parents(
        &mut self,
        item_id: &str,
        add_parent: &str,
        remove_parents: &[String],
    ) -> TransferResult<()>;
}

/// Source of the acting user's identity
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Email of the user the run acts on behalf of
    async fn acting_user_email(&self) -> TransferResult<String>;
}

/// Identity fixed at construction
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    email: String,
}

impl StaticIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn acting_user_email(&self) -> TransferResult<String> {
        if self.email.trim().is_empty() {
            return Err(TransferError::Identity(
                "Acting user email is empty".to_string(),
            ));
        }
        Ok(self.email.clone())
    }
}
