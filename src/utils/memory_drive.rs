//! In-memory storage backend for testing

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::poisoned;
use crate::config::FOLDER_MIME_TYPE;
use crate::traits::*;
use crate::types::*;

/// A parent update issued against the drive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentUpdate {
    pub item_id: String,
    pub added: String,
    pub removed: Vec<String>,
}

#[derive(Debug, Default)]
struct DriveState {
    items: BTreeMap<String, RemoteItem>,
    fetches: Vec<String>,
    created: Vec<String>,
    updates: Vec<ParentUpdate>,
    failing_fetches: HashSet<String>,
    failing_moves: HashSet<String>,
    failing_creations: HashSet<String>,
}

/// Drive held in memory. Folders it creates are owned by `owner_email`.
///
/// Clones share state, like [`super::MemoryLedger`].
#[derive(Debug, Clone)]
pub struct MemoryDrive {
    root_id: String,
    owner_email: String,
    state: Arc<RwLock<DriveState>>,
}

impl MemoryDrive {
    pub fn new(owner_email: impl Into<String>) -> Self {
        Self {
            root_id: "root".to_string(),
            owner_email: owner_email.into(),
            state: Arc::new(RwLock::new(DriveState::default())),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Insert or replace an item
    pub fn insert(&self, item: RemoteItem) -> TransferResult<()> {
        self.state
            .write()
            .map_err(poisoned)?
            .items
            .insert(item.id.clone(), item);
        Ok(())
    }

    /// Add a folder owned by `owner` under `parent_id`
    pub fn add_folder(&self, id: &str, title: &str, owner: &str, parent_id: &str) -> TransferResult<()> {
        self.insert(RemoteItem {
            id: id.to_string(),
            title: title.to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            owners: vec![Owner::new(owner)],
            parents: vec![parent_id.to_string()],
            description: None,
        })
    }

    /// Remove an item, as if it had been deleted
    pub fn remove(&self, item_id: &str) -> TransferResult<Option<RemoteItem>> {
        Ok(self.state.write().map_err(poisoned)?.items.remove(item_id))
    }

    pub fn item(&self, item_id: &str) -> TransferResult<Option<RemoteItem>> {
        Ok(self.state.read().map_err(poisoned)?.items.get(item_id).cloned())
    }

    /// Change the first owner of an item, as a completed transfer would
    pub fn set_owner(&self, item_id: &str, owner: &str) -> TransferResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        let item = state
            .items
            .get_mut(item_id)
            .ok_or_else(|| TransferError::Storage(format!("No item {}", item_id)))?;
        item.owners = vec![Owner::new(owner)];
        Ok(())
    }

    /// Ids fetched through [`StorageBackend::get_item`] and [`StorageBackend::get_folder`]
    pub fn fetches(&self) -> TransferResult<Vec<String>> {
        Ok(self.state.read().map_err(poisoned)?.fetches.clone())
    }

    /// Names of folders created through [`StorageBackend::create_folder`]
    pub fn created_folders(&self) -> TransferResult<Vec<String>> {
        Ok(self.state.read().map_err(poisoned)?.created.clone())
    }

    pub fn parent_updates(&self) -> TransferResult<Vec<ParentUpdate>> {
        Ok(self.state.read().map_err(poisoned)?.updates.clone())
    }

    /// Make every fetch of `item_id` fail
    pub fn fail_fetches_for(&self, item_id: &str) -> TransferResult<()> {
        self.state
            .write()
            .map_err(poisoned)?
            .failing_fetches
            .insert(item_id.to_string());
        Ok(())
    }

    /// Make parent updates of `item_id` fail
    pub fn fail_moves_for(&self, item_id: &str) -> TransferResult<()> {
        self.state
            .write()
            .map_err(poisoned)?
            .failing_moves
            .insert(item_id.to_string());
        Ok(())
    }

    /// Make creation of a folder named `name` fail
    pub fn fail_folder_creation(&self, name: &str) -> TransferResult<()> {
        self.state
            .write()
            .map_err(poisoned)?
            .failing_creations
            .insert(name.to_string());
        Ok(())
    }

    fn fetch(&self, item_id: &str) -> TransferResult<Option<RemoteItem>> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.fetches.push(item_id.to_string());
        if state.failing_fetches.contains(item_id) {
            return Err(TransferError::Storage(format!(
                "Fetch of {} failed",
                item_id
            )));
        }
        Ok(state.items.get(item_id).cloned())
    }
}

#[async_trait]
impl StorageBackend for MemoryDrive {
    async fn get_item(&self, item_id: &str) -> TransferResult<RemoteItem> {
        self.fetch(item_id)?
            .ok_or_else(|| TransferError::Storage(format!("File not found: {}", item_id)))
    }

    async fn get_folder(&self, folder_id: &str) -> TransferResult<Option<RemoteItem>> {
        Ok(self
            .fetch(folder_id)?
            .filter(|item| item.mime_type == FOLDER_MIME_TYPE))
    }

    async fn root_folder_id(&self) -> TransferResult<String> {
        Ok(self.root_id.clone())
    }

    async fn find_folders_by_name(
        &self,
        parent_id: &str,
        name: &str,
    ) -> TransferResult<Vec<String>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .items
            .values()
            .filter(|item| {
                item.mime_type == FOLDER_MIME_TYPE
                    && item.title == name
                    && item.parents.iter().any(|p| p == parent_id)
            })
            .map(|item| item.id.clone())
            .collect())
    }

    async fn create_folder(&mut self, name: &str, parent_id: &str) -> TransferResult<String> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.failing_creations.contains(name) {
            return Err(TransferError::Storage(format!(
                "Creation of folder '{}' rejected",
                name
            )));
        }

        let id = Uuid::new_v4().to_string();
        state.items.insert(
            id.clone(),
            RemoteItem {
                id: id.clone(),
                title: name.to_string(),
                mime_type: FOLDER_MIME_TYPE.to_string(),
                owners: vec![Owner::new(self.owner_email.clone())],
                parents: vec![parent_id.to_string()],
                description: None,
            },
        );
        state.created.push(name.to_string());
        Ok(id)
    }

    async fn update_parents(
        &mut self,
        item_id: &str,
        add_parent: &str,
        remove_parents: &[String],
    ) -> TransferResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.failing_moves.contains(item_id) {
            return Err(TransferError::Storage(format!(
                "Update of {} rejected",
                item_id
            )));
        }

        if !state.items.contains_key(add_parent) {
            return Err(TransferError::Storage(format!(
                "Parent folder not found: {}",
                add_parent
            )));
        }

        let item = state
            .items
            .get_mut(item_id)
            .ok_or_else(|| TransferError::Storage(format!("File not found: {}", item_id)))?;
        item.parents.retain(|p| !remove_parents.contains(p));
        if !item.parents.iter().any(|p| p == add_parent) {
            item.parents.push(add_parent.to_string());
        }

        state.updates.push(ParentUpdate {
            item_id: item_id.to_string(),
            added: add_parent.to_string(),
            removed: remove_parents.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_parents_replaces_listed_parents() {
        let mut drive = MemoryDrive::new("me@example.com");
        drive.add_folder("a", "A", "me@example.com", "root").unwrap();
        drive.add_folder("b", "B", "me@example.com", "root").unwrap();
        drive
            .update_parents("a", "b", &["root".to_string()])
            .await
            .unwrap();

        assert_eq!(drive.item("a").unwrap().unwrap().parents, vec!["b".to_string()]);
        assert_eq!(drive.parent_updates().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_parents_rejects_missing_destination() {
        let mut drive = MemoryDrive::new("me@example.com");
        drive.add_folder("a", "A", "me@example.com", "root").unwrap();

        let result = drive.update_parents("a", "deleted", &["root".to_string()]).await;

        assert!(matches!(result, Err(TransferError::Storage(_))));
        assert_eq!(drive.item("a").unwrap().unwrap().parents, vec!["root".to_string()]);
        assert!(drive.parent_updates().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_folder_creation_failure_leaves_no_folder() {
        let mut drive = MemoryDrive::new("me@example.com");
        drive.fail_folder_creation("Transferidos de Y").unwrap();

        assert!(drive.create_folder("Transferidos de Y", "root").await.is_err());
        assert!(drive.created_folders().unwrap().is_empty());
        assert!(drive
            .find_folders_by_name("root", "Transferidos de Y")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_get_folder_ignores_files_and_missing_ids() {
        let drive = MemoryDrive::new("me@example.com");
        drive
            .insert(RemoteItem {
                id: "doc".to_string(),
                title: "Doc".to_string(),
                mime_type: "text/plain".to_string(),
                owners: vec![Owner::new("me@example.com")],
                parents: vec![],
                description: None,
            })
            .unwrap();

        assert_eq!(drive.get_folder("doc").await.unwrap(), None);
        assert_eq!(drive.get_folder("nope").await.unwrap(), None);
        assert!(drive.get_item("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_created_folders_are_findable_by_name() {
        let mut drive = MemoryDrive::new("me@example.com");
        let id = drive.create_folder("Transferidos de Y", "root").await.unwrap();

        let found = drive.find_folders_by_name("root", "Transferidos de Y").await.unwrap();
        assert_eq!(found, vec![id.clone()]);
        assert!(drive.item(&id).unwrap().unwrap().is_owned_by("me@example.com"));
        assert!(drive.find_folders_by_name("other", "Transferidos de Y").await.unwrap().is_empty());
    }
}
