//! Transfer reconciler that drives acceptance over the ledger

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::ReconcilerConfig;
use crate::description::parse_description;
use crate::reconciliation::decision::*;
use crate::reconciliation::report::{ReconciliationReport, RowOutcome};
use crate::traits::*;
use crate::types::*;

/// Reconciles pending ownership transfers recorded in the ledger
///
/// Rows are processed one at a time. A row only leaves `Pending` once the
/// acting user owns the item and, if needed, the item has been relocated.
/// Failures for one row are recorded in the report and never stop the pass.
pub struct TransferReconciler<L: LedgerAccessor, S: StorageBackend, I: IdentityProvider> {
    ledger: L,
    storage: S,
    identity: I,
    config: ReconcilerConfig,
    /// Fallback folder ids by folder name, valid for the current run only
    fallback_folders: HashMap<String, String>,
}

impl<L: LedgerAccessor, S: StorageBackend, I: IdentityProvider> TransferReconciler<L, S, I> {
    /// Create a reconciler with the default configuration
    pub fn new(ledger: L, storage: S, identity: I) -> Self {
        Self::with_config(ledger, storage, identity, ReconcilerConfig::default())
    }

    /// Create a reconciler with an explicit configuration
    pub fn with_config(ledger: L, storage: S, identity: I, config: ReconcilerConfig) -> Self {
        Self {
            ledger,
            storage,
            identity,
            config,
            fallback_folders: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Accept pending folder transfers
    pub async fn reconcile_folders(&mut self) -> TransferResult<ReconciliationReport> {
        self.reconcile(ItemKind::Folder).await
    }

    /// Accept pending file transfers
    pub async fn reconcile_files(&mut self) -> TransferResult<ReconciliationReport> {
        self.reconcile(ItemKind::File).await
    }

    /// Run the folder pass to completion, then the file pass
    pub async fn reconcile_all(&mut self) -> TransferResult<Vec<ReconciliationReport>> {
        let folders = self.reconcile_folders().await?;
        let files = self.reconcile_files().await?;
        Ok(vec![folders, files])
    }

    /// Run one pass. Only ledger and identity failures are returned as errors.
    pub async fn reconcile(&mut self, kind: ItemKind) -> TransferResult<ReconciliationReport> {
        info!(pass = %kind, "Starting transfer acceptance");
        self.fallback_folders.clear();

        let rows = self.ledger.read_rows().await?;
        let acting_user = self.identity.acting_user_email().await?.to_lowercase();
        info!(pass = %kind, acting_user = %acting_user, rows = rows.len(), "Ledger loaded");

        let mut report = ReconciliationReport::new(kind, &acting_user);
        report.rows_examined = rows.len();

        for row in &rows {
            if let Err(reason) = check_eligibility(row, kind, &self.config) {
                debug!(row = row.row_index, item_id = %row.id, ?reason, "Row skipped");
                report.rows_skipped += 1;
                continue;
            }

            let applied = match self.process_row(row, &acting_user).await {
                Ok(outcome) => self.apply_outcome(row, outcome).await,
                Err(e) => Err(e),
            };

            match applied {
                Ok(outcome) => report.record(&row.id, &outcome),
                Err(e) => {
                    warn!(row = row.row_index, item_id = %row.id, error = %e, "Row left pending");
                    report.record_failure(row, &e);
                }
            }
        }

        report.finish();
        info!(
            pass = %kind,
            accepted = report.accepted.len(),
            relocated = report.relocated.len(),
            awaiting = report.awaiting_ownership.len(),
            failures = report.failures.len(),
            "Transfer acceptance done"
        );
        Ok(report)
    }

    /// Decide and carry out the storage side of one eligible row
    async fn process_row(&mut self, row: &LedgerRow, acting_user: &str) -> TransferResult<RowOutcome> {
        debug!(row = row.row_index, item_id = %row.id, "Processing row");

        let item = self
            .storage
            .get_item(&row.id)
            .await
            .map_err(|e| TransferError::ItemFetch {
                item_id: row.id.clone(),
                message: e.to_string(),
            })?;

        if !item.is_owned_by(acting_user) {
            info!(
                row = row.row_index,
                item_id = %row.id,
                title = %row.title,
                "Item not yet transferred to the acting user"
            );
            return Ok(RowOutcome::AwaitingOwnership);
        }

        let descriptor = parse_description(item.description.as_deref());
        let original_owner = resolve_original_owner(&descriptor, row);
        let parent = self.check_parent(&descriptor, acting_user).await;

        match decide(&parent, &original_owner) {
            Decision::Accept => {
                info!(item_id = %item.id, parent_id = %descriptor.parent_id, "Parent folder belongs to acting user");
                Ok(RowOutcome::Accepted)
            }
            Decision::Relocate { original_owner } => {
                info!(item_id = %item.id, ?parent, "Parent folder unusable, relocating");
                let folder_id = self.relocate(&item, &original_owner).await?;
                Ok(RowOutcome::Relocated { folder_id })
            }
        }
    }

    /// Look up the described parent. Fetch errors count as a missing folder.
    async fn check_parent(&self, descriptor: &TransferDescriptor, acting_user: &str) -> ParentCheck {
        let Some(parent_id) = declared_parent(descriptor, &self.config) else {
            debug!("No usable parent folder id in description");
            return ParentCheck::NotDeclared;
        };

        let folder = match self.storage.get_folder(parent_id).await {
            Ok(folder) => folder,
            Err(e) => {
                debug!(parent_id = %parent_id, error = %e, "Parent folder lookup failed");
                None
            }
        };

        evaluate_parent(folder.as_ref(), acting_user)
    }

    /// Move the item into the fallback folder as its only parent
    async fn relocate(&mut self, item: &RemoteItem, original_owner: &str) -> TransferResult<String> {
        let move_error = |e: TransferError| TransferError::Move {
            item_id: item.id.clone(),
            message: e.to_string(),
        };

        let folder_id = self
            .resolve_fallback_folder(original_owner)
            .await
            .map_err(move_error)?;

        info!(item_id = %item.id, title = %item.title, folder_id = %folder_id, "Moving item to fallback folder");
        self.storage
            .update_parents(&item.id, &folder_id, &item.parents)
            .await
            .map_err(move_error)?;

        Ok(folder_id)
    }

    /// Find the fallback folder for an owner at the root, creating it if absent
    async fn resolve_fallback_folder(&mut self, original_owner: &str) -> TransferResult<String> {
        let name = self.config.fallback_folder_name(original_owner);
        if let Some(folder_id) = self.fallback_folders.get(&name) {
            return Ok(folder_id.clone());
        }

        let root_id = self.storage.root_folder_id().await?;
        let existing = self.storage.find_folders_by_name(&root_id, &name).await?;

        let folder_id = match existing.into_iter().next() {
            Some(folder_id) => {
                debug!(folder = %name, folder_id = %folder_id, "Fallback folder found");
                folder_id
            }
            None => {
                let folder_id = self.storage.create_folder(&name, &root_id).await?;
                info!(folder = %name, folder_id = %folder_id, "Fallback folder created");
                folder_id
            }
        };

        self.fallback_folders.insert(name, folder_id.clone());
        Ok(folder_id)
    }

    /// Write a terminal status for the row; pending outcomes write nothing
    async fn apply_outcome(&mut self, row: &LedgerRow, outcome: RowOutcome) -> TransferResult<RowOutcome> {
        if let Some(status) = outcome.status() {
            self.ledger
                .write_acceptance(row.row_index, status)
                .await
                .map_err(|e| match e {
                    TransferError::LedgerWrite { .. } => e,
                    other => TransferError::LedgerWrite {
                        row_index: row.row_index,
                        message: other.to_string(),
                    },
                })?;
            info!(row = row.row_index, item_id = %row.id, %status, "Ledger row updated");
        }
        Ok(outcome)
    }
}
