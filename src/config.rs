//! Reconciler configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::*;

/// Mime type the storage backend uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Header of the ledger sheet, in column order
pub const DEFAULT_HEADERS: [&str; 10] = [
    "ID",
    "Title",
    "MimeType",
    "ParentID",
    "Path",
    "OwnerEmail",
    "OwnerName",
    "TagProcessed",
    "TransferProcessed",
    "TransferAccepted",
];

/// Columns the reconciler cannot work without
const REQUIRED_HEADERS: [&str; 5] = [
    "ID",
    "MimeType",
    "OwnerName",
    "TransferProcessed",
    "TransferAccepted",
];

fn default_folder_mime_type() -> String {
    FOLDER_MIME_TYPE.to_string()
}

fn default_fallback_prefix() -> String {
    "Transferidos de ".to_string()
}

fn default_no_parent_sentinel() -> String {
    "N/A".to_string()
}

fn default_sheet_name() -> String {
    "Database".to_string()
}

fn default_headers() -> Vec<String> {
    DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect()
}

/// Location and layout of the ledger sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSchema {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_headers")]
    pub headers: Vec<String>,
}

impl Default for LedgerSchema {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: default_sheet_name(),
            headers: default_headers(),
        }
    }
}

impl LedgerSchema {
    /// 0-indexed position of a named column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 0-indexed position of a named column, failing if the schema lacks it
    pub fn required_column(&self, name: &str) -> TransferResult<usize> {
        self.column(name).ok_or_else(|| {
            TransferError::LedgerAccess(format!("Ledger schema has no '{}' column", name))
        })
    }

    /// 1-indexed column the acceptance status is written to
    pub fn acceptance_column(&self) -> TransferResult<usize> {
        Ok(self.required_column("TransferAccepted")? + 1)
    }
}

/// Settings injected into [`crate::TransferReconciler`] at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcilerConfig {
    #[serde(default = "default_folder_mime_type")]
    pub folder_mime_type: String,
    /// Prefix of the fallback folder name; the original owner is appended
    #[serde(default = "default_fallback_prefix")]
    pub fallback_folder_prefix: String,
    /// Parent id written upstream when an item had no parent
    #[serde(default = "default_no_parent_sentinel")]
    pub no_parent_sentinel: String,
    #[serde(default)]
    pub ledger: LedgerSchema,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            folder_mime_type: default_folder_mime_type(),
            fallback_folder_prefix: default_fallback_prefix(),
            no_parent_sentinel: default_no_parent_sentinel(),
            ledger: LedgerSchema::default(),
        }
    }
}

impl ReconcilerConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(content: &str) -> TransferResult<Self> {
        let config: ReconcilerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn load(path: &Path) -> TransferResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TransferError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> TransferResult<()> {
        if self.folder_mime_type.trim().is_empty() {
            return Err(TransferError::Config(
                "Folder mime type cannot be empty".to_string(),
            ));
        }

        if self.fallback_folder_prefix.trim().is_empty() {
            return Err(TransferError::Config(
                "Fallback folder prefix cannot be empty".to_string(),
            ));
        }

        for header in REQUIRED_HEADERS {
            if self.ledger.column(header).is_none() {
                return Err(TransferError::Config(format!(
                    "Ledger headers must include '{}'",
                    header
                )));
            }
        }

        Ok(())
    }

    /// Name of the root-level folder that receives items for `original_owner`
    pub fn fallback_folder_name(&self, original_owner: &str) -> String {
        format!("{}{}", self.fallback_folder_prefix, original_owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_ledger_layout() {
        let config = ReconcilerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.sheet_name, "Database");
        assert_eq!(config.ledger.acceptance_column().unwrap(), 10);
        assert_eq!(
            config.fallback_folder_name("Fulano de Tal"),
            "Transferidos de Fulano de Tal"
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ReconcilerConfig::from_json_str(
            r#"{ "ledger": { "spreadsheetId": "sheet-123" } }"#,
        )
        .unwrap();
        assert_eq!(config.ledger.spreadsheet_id, "sheet-123");
        assert_eq!(config.ledger.headers.len(), 10);
        assert_eq!(config.folder_mime_type, FOLDER_MIME_TYPE);
        assert_eq!(config.no_parent_sentinel, "N/A");
    }

    #[test]
    fn test_rejects_headers_without_acceptance_column() {
        let result = ReconcilerConfig::from_json_str(
            r#"{ "ledger": { "headers": ["ID", "MimeType", "OwnerName", "TransferProcessed"] } }"#,
        );
        assert!(matches!(result, Err(TransferError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = ReconcilerConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(TransferError::Json(_))));
    }
}
