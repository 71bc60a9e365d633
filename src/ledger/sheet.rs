//! Conversion of raw sheet values into ledger rows

use serde_json::Value;
use tracing::debug;

use crate::config::LedgerSchema;
use crate::types::*;

/// Render a cell as text the way the sheet displays it
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A boolean cell may hold a real boolean or exactly the text "true"
pub fn cell_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}

/// Check that the first row of the sheet is the expected header
pub fn validate_header(header: &[Value], schema: &LedgerSchema) -> TransferResult<()> {
    let found: Vec<String> = header.iter().map(|v| cell_text(v).trim().to_string()).collect();

    if found.len() < schema.headers.len() || found[..schema.headers.len()] != schema.headers[..] {
        return Err(TransferError::LedgerAccess(format!(
            "Sheet '{}' header mismatch: expected [{}], found [{}]",
            schema.sheet_name,
            schema.headers.join(", "),
            found.join(", ")
        )));
    }

    Ok(())
}

/// Parse the full sheet grid (header row first) into ledger rows.
///
/// Row indices are 1-indexed sheet positions, so the first data row is 2.
pub fn parse_sheet(values: &[Vec<Value>], schema: &LedgerSchema) -> TransferResult<Vec<LedgerRow>> {
    let (header, data) = values.split_first().ok_or_else(|| {
        TransferError::LedgerAccess(format!("Sheet '{}' is empty", schema.sheet_name))
    })?;
    validate_header(header, schema)?;

    let columns = Columns::resolve(schema)?;
    let rows: Vec<LedgerRow> = data
        .iter()
        .enumerate()
        .map(|(offset, cells)| columns.row(offset + 2, cells))
        .collect();

    debug!(rows = rows.len(), sheet = %schema.sheet_name, "Ledger rows read");
    Ok(rows)
}

/// Column positions resolved once per sheet
struct Columns {
    id: usize,
    title: Option<usize>,
    mime_type: usize,
    parent_id: Option<usize>,
    path: Option<usize>,
    owner_email: Option<usize>,
    owner_name: usize,
    tag_processed: Option<usize>,
    transfer_processed: usize,
    transfer_accepted: usize,
}

impl Columns {
    fn resolve(schema: &LedgerSchema) -> TransferResult<Self> {
        Ok(Self {
            id: schema.required_column("ID")?,
            title: schema.column("Title"),
            mime_type: schema.required_column("MimeType")?,
            parent_id: schema.column("ParentID"),
            path: schema.column("Path"),
            owner_email: schema.column("OwnerEmail"),
            owner_name: schema.required_column("OwnerName")?,
            tag_processed: schema.column("TagProcessed"),
            transfer_processed: schema.required_column("TransferProcessed")?,
            transfer_accepted: schema.required_column("TransferAccepted")?,
        })
    }

    fn row(&self, row_index: usize, cells: &[Value]) -> LedgerRow {
        // Short rows are padded with empty cells
        let text = |column: usize| cells.get(column).map(cell_text).unwrap_or_default();
        let optional = |column: Option<usize>| column.map(text).unwrap_or_default();

        LedgerRow {
            row_index,
            id: text(self.id),
            title: optional(self.title),
            mime_type: text(self.mime_type),
            parent_id: optional(self.parent_id),
            path: optional(self.path),
            owner_email: optional(self.owner_email),
            owner_name: text(self.owner_name),
            tag_processed: optional(self.tag_processed),
            transfer_processed: cells
                .get(self.transfer_processed)
                .is_some_and(cell_flag),
            transfer_accepted: TransferStatus::from_cell(&text(self.transfer_accepted)),
        }
    }
}
