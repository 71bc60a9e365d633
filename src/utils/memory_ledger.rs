//! In-memory ledger implementation for testing

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use super::poisoned;
use crate::config::LedgerSchema;
use crate::ledger::parse_sheet;
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct LedgerState {
    values: Vec<Vec<Value>>,
    writes: Vec<(usize, TransferStatus)>,
    reads: usize,
    unavailable: bool,
    failing_rows: HashSet<usize>,
}

/// Sheet held in memory as a grid of cell values, header row first.
///
/// Clones share the same grid, so a test can keep a handle for inspection
/// after handing one to the reconciler.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    schema: LedgerSchema,
    state: Arc<RwLock<LedgerState>>,
}

impl MemoryLedger {
    /// Create a ledger holding only the schema's header row
    pub fn new(schema: LedgerSchema) -> Self {
        let header = schema.headers.iter().cloned().map(Value::String).collect();
        Self::with_values(schema, vec![header])
    }

    /// Create a ledger from a raw grid, header row included
    pub fn with_values(schema: LedgerSchema, values: Vec<Vec<Value>>) -> Self {
        Self {
            schema,
            state: Arc::new(RwLock::new(LedgerState {
                values,
                ..LedgerState::default()
            })),
        }
    }

    /// Append a data row and return its 1-indexed sheet position
    pub fn push_row(&self, cells: Vec<Value>) -> TransferResult<usize> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.values.push(cells);
        Ok(state.values.len())
    }

    /// Snapshot of the raw grid
    pub fn values(&self) -> TransferResult<Vec<Vec<Value>>> {
        Ok(self.state.read().map_err(poisoned)?.values.clone())
    }

    /// Acceptance cell text of a 1-indexed row
    pub fn acceptance(&self, row_index: usize) -> TransferResult<String> {
        let column = self.schema.acceptance_column()? - 1;
        let state = self.state.read().map_err(poisoned)?;
        Ok(row_index
            .checked_sub(1)
            .and_then(|i| state.values.get(i))
            .and_then(|cells| cells.get(column))
            .map(crate::ledger::cell_text)
            .unwrap_or_default())
    }

    /// Every acceptance write, in order
    pub fn writes(&self) -> TransferResult<Vec<(usize, TransferStatus)>> {
        Ok(self.state.read().map_err(poisoned)?.writes.clone())
    }

    /// Number of full reads served
    pub fn read_count(&self) -> TransferResult<usize> {
        Ok(self.state.read().map_err(poisoned)?.reads)
    }

    /// Make every read fail, as if the sheet could not be opened
    pub fn set_unavailable(&self, unavailable: bool) -> TransferResult<()> {
        self.state.write().map_err(poisoned)?.unavailable = unavailable;
        Ok(())
    }

    /// Make writes to one row fail
    pub fn fail_writes_for(&self, row_index: usize) -> TransferResult<()> {
        self.state.write().map_err(poisoned)?.failing_rows.insert(row_index);
        Ok(())
    }
}

#[async_trait]
impl LedgerAccessor for MemoryLedger {
    async fn read_rows(&self) -> TransferResult<Vec<LedgerRow>> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.unavailable {
            return Err(TransferError::LedgerAccess(format!(
                "Spreadsheet '{}' is unavailable",
                self.schema.spreadsheet_id
            )));
        }
        state.reads += 1;
        parse_sheet(&state.values, &self.schema)
    }

    async fn write_acceptance(
        &mut self,
        row_index: usize,
        status: TransferStatus,
    ) -> TransferResult<()> {
        let column = self.schema.acceptance_column()? - 1;
        let mut state = self.state.write().map_err(poisoned)?;

        if state.failing_rows.contains(&row_index) {
            return Err(TransferError::LedgerWrite {
                row_index,
                message: "write rejected".to_string(),
            });
        }

        // Row 1 is the header and is never written
        if row_index < 2 || row_index > state.values.len() {
            return Err(TransferError::LedgerWrite {
                row_index,
                message: "row out of range".to_string(),
            });
        }

        let cells = &mut state.values[row_index - 1];
        if cells.len() <= column {
            cells.resize(column + 1, Value::Null);
        }
        cells[column] = Value::String(status.as_cell().to_string());
        state.writes.push((row_index, status));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str) -> Vec<Value> {
        vec![
            json!(id), json!("Title"), json!("text/plain"), json!(""), json!(""),
            json!(""), json!("Owner"), json!(""), json!("true"),
        ]
    }

    #[tokio::test]
    async fn test_write_only_touches_acceptance_column() {
        let mut ledger = MemoryLedger::new(LedgerSchema::default());
        let index = ledger.push_row(row("a")).unwrap();
        assert_eq!(index, 2);

        ledger
            .write_acceptance(index, TransferStatus::Accepted)
            .await
            .unwrap();

        let values = ledger.values().unwrap();
        assert_eq!(values[1].len(), 10);
        assert_eq!(values[1][9], json!("Accepted"));
        assert_eq!(values[1][..9], row("a")[..]);
        assert_eq!(ledger.acceptance(index).unwrap(), "Accepted");

        let rows = ledger.read_rows().await.unwrap();
        assert_eq!(rows[0].transfer_accepted, TransferStatus::Accepted);
    }

    #[tokio::test]
    async fn test_header_and_out_of_range_writes_fail() {
        let mut ledger = MemoryLedger::new(LedgerSchema::default());
        ledger.push_row(row("a")).unwrap();

        for index in [0, 1, 3] {
            let result = ledger.write_acceptance(index, TransferStatus::Accepted).await;
            assert!(matches!(result, Err(TransferError::LedgerWrite { .. })));
        }
        assert!(ledger.writes().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_ledger() {
        let ledger = MemoryLedger::new(LedgerSchema::default());
        ledger.set_unavailable(true).unwrap();
        assert!(matches!(
            ledger.read_rows().await,
            Err(TransferError::LedgerAccess(_))
        ));
    }
}
