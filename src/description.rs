//! Parsing of the description written on an item when its transfer starts
//!
//! The upstream process writes three lines:
//!
//! ```text
//! ID da pasta: <parent id>
//! <path>
//! Proprietário antes da transferência: <owner name>
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::TransferDescriptor;

static PARENT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ID da pasta:\s*(.+)").expect("valid parent id pattern"));

static ORIGINAL_OWNER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Proprietário antes da transferência:\s*(.+)").expect("valid owner pattern")
});

/// Extract the intended parent id (line 1) and previous owner (line 3).
///
/// Never fails: missing lines or lines that do not match leave the
/// corresponding field empty.
pub fn parse_description(description: Option<&str>) -> TransferDescriptor {
    let mut descriptor = TransferDescriptor::default();

    let description = match description {
        Some(text) if !text.is_empty() => text,
        _ => {
            debug!("Empty description, nothing to extract");
            return descriptor;
        }
    };

    let lines: Vec<&str> = description.split('\n').collect();

    if let Some(captures) = lines.first().and_then(|l| PARENT_ID_PATTERN.captures(l)) {
        descriptor.parent_id = captures[1].trim().to_string();
        debug!(parent_id = %descriptor.parent_id, "Parent folder id found in description");
    }

    if let Some(captures) = lines.get(2).and_then(|l| ORIGINAL_OWNER_PATTERN.captures(l)) {
        descriptor.original_owner = captures[1].trim().to_string();
        debug!(original_owner = %descriptor.original_owner, "Original owner found in description");
    }

    descriptor
}
