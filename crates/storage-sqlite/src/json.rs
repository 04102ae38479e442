//! Helpers for JSON-typed columns.

use log::warn;

/// Decodes a JSON string-list column. A corrupt list degrades to empty
/// rather than failing the read.
pub(crate) fn string_list_from_json(raw: &str, column: &str, row_id: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!("Ignoring malformed {column} JSON on row {row_id}: {err}");
        Vec::new()
    })
}
