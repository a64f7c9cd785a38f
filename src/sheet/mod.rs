// src/sheet/mod.rs

//! Grid access abstractions.
//!
//! The row store (`store::RowStore`) translates between record types and a
//! rectangular grid addressed by column letters and a 1-based row index. The
//! underlying transport is behind the `GridClient` trait with two backends:
//! an HTTP one for the real spreadsheet API and an in-memory one for tests
//! and dry runs.

pub mod memory;
pub mod rest;
pub mod store;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};

// Re-export for convenience
pub use memory::MemoryGrid;
pub use rest::RestGridClient;
pub use store::RowStore;

/// One cell write: A1 range plus serialized value.
#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub range: String,
    pub value: Value,
}

/// Transport for batched reads and writes against one worksheet.
#[async_trait]
pub trait GridClient: Send + Sync {
    /// Fetch every requested A1 range in one call.
    ///
    /// Per range, returns the covered rows, each a vector of cell strings.
    /// An empty cell comes back as an empty string or a truncated row.
    async fn batch_get(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        ranges: &[String],
    ) -> Result<Vec<Vec<Vec<String>>>>;

    /// Apply all writes as one batched call.
    async fn batch_update(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        writes: &[CellWrite],
    ) -> Result<()>;

    /// All values of one column, top to bottom. `col` is 1-based.
    async fn col_values(&self, sheet_id: &str, sheet_name: &str, col: u32) -> Result<Vec<String>>;
}

/// A rectangular A1 region, all bounds 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub col_start: u32,
    pub row_start: u32,
    pub col_end: u32,
    pub row_end: u32,
}

/// Convert a column letter sequence to its 1-based index ("A" -> 1, "AA" -> 27).
pub fn col_to_index(col: &str) -> Result<u32> {
    if col.is_empty() {
        return Err(AppError::validation("empty column reference"));
    }
    let mut index: u32 = 0;
    for c in col.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return Err(AppError::validation(format!("bad column reference: {col:?}")));
        }
        index = index * 26 + (c as u32 - 'A' as u32 + 1);
    }
    Ok(index)
}

/// Convert a 1-based column index to its letter sequence (1 -> "A", 27 -> "AA").
pub fn index_to_col(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        index -= 1;
        letters.push(b'A' + (index % 26) as u8);
        index /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parse one A1 reference like `"B4"` into (column index, row).
fn parse_cell(cell: &str) -> Result<(u32, u32)> {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| AppError::validation(format!("bad cell reference: {cell:?}")))?;
    let (col, row) = cell.split_at(split);
    let row: u32 = row
        .parse()
        .map_err(|_| AppError::validation(format!("bad cell reference: {cell:?}")))?;
    if row == 0 {
        return Err(AppError::validation(format!("bad cell reference: {cell:?}")));
    }
    Ok((col_to_index(col)?, row))
}

/// Parse an A1 range (`"A5"`, `"Q2:Q20"`, `"B2:D4"`) into a rectangle.
pub fn parse_range(range: &str) -> Result<CellRect> {
    let (start, end) = match range.split_once(':') {
        Some((s, e)) => (s.trim(), e.trim()),
        None => (range.trim(), range.trim()),
    };
    let (col_start, row_start) = parse_cell(start)?;
    let (col_end, row_end) = parse_cell(end)?;
    if col_end < col_start || row_end < row_start {
        return Err(AppError::validation(format!("inverted range: {range:?}")));
    }
    Ok(CellRect {
        col_start,
        row_start,
        col_end,
        row_end,
    })
}

/// Render a cell value the way it is addressed to the grid.
///
/// Strings pass through; numbers use their JSON rendering.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
