// src/sheet/memory.rs

//! In-memory grid backend.
//!
//! Mirrors the remote backend's semantics closely enough for tests and dry
//! runs: a range with no populated cells returns no rows, and writing an
//! empty value clears the cell.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::sheet::{CellWrite, GridClient, parse_range, render_value};

type SheetKey = (String, String);
type CellMap = HashMap<(u32, u32), String>;

/// A grid held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryGrid {
    sheets: Mutex<HashMap<SheetKey, CellMap>>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one cell by A1 address. Intended for seeding test fixtures.
    pub fn set(&self, sheet_id: &str, sheet_name: &str, cell: &str, value: &str) {
        let rect = parse_range(cell).expect("valid cell address");
        let mut sheets = self.lock();
        let cells = sheets
            .entry((sheet_id.to_string(), sheet_name.to_string()))
            .or_default();
        if value.is_empty() {
            cells.remove(&(rect.col_start, rect.row_start));
        } else {
            cells.insert((rect.col_start, rect.row_start), value.to_string());
        }
    }

    /// Read one cell by A1 address, if populated.
    pub fn get_cell(&self, sheet_id: &str, sheet_name: &str, cell: &str) -> Option<String> {
        let rect = parse_range(cell).expect("valid cell address");
        self.lock()
            .get(&(sheet_id.to_string(), sheet_name.to_string()))
            .and_then(|cells| cells.get(&(rect.col_start, rect.row_start)).cloned())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SheetKey, CellMap>> {
        self.sheets.lock().expect("grid mutex poisoned")
    }
}

#[async_trait]
impl GridClient for MemoryGrid {
    async fn batch_get(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        ranges: &[String],
    ) -> Result<Vec<Vec<Vec<String>>>> {
        let sheets = self.lock();
        let empty = CellMap::new();
        let cells = sheets
            .get(&(sheet_id.to_string(), sheet_name.to_string()))
            .unwrap_or(&empty);

        let mut results = Vec::with_capacity(ranges.len());
        for range in ranges {
            let rect = parse_range(range)?;
            let populated = (rect.row_start..=rect.row_end).any(|row| {
                (rect.col_start..=rect.col_end).any(|col| cells.contains_key(&(col, row)))
            });
            if !populated {
                // The remote API returns no rows for an empty range.
                results.push(Vec::new());
                continue;
            }

            let mut rows = Vec::new();
            for row in rect.row_start..=rect.row_end {
                let mut row_values = Vec::new();
                for col in rect.col_start..=rect.col_end {
                    row_values.push(cells.get(&(col, row)).cloned().unwrap_or_default());
                }
                rows.push(row_values);
            }
            results.push(rows);
        }
        Ok(results)
    }

    async fn batch_update(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        writes: &[CellWrite],
    ) -> Result<()> {
        let mut sheets = self.lock();
        let cells = sheets
            .entry((sheet_id.to_string(), sheet_name.to_string()))
            .or_default();
        for write in writes {
            let rect = parse_range(&write.range)?;
            let rendered = render_value(&write.value);
            if rendered.is_empty() {
                cells.remove(&(rect.col_start, rect.row_start));
            } else {
                cells.insert((rect.col_start, rect.row_start), rendered);
            }
        }
        Ok(())
    }

    async fn col_values(&self, sheet_id: &str, sheet_name: &str, col: u32) -> Result<Vec<String>> {
        let sheets = self.lock();
        let Some(cells) = sheets.get(&(sheet_id.to_string(), sheet_name.to_string())) else {
            return Ok(Vec::new());
        };
        let last_row = cells
            .iter()
            .filter(|((c, _), v)| *c == col && !v.is_empty())
            .map(|((_, r), _)| *r)
            .max()
            .unwrap_or(0);

        Ok((1..=last_row)
            .map(|row| cells.get(&(col, row)).cloned().unwrap_or_default())
            .collect())
    }
}
