// src/sheet/store.rs

//! Column-mapped row store.
//!
//! Translates between `SheetRecord` types and the grid: one batched read per
//! `get`/`batch_get`, one batched write per `update`/`batch_update`. Every
//! grid call is routed through the fixed-interval retry wrapper; after the
//! retries are exhausted the last error propagates and whatever the grid
//! already applied stays applied (the transport's own batch semantics decide
//! atomicity).

use std::time::Duration;

use serde_json::Value;

use crate::config::{STORE_MAX_RETRIES, STORE_RETRY_SECS};
use crate::error::{AppError, Result};
use crate::models::{RowKey, SheetRecord};
use crate::retry::retry_on_fail;
use crate::sheet::{CellWrite, GridClient};

/// Row-oriented view over a `GridClient`.
pub struct RowStore<C: GridClient> {
    client: C,
    retry_interval: Duration,
}

impl<C: GridClient> RowStore<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            retry_interval: Duration::from_secs(STORE_RETRY_SECS),
        }
    }

    /// Override the retry sleep interval. Tests use a zero interval.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch one row and validate it against the record schema.
    pub async fn get<R: SheetRecord>(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        index: u32,
    ) -> Result<R> {
        let ranges: Vec<String> = R::schema()
            .iter()
            .map(|spec| format!("{}{}", spec.column, index))
            .collect();

        let results = retry_on_fail(STORE_MAX_RETRIES, self.retry_interval, || {
            self.client.batch_get(sheet_id, sheet_name, &ranges)
        })
        .await?;

        let cells = Self::first_cells(&results, 0, R::schema().len());
        R::from_cells(RowKey::new(sheet_id, sheet_name, index), &cells)
    }

    /// Fetch several rows with a single batched read.
    ///
    /// The read covers all fields of the first row, then all fields of the
    /// second, and so on; records come back in input order.
    pub async fn batch_get<R: SheetRecord>(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        indexes: &[u32],
    ) -> Result<Vec<R>> {
        if indexes.is_empty() {
            return Ok(Vec::new());
        }

        let fields = R::schema().len();
        let ranges: Vec<String> = indexes
            .iter()
            .flat_map(|index| {
                R::schema()
                    .iter()
                    .map(move |spec| format!("{}{}", spec.column, index))
            })
            .collect();

        let results = retry_on_fail(STORE_MAX_RETRIES, self.retry_interval, || {
            self.client.batch_get(sheet_id, sheet_name, &ranges)
        })
        .await?;

        let mut records = Vec::with_capacity(indexes.len());
        for (i, index) in indexes.iter().enumerate() {
            let cells = Self::first_cells(&results, i * fields, fields);
            records.push(R::from_cells(
                RowKey::new(sheet_id, sheet_name, *index),
                &cells,
            )?);
        }
        Ok(records)
    }

    /// Write every updatable field of one record as a single batched call.
    pub async fn update<R: SheetRecord>(&self, record: &R) -> Result<()> {
        let key = record.key();
        let writes = Self::build_writes(std::slice::from_ref(record));
        log::debug!(
            "Updating {} cells at {}:{} row {}",
            writes.len(),
            key.sheet_id,
            key.sheet_name,
            key.index
        );
        retry_on_fail(STORE_MAX_RETRIES, self.retry_interval, || {
            self.client
                .batch_update(&key.sheet_id, &key.sheet_name, &writes)
        })
        .await
    }

    /// Write every updatable field of several records as one batched call.
    /// A no-op (no grid call) when `records` is empty.
    pub async fn batch_update<R: SheetRecord>(&self, records: &[R]) -> Result<()> {
        let Some(first) = records.first() else {
            return Ok(());
        };
        let key = first.key();
        for record in records {
            let other = record.key();
            if other.sheet_id != key.sheet_id || other.sheet_name != key.sheet_name {
                return Err(AppError::validation(format!(
                    "batch_update mixes sheets: {}:{} and {}:{}",
                    key.sheet_id, key.sheet_name, other.sheet_id, other.sheet_name
                )));
            }
        }

        let writes = Self::build_writes(records);
        retry_on_fail(STORE_MAX_RETRIES, self.retry_interval, || {
            self.client
                .batch_update(&key.sheet_id, &key.sheet_name, &writes)
        })
        .await
    }

    /// Write one field of one row directly, bypassing full reconciliation.
    /// Used by the failure path to leave a note on the row.
    pub async fn update_cell<R: SheetRecord>(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        index: u32,
        field: &str,
        value: Value,
    ) -> Result<()> {
        let spec = R::schema()
            .iter()
            .find(|spec| spec.field == field && spec.updatable)
            .ok_or_else(|| {
                AppError::validation(format!("no updatable field {field:?} in schema"))
            })?;

        let writes = vec![CellWrite {
            range: format!("{}{}", spec.column, index),
            value,
        }];
        retry_on_fail(STORE_MAX_RETRIES, self.retry_interval, || {
            self.client.batch_update(sheet_id, sheet_name, &writes)
        })
        .await
    }

    /// Fetch one address range and flatten its cells in row order.
    ///
    /// A range that yields no values is an error naming the sheet and range.
    pub async fn fetch_range(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        range: &str,
    ) -> Result<Vec<String>> {
        let ranges = vec![range.to_string()];
        let mut results = retry_on_fail(STORE_MAX_RETRIES, self.retry_interval, || {
            self.client.batch_get(sheet_id, sheet_name, &ranges)
        })
        .await?;

        let values: Vec<String> = results
            .pop()
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter(|v| !v.is_empty())
            .collect();

        if values.is_empty() {
            return Err(AppError::sheet(sheet_id, sheet_name, range));
        }
        Ok(values)
    }

    /// Take the trimmed first cell of each of `count` consecutive ranges.
    fn first_cells(
        results: &[Vec<Vec<String>>],
        offset: usize,
        count: usize,
    ) -> Vec<Option<String>> {
        (offset..offset + count)
            .map(|i| {
                results
                    .get(i)
                    .and_then(|rows| rows.first())
                    .and_then(|row| row.first())
                    .map(|cell| cell.trim().to_string())
            })
            .collect()
    }

    fn build_writes<R: SheetRecord>(records: &[R]) -> Vec<CellWrite> {
        let mut writes = Vec::new();
        for record in records {
            let index = record.key().index;
            for spec in R::schema().iter().filter(|spec| spec.updatable) {
                writes.push(CellWrite {
                    range: format!("{}{}", spec.column, index),
                    value: record.cell_value(spec.field),
                });
            }
        }
        writes
    }
}
