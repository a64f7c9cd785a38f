// src/models/row.rs

//! Business-rule row and its column schema.
//!
//! One spreadsheet row holds both the filter thresholds (read-only inputs)
//! and the latest evaluation result (output fields) for one tracked product.
//! The field-to-column mapping is declared once as an ordered schema; the row
//! store consults it at read and write time, so no runtime introspection is
//! involved.

use serde_json::Value;

use crate::error::{AppError, Result};

/// Identity of one row: spreadsheet, tab, 1-based row number.
///
/// `index = 1` is a valid data row; no header offset is applied here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKey {
    pub sheet_id: String,
    pub sheet_name: String,
    pub index: u32,
}

impl RowKey {
    pub fn new(sheet_id: impl Into<String>, sheet_name: impl Into<String>, index: u32) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            sheet_name: sheet_name.into(),
            index,
        }
    }
}

/// One entry of a record's column schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Field name, used for write addressing and error messages
    pub field: &'static str,
    /// Column letter(s) in the sheet
    pub column: &'static str,
    /// Whether this field is included in write batches
    pub updatable: bool,
}

impl ColumnSpec {
    pub const fn new(field: &'static str, column: &'static str, updatable: bool) -> Self {
        Self {
            field,
            column,
            updatable,
        }
    }
}

/// A record type that maps onto a rectangular grid row.
pub trait SheetRecord: Sized + Send + Sync {
    /// Ordered field-to-column schema. Read requests cover every entry;
    /// write requests cover only the updatable ones.
    fn schema() -> &'static [ColumnSpec];

    /// Build a record from one cell per schema entry, in schema order.
    /// Cells are already trimmed; `None` is an empty cell.
    fn from_cells(key: RowKey, cells: &[Option<String>]) -> Result<Self>;

    /// The row identity.
    fn key(&self) -> &RowKey;

    /// Serialized value of one updatable field, JSON-compatible.
    fn cell_value(&self, field: &str) -> Value;
}

/// Status-flag values that make a row eligible for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Run,
    Rerun,
}

impl RunStatus {
    pub const ALL: [RunStatus; 2] = [RunStatus::Run, RunStatus::Rerun];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Run => "RUN",
            RunStatus::Rerun => "RERUN",
        }
    }

    /// Whether a status cell marks its row as eligible.
    pub fn matches(cell: &str) -> bool {
        Self::ALL.iter().any(|s| s.as_str() == cell)
    }
}

/// The tracked-product row, columns A through P.
///
/// Columns D–J are the only ones ever written back.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub key: RowKey,

    // Read-only business parameters
    /// A: status flag deciding eligibility
    pub status: String,
    /// B: product display name
    pub product_name: String,
    /// C: product-compare page URL
    pub compare_url: String,

    // Output fields, rewritten every run
    /// D: lowest valid competitor price (legacy single-currency cell)
    pub lowest_price: Option<f64>,
    /// E: winning seller name
    pub seller: String,
    /// F: last-update timestamp, DD/MM/YYYY HH:MM:SS
    pub time_update: String,
    /// G: free-text note
    pub note: String,
    /// H: own seller's 1-based rank, or the "NaN" sentinel
    pub rank: String,
    /// I: own offer price, primary currency
    pub own_price: Option<f64>,
    /// J: own offer price, local currency
    pub own_local_price: Option<f64>,

    // Read-only filter thresholds
    /// K: minimum seller feedback count
    pub min_feedback_count: i64,
    /// L: minimum seller feedback rating
    pub min_feedback_percent: f64,
    /// M: maximum delivery time in minutes
    pub max_delivery_minutes: i64,
    /// N: minimum-quantity floor
    pub min_quantity_floor: u32,
    /// O: minimum-stock floor
    pub min_stock_floor: u32,
    /// P: address range holding the seller blacklist
    pub blacklist_range: String,
}

impl ProductRow {
    pub const SCHEMA: &'static [ColumnSpec] = &[
        ColumnSpec::new("status", "A", false),
        ColumnSpec::new("product_name", "B", false),
        ColumnSpec::new("compare_url", "C", false),
        ColumnSpec::new("lowest_price", "D", true),
        ColumnSpec::new("seller", "E", true),
        ColumnSpec::new("time_update", "F", true),
        ColumnSpec::new("note", "G", true),
        ColumnSpec::new("rank", "H", true),
        ColumnSpec::new("own_price", "I", true),
        ColumnSpec::new("own_local_price", "J", true),
        ColumnSpec::new("min_feedback_count", "K", false),
        ColumnSpec::new("min_feedback_percent", "L", false),
        ColumnSpec::new("max_delivery_minutes", "M", false),
        ColumnSpec::new("min_quantity_floor", "N", false),
        ColumnSpec::new("min_stock_floor", "O", false),
        ColumnSpec::new("blacklist_range", "P", false),
    ];
}

impl SheetRecord for ProductRow {
    fn schema() -> &'static [ColumnSpec] {
        Self::SCHEMA
    }

    fn from_cells(key: RowKey, cells: &[Option<String>]) -> Result<Self> {
        if cells.len() != Self::SCHEMA.len() {
            return Err(AppError::validation(format!(
                "row {}: expected {} cells, got {}",
                key.index,
                Self::SCHEMA.len(),
                cells.len()
            )));
        }

        let row = key.index;
        Ok(Self {
            status: req_str(cells, 0, row)?,
            product_name: req_str(cells, 1, row)?,
            compare_url: req_str(cells, 2, row)?,
            lowest_price: opt_f64(cells, 3, row)?,
            seller: opt_str(cells, 4),
            time_update: opt_str(cells, 5),
            note: opt_str(cells, 6),
            rank: opt_str(cells, 7),
            own_price: opt_f64(cells, 8, row)?,
            own_local_price: opt_f64(cells, 9, row)?,
            min_feedback_count: req_i64(cells, 10, row)?,
            min_feedback_percent: req_f64(cells, 11, row)?,
            max_delivery_minutes: req_i64(cells, 12, row)?,
            min_quantity_floor: req_u32(cells, 13, row)?,
            min_stock_floor: req_u32(cells, 14, row)?,
            blacklist_range: req_str(cells, 15, row)?,
            key,
        })
    }

    fn key(&self) -> &RowKey {
        &self.key
    }

    fn cell_value(&self, field: &str) -> Value {
        match field {
            "lowest_price" => number_or_empty(self.lowest_price),
            "seller" => Value::String(self.seller.clone()),
            "time_update" => Value::String(self.time_update.clone()),
            "note" => Value::String(self.note.clone()),
            "rank" => Value::String(self.rank.clone()),
            "own_price" => number_or_empty(self.own_price),
            "own_local_price" => number_or_empty(self.own_local_price),
            _ => Value::Null,
        }
    }
}

/// Prices are written as numbers; an absent price clears the cell.
fn number_or_empty(value: Option<f64>) -> Value {
    match value {
        Some(v) => Value::from(v),
        None => Value::String(String::new()),
    }
}

fn field_name(idx: usize) -> &'static str {
    ProductRow::SCHEMA[idx].field
}

fn raw(cells: &[Option<String>], idx: usize) -> Option<&str> {
    cells[idx].as_deref().filter(|s| !s.is_empty())
}

fn req_str(cells: &[Option<String>], idx: usize, row: u32) -> Result<String> {
    raw(cells, idx)
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(format!("row {}: missing {}", row, field_name(idx))))
}

fn opt_str(cells: &[Option<String>], idx: usize) -> String {
    raw(cells, idx).unwrap_or_default().to_string()
}

fn req_i64(cells: &[Option<String>], idx: usize, row: u32) -> Result<i64> {
    let s = raw(cells, idx)
        .ok_or_else(|| AppError::validation(format!("row {}: missing {}", row, field_name(idx))))?;
    s.parse().map_err(|_| {
        AppError::validation(format!(
            "row {}: {} is not an integer: {:?}",
            row,
            field_name(idx),
            s
        ))
    })
}

fn req_u32(cells: &[Option<String>], idx: usize, row: u32) -> Result<u32> {
    let s = raw(cells, idx)
        .ok_or_else(|| AppError::validation(format!("row {}: missing {}", row, field_name(idx))))?;
    s.parse().map_err(|_| {
        AppError::validation(format!(
            "row {}: {} is not a non-negative integer: {:?}",
            row,
            field_name(idx),
            s
        ))
    })
}

fn req_f64(cells: &[Option<String>], idx: usize, row: u32) -> Result<f64> {
    let s = raw(cells, idx)
        .ok_or_else(|| AppError::validation(format!("row {}: missing {}", row, field_name(idx))))?;
    s.parse().map_err(|_| {
        AppError::validation(format!(
            "row {}: {} is not a number: {:?}",
            row,
            field_name(idx),
            s
        ))
    })
}

fn opt_f64(cells: &[Option<String>], idx: usize, row: u32) -> Result<Option<f64>> {
    match raw(cells, idx) {
        None => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|_| {
            AppError::validation(format!(
                "row {}: {} is not a number: {:?}",
                row,
                field_name(idx),
                s
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn sample_cells() -> Vec<Option<String>> {
        vec![
            Some("RUN".to_string()),                      // A status
            Some("Gold 100k".to_string()),                // B product_name
            Some("https://example.com/gold".to_string()), // C compare_url
            Some("12.5".to_string()),                     // D lowest_price
            Some("bob".to_string()),                      // E seller
            Some("01/01/2026 00:00:00".to_string()),      // F time_update
            None,                                         // G note
            Some("3".to_string()),                        // H rank
            None,                                         // I own_price
            None,                                         // J own_local_price
            Some("100".to_string()),                      // K min_feedback_count
            Some("95.5".to_string()),                     // L min_feedback_percent
            Some("60".to_string()),                       // M max_delivery_minutes
            Some("5".to_string()),                        // N min_quantity_floor
            Some("10".to_string()),                       // O min_stock_floor
            Some("Q2:Q20".to_string()),                   // P blacklist_range
        ]
    }

    fn sample_key() -> RowKey {
        RowKey::new("sheet-1", "Products", 4)
    }

    #[test]
    fn test_schema_layout() {
        let columns: Vec<&str> = ProductRow::SCHEMA.iter().map(|s| s.column).collect();
        assert_eq!(
            columns,
            [
                "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P"
            ]
        );

        let updatable: Vec<&str> = ProductRow::SCHEMA
            .iter()
            .filter(|s| s.updatable)
            .map(|s| s.column)
            .collect();
        assert_eq!(updatable, ["D", "E", "F", "G", "H", "I", "J"]);
    }

    #[test]
    fn test_from_cells() {
        let row = ProductRow::from_cells(sample_key(), &sample_cells()).unwrap();
        assert_eq!(row.status, "RUN");
        assert_eq!(row.lowest_price, Some(12.5));
        assert_eq!(row.note, "");
        assert_eq!(row.own_price, None);
        assert_eq!(row.min_feedback_count, 100);
        assert_eq!(row.min_feedback_percent, 95.5);
        assert_eq!(row.blacklist_range, "Q2:Q20");
    }

    #[test]
    fn test_from_cells_missing_threshold() {
        let mut cells = sample_cells();
        cells[10] = None; // min_feedback_count
        let err = ProductRow::from_cells(sample_key(), &cells).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("min_feedback_count"));
    }

    #[test]
    fn test_from_cells_malformed_number() {
        let mut cells = sample_cells();
        cells[11] = Some("ninety".to_string());
        let err = ProductRow::from_cells(sample_key(), &cells).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_cell_values() {
        let mut row = ProductRow::from_cells(sample_key(), &sample_cells()).unwrap();
        row.rank = "NaN".to_string();
        row.own_price = Some(9.99);

        assert_eq!(row.cell_value("lowest_price"), Value::from(12.5));
        assert_eq!(row.cell_value("rank"), Value::String("NaN".to_string()));
        assert_eq!(row.cell_value("own_price"), Value::from(9.99));
        // A cleared price cell is written as an empty string.
        assert_eq!(
            row.cell_value("own_local_price"),
            Value::String(String::new())
        );
    }

    #[test]
    fn test_run_status() {
        assert!(RunStatus::matches("RUN"));
        assert!(RunStatus::matches("RERUN"));
        assert!(!RunStatus::matches("DONE"));
        assert!(!RunStatus::matches(""));
    }
}
