// src/pipeline/run.rs

//! Per-row evaluation driver.
//!
//! One evaluation runs fetch row → fetch page → flatten → fetch blacklist →
//! filter → rank → reconcile → write row, wrapped in an outer retry. A row
//! that still fails gets a timestamped note written straight to its note
//! cell and the loop moves on; nothing is fatal to the loop.

use std::time::Duration;

use chrono::Local;
use serde_json::Value;

use crate::config::{Config, DEFAULT_RELAX_SECS, ROW_MAX_RETRIES, ROW_RETRY_SECS};
use crate::error::{AppError, Result};
use crate::models::{ProductRow, RunStatus};
use crate::pipeline::reconcile::{last_update_message, reconcile};
use crate::pipeline::{filter, flatten_offers};
use crate::retry::retry_on_fail;
use crate::scrape::PageSource;
use crate::sheet::{GridClient, RowStore, col_to_index};

/// Drives sequential row evaluations against one store and one page source.
pub struct Evaluator<'a, C: GridClient> {
    store: &'a RowStore<C>,
    source: &'a dyn PageSource,
    config: &'a Config,
}

impl<'a, C: GridClient> Evaluator<'a, C> {
    pub fn new(store: &'a RowStore<C>, source: &'a dyn PageSource, config: &'a Config) -> Self {
        Self {
            store,
            source,
            config,
        }
    }

    /// One full fetch-through-persist sequence. Errors propagate to the
    /// caller's retry layer.
    pub async fn evaluate_row(&self, index: u32) -> Result<()> {
        let sheet = &self.config.sheet;
        log::info!("Processing row: {}", index);

        let mut row: ProductRow = self
            .store
            .get(&sheet.spreadsheet_key, &sheet.sheet_name, index)
            .await?;

        let page = self.source.fetch(&row.compare_url).await?;
        let offers = flatten_offers(&page);
        log::info!("Flattened {} offers for {}", offers.len(), row.product_name);

        let blacklist = self
            .store
            .fetch_range(&sheet.spreadsheet_key, &sheet.sheet_name, &row.blacklist_range)
            .await?;

        let (valid_offers, own_offer) = filter::partition(
            &offers,
            &row,
            &blacklist,
            &self.config.seller.own_name,
        );

        reconcile(
            &mut row,
            &offers,
            &valid_offers,
            own_offer.as_ref(),
            &self.config.seller.own_name,
            Local::now(),
        );

        self.store.update(&row).await
    }

    /// Evaluate one row with the outer retry layer and failure recovery.
    ///
    /// Success is followed by the configured relax delay, failure by the
    /// default one; either way the caller can proceed to the next row.
    pub async fn process_row(&self, index: u32) {
        let result = retry_on_fail(
            ROW_MAX_RETRIES,
            Duration::from_secs(ROW_RETRY_SECS),
            || self.evaluate_row(index),
        )
        .await;

        match result {
            Ok(()) => {
                tokio::time::sleep(Duration::from_secs(self.config.run.relax_secs)).await;
            }
            Err(e) => {
                self.recover_row(index, &e).await;
                tokio::time::sleep(Duration::from_secs(DEFAULT_RELAX_SECS)).await;
            }
        }
    }

    /// Leave a timestamped failure note on the row, bypassing reconciliation.
    async fn recover_row(&self, index: u32, error: &AppError) {
        let label = match error {
            AppError::Validation(_) => "VALIDATION ERROR",
            _ => "FAILED",
        };
        log::error!("{} AT ROW: {} ({})", label, index, error);

        let sheet = &self.config.sheet;
        let note = format!(
            "{} {} AT ROW: {}",
            last_update_message(Local::now()),
            label,
            index
        );
        if let Err(write_error) = self
            .store
            .update_cell::<ProductRow>(
                &sheet.spreadsheet_key,
                &sheet.sheet_name,
                index,
                "note",
                Value::String(note),
            )
            .await
        {
            log::error!(
                "Could not write failure note for row {}: {}",
                index,
                write_error
            );
        }
    }

    /// 1-based indexes of rows whose status cell carries an eligible flag.
    pub async fn eligible_indexes(&self) -> Result<Vec<u32>> {
        let sheet = &self.config.sheet;
        let status_col = col_to_index(ProductRow::SCHEMA[0].column)?;
        let values = self
            .store
            .client()
            .col_values(&sheet.spreadsheet_key, &sheet.sheet_name, status_col)
            .await?;

        Ok(values
            .iter()
            .enumerate()
            .filter(|(_, value)| RunStatus::matches(value.trim()))
            .map(|(i, _)| i as u32 + 1)
            .collect())
    }

    /// One pass over every eligible row.
    pub async fn run_pass(&self) -> Result<()> {
        let indexes = self.eligible_indexes().await?;
        log::info!("Run indexes: {:?}", indexes);
        for index in indexes {
            self.process_row(index).await;
        }
        Ok(())
    }

    /// Evaluate rows until the process is terminated externally.
    pub async fn run_forever(&self) {
        loop {
            if let Err(e) = self.run_pass().await {
                log::error!("Pass failed: {}", e);
                tokio::time::sleep(Duration::from_secs(DEFAULT_RELAX_SECS)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::models::{OfferPage, OfferSlots, PageData, PageProps};
    use crate::pipeline::testutil::offer;
    use crate::sheet::MemoryGrid;

    const SHEET_ID: &str = "sheet-1";
    const SHEET_NAME: &str = "Products";

    struct StubPageSource {
        page: PageData,
    }

    #[async_trait]
    impl PageSource for StubPageSource {
        async fn fetch(&self, _url: &str) -> Result<PageData> {
            Ok(self.page.clone())
        }
    }

    struct FailingPageSource;

    #[async_trait]
    impl PageSource for FailingPageSource {
        async fn fetch(&self, url: &str) -> Result<PageData> {
            Err(AppError::scrape(url, "app element not found"))
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.sheet.spreadsheet_key = SHEET_ID.to_string();
        config.sheet.sheet_name = SHEET_NAME.to_string();
        config.seller.own_name = "cnlgaming".to_string();
        config.run.relax_secs = 0;
        config
    }

    fn store() -> RowStore<MemoryGrid> {
        RowStore::new(MemoryGrid::new()).with_retry_interval(Duration::ZERO)
    }

    fn seed_row(grid: &MemoryGrid, index: u32) {
        let cells = [
            ("A", "RUN"),
            ("B", "Gold 100k"),
            ("C", "https://example.com/gold"),
            ("K", "100"),
            ("L", "95.0"),
            ("M", "60"),
            ("N", "5"),
            ("O", "10"),
            ("P", "Q2:Q20"),
        ];
        for (col, value) in cells {
            grid.set(SHEET_ID, SHEET_NAME, &format!("{col}{index}"), value);
        }
        grid.set(SHEET_ID, SHEET_NAME, "Q2", "scammer1");
    }

    fn page_with(offers: Vec<crate::models::Offer>) -> PageData {
        PageData {
            props: PageProps {
                model: OfferSlots {
                    currencies: Some(OfferPage {
                        current_page: 1,
                        data: offers,
                    }),
                    ..OfferSlots::default()
                },
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_row_success_writes_outputs() {
        let store = store();
        seed_row(store.client(), 4);
        let source = StubPageSource {
            page: page_with(vec![
                offer("alice", 10.0),
                offer("cnlgaming", 12.0),
                offer("scammer1", 1.0),
            ]),
        };
        let config = config();
        let evaluator = Evaluator::new(&store, &source, &config);

        evaluator.process_row(4).await;

        let grid = store.client();
        assert_eq!(grid.get_cell(SHEET_ID, SHEET_NAME, "D4").as_deref(), Some("10.0"));
        assert_eq!(grid.get_cell(SHEET_ID, SHEET_NAME, "E4").as_deref(), Some("alice"));
        // Blacklisted offer still counts toward the rank of all offers.
        assert_eq!(grid.get_cell(SHEET_ID, SHEET_NAME, "H4").as_deref(), Some("3"));
        assert_eq!(grid.get_cell(SHEET_ID, SHEET_NAME, "I4").as_deref(), Some("12.0"));
        assert!(grid.get_cell(SHEET_ID, SHEET_NAME, "F4").is_some());
        // Clean run: note cell cleared.
        assert_eq!(grid.get_cell(SHEET_ID, SHEET_NAME, "G4"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_row_validation_failure_leaves_note() {
        let store = store();
        seed_row(store.client(), 4);
        store.client().set(SHEET_ID, SHEET_NAME, "K4", ""); // drop a required threshold
        let source = StubPageSource {
            page: page_with(vec![offer("alice", 10.0)]),
        };
        let config = config();
        let evaluator = Evaluator::new(&store, &source, &config);

        evaluator.process_row(4).await;

        let note = store
            .client()
            .get_cell(SHEET_ID, SHEET_NAME, "G4")
            .unwrap();
        assert!(note.contains("VALIDATION ERROR AT ROW: 4"));
        // No reconciliation output was written.
        assert_eq!(store.client().get_cell(SHEET_ID, SHEET_NAME, "E4"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_row_empty_blacklist_fails() {
        let store = store();
        seed_row(store.client(), 4);
        store.client().set(SHEET_ID, SHEET_NAME, "Q2", ""); // empty the blacklist range
        let source = StubPageSource {
            page: page_with(vec![offer("alice", 10.0)]),
        };
        let config = config();
        let evaluator = Evaluator::new(&store, &source, &config);

        evaluator.process_row(4).await;

        let note = store
            .client()
            .get_cell(SHEET_ID, SHEET_NAME, "G4")
            .unwrap();
        assert!(note.contains("FAILED AT ROW: 4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_row_scrape_failure_leaves_note() {
        let store = store();
        seed_row(store.client(), 4);
        let source = FailingPageSource;
        let config = config();
        let evaluator = Evaluator::new(&store, &source, &config);

        evaluator.process_row(4).await;

        let note = store
            .client()
            .get_cell(SHEET_ID, SHEET_NAME, "G4")
            .unwrap();
        assert!(note.contains("FAILED AT ROW: 4"));
    }

    #[tokio::test]
    async fn test_eligible_indexes() {
        let store = store();
        let grid = store.client();
        grid.set(SHEET_ID, SHEET_NAME, "A1", "STATUS");
        grid.set(SHEET_ID, SHEET_NAME, "A2", "RUN");
        grid.set(SHEET_ID, SHEET_NAME, "A3", "done");
        grid.set(SHEET_ID, SHEET_NAME, "A4", "RERUN");
        grid.set(SHEET_ID, SHEET_NAME, "A6", "RUN");

        let source = StubPageSource {
            page: PageData::default(),
        };
        let config = config();
        let evaluator = Evaluator::new(&store, &source, &config);

        assert_eq!(evaluator.eligible_indexes().await.unwrap(), vec![2, 4, 6]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_valid_offers_and_no_own_offer() {
        let store = store();
        seed_row(store.client(), 4);
        let source = StubPageSource {
            page: page_with(vec![offer("scammer1", 5.0)]),
        };
        let config = config();
        let evaluator = Evaluator::new(&store, &source, &config);

        evaluator.process_row(4).await;

        let grid = store.client();
        let note = grid.get_cell(SHEET_ID, SHEET_NAME, "G4").unwrap();
        assert!(note.contains("Không có seller hợp lệ"));
        assert!(note.contains("Không tìm thấy seller cnlgaming"));
        assert_eq!(grid.get_cell(SHEET_ID, SHEET_NAME, "H4").as_deref(), Some("NaN"));
        assert_eq!(grid.get_cell(SHEET_ID, SHEET_NAME, "D4"), None);
        assert_eq!(grid.get_cell(SHEET_ID, SHEET_NAME, "E4"), None);
    }
}
