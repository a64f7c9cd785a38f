// src/sheet/rest.rs

//! HTTP grid backend.
//!
//! Talks to the spreadsheet REST API (`values:batchGet` / `values:batchUpdate`)
//! with a bearer token. Credential acquisition happens outside this crate;
//! the token arrives via configuration.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::SheetConfig;
use crate::error::Result;
use crate::sheet::{CellWrite, GridClient, index_to_col};

/// Grid client backed by the spreadsheet REST API.
#[derive(Debug, Clone)]
pub struct RestGridClient {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    #[serde(default, rename = "valueRanges")]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl RestGridClient {
    /// Build a client from the sheet configuration.
    pub fn new(config: &SheetConfig, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    fn qualified(sheet_name: &str, range: &str) -> String {
        format!("'{sheet_name}'!{range}")
    }
}

#[async_trait]
impl GridClient for RestGridClient {
    async fn batch_get(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        ranges: &[String],
    ) -> Result<Vec<Vec<Vec<String>>>> {
        let url = format!("{}/{}/values:batchGet", self.api_base, sheet_id);
        let query: Vec<(&str, String)> = ranges
            .iter()
            .map(|r| ("ranges", Self::qualified(sheet_name, r)))
            .collect();

        let response: BatchGetResponse = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // The API answers one value range per requested range, in order;
        // an empty range carries no `values` member at all.
        Ok(response
            .value_ranges
            .into_iter()
            .map(|vr| vr.values)
            .collect())
    }

    async fn batch_update(
        &self,
        sheet_id: &str,
        sheet_name: &str,
        writes: &[CellWrite],
    ) -> Result<()> {
        let url = format!("{}/{}/values:batchUpdate", self.api_base, sheet_id);
        let data: Vec<serde_json::Value> = writes
            .iter()
            .map(|write| {
                json!({
                    "range": Self::qualified(sheet_name, &write.range),
                    "values": [[write.value.clone()]],
                })
            })
            .collect();
        let body = json!({
            "valueInputOption": "USER_ENTERED",
            "data": data,
        });

        self.client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn col_values(&self, sheet_id: &str, sheet_name: &str, col: u32) -> Result<Vec<String>> {
        let letter = index_to_col(col);
        let range = format!("{letter}:{letter}");
        let results = self
            .batch_get(sheet_id, sheet_name, &[range])
            .await?;

        Ok(results
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect())
    }
}
