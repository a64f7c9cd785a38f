// src/scrape/mod.rs

//! Compare-page acquisition.
//!
//! The marketplace renders its offer listings into a JSON blob on the
//! `data-page` attribute of the `#app` element. Fetching the page and
//! decoding that blob is all the scraping this crate does; the evaluation
//! pipeline never touches markup.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::config::RunConfig;
use crate::error::{AppError, Result};
use crate::models::PageData;

/// Source of structured page data for a compare URL.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageData>;
}

/// Page source fetching over HTTP and extracting the embedded JSON.
pub struct HtmlPageSource {
    client: reqwest::Client,
}

impl HtmlPageSource {
    pub fn new(config: &RunConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HtmlPageSource {
    async fn fetch(&self, url: &str) -> Result<PageData> {
        url::Url::parse(url)?;
        log::info!("Fetching page data from {}", url);
        let text = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        extract_page_data(&text, url)
    }
}

/// Extract the page-data JSON from a rendered compare page.
pub fn extract_page_data(html: &str, url: &str) -> Result<PageData> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("#app")
        .map_err(|e| AppError::scrape(url, format!("bad app selector: {e}")))?;

    let app = document
        .select(&selector)
        .next()
        .ok_or_else(|| AppError::scrape(url, "app element not found"))?;

    let raw = app
        .value()
        .attr("data-page")
        .ok_or_else(|| AppError::scrape(url, "page data attribute not found"))?;

    serde_json::from_str(raw).map_err(|e| AppError::validation(format!("page data: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/compare";

    #[test]
    fn test_extract_page_data() {
        let html = r#"<html><body>
            <div id="app" data-page='{"props":{"model":{"currencies":{"current_page":1,"data":[]}}}}'></div>
        </body></html>"#;
        let page = extract_page_data(html, URL).unwrap();
        assert!(page.slots().currencies.is_some());
        assert!(page.slots().item_offer.is_none());
    }

    #[test]
    fn test_missing_app_element() {
        let err = extract_page_data("<html><body></body></html>", URL).unwrap_err();
        assert!(matches!(err, AppError::Scrape { .. }));
        assert!(err.to_string().contains("app element"));
    }

    #[test]
    fn test_missing_page_data_attribute() {
        let err = extract_page_data(r#"<div id="app"></div>"#, URL).unwrap_err();
        assert!(matches!(err, AppError::Scrape { .. }));
    }

    #[test]
    fn test_malformed_page_data_is_validation_error() {
        let err = extract_page_data(r#"<div id="app" data-page='{"props": 5}'></div>"#, URL)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
