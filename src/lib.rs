// src/lib.rs

//! pricewatch library
//!
//! Scrapes a marketplace compare page, evaluates competing offers against a
//! designated seller and writes the price/ranking decision back to one row
//! of a spreadsheet-style grid.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod retry;
pub mod scrape;
pub mod sheet;
