// src/pipeline/flatten.rs

//! Offer flattener.
//!
//! Normalizes the six optional page slots into one ordered sequence. The
//! slot order is fixed and must stay reproducible: downstream rank sorting
//! is stable, so flatten order decides ties.

use crate::models::{Offer, PageData};

/// Flatten a scraped page into one ordered offer sequence.
///
/// Slot order: `currency_offer`, `currencies.data`, `account_offer`,
/// `accounts.data`, `item_offer`, `items.data`.
pub fn flatten_offers(page: &PageData) -> Vec<Offer> {
    let slots = page.slots();
    let mut offers: Vec<Offer> = Vec::new();

    if let Some(offer) = &slots.currency_offer {
        offers.push(offer.clone());
    }
    if let Some(list) = &slots.currencies {
        offers.extend(list.data.iter().cloned());
    }
    if let Some(offer) = &slots.account_offer {
        offers.push(offer.clone());
    }
    if let Some(list) = &slots.accounts {
        offers.extend(list.data.iter().cloned());
    }
    if let Some(offer) = &slots.item_offer {
        offers.push(offer.clone());
    }
    if let Some(list) = &slots.items {
        offers.extend(list.data.iter().cloned());
    }

    offers
}
