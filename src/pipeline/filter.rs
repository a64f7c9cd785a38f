// src/pipeline/filter.rs

//! Offer filter.
//!
//! Applies the seller blacklist and the six quality thresholds from the
//! business-rule row, short-circuiting on the first failed rule.

use crate::models::{Offer, ProductRow};

/// Whether an offer passes the blacklist and all row thresholds.
///
/// Rules are evaluated in a fixed order; the first failure decides.
pub fn is_valid(offer: &Offer, rule_row: &ProductRow, blacklist: &[String]) -> bool {
    if blacklist.iter().any(|b| b == &offer.seller.username) {
        return false;
    }
    if offer.seller.total_ratings < rule_row.min_feedback_count {
        return false;
    }
    if offer.seller.rating.value < rule_row.min_feedback_percent {
        return false;
    }
    if offer.delivery_time.minutes() > rule_row.max_delivery_minutes {
        return false;
    }
    if let Some(min_quantity) = offer.min_quantity
        && min_quantity > rule_row.min_quantity_floor
    {
        return false;
    }
    if let Some(stock) = offer.stock
        && stock < rule_row.min_stock_floor
    {
        return false;
    }
    true
}

/// Split offers into the valid competitors and the own offer.
///
/// The own offer is captured by seller name regardless of validity; if it
/// appears more than once the last match wins. Validity and ownership are
/// independent: the own offer may or may not also be in `valid_offers`.
pub fn partition(
    offers: &[Offer],
    rule_row: &ProductRow,
    blacklist: &[String],
    own_seller: &str,
) -> (Vec<Offer>, Option<Offer>) {
    let mut valid_offers = Vec::new();
    let mut own_offer = None;

    for offer in offers {
        if offer.seller.username == own_seller {
            own_offer = Some(offer.clone());
        }
        if is_valid(offer, rule_row, blacklist) {
            valid_offers.push(offer.clone());
        }
    }

    (valid_offers, own_offer)
}
