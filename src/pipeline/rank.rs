// src/pipeline/rank.rs

//! Offer ranker.
//!
//! Picks the cheapest valid competitor and computes the own seller's 1-based
//! rank among all flattened offers.

use crate::models::Offer;

/// The cheapest offer, or `None` for an empty slice.
///
/// Ties keep the earliest-seen offer: a candidate is only replaced on a
/// strictly lower price.
pub fn cheapest(valid_offers: &[Offer]) -> Option<&Offer> {
    let mut min_offer = valid_offers.first()?;
    for offer in &valid_offers[1..] {
        if offer.price.amount < min_offer.price.amount {
            min_offer = offer;
        }
    }
    Some(min_offer)
}

/// 1-based position of the own seller when all offers are sorted ascending
/// by price; `-1` when the own seller is absent.
///
/// The sort is stable, so equal-priced offers keep their flatten order.
pub fn own_rank(all_offers: &[Offer], own_seller: &str) -> i64 {
    let mut sorted: Vec<&Offer> = all_offers.iter().collect();
    sorted.sort_by(|a, b| a.price.amount.total_cmp(&b.price.amount));

    sorted
        .iter()
        .position(|offer| offer.seller.username == own_seller)
        .map_or(-1, |i| i as i64 + 1)
}
