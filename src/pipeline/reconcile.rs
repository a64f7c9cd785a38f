// src/pipeline/reconcile.rs

//! Run reconciler.
//!
//! Combines filter and rank outputs into the row's output fields. The note
//! is cleared once at the start of a run and fragments are appended, never
//! overwritten, so both failure notes can land in the same run.

use chrono::{DateTime, Local};

use crate::models::{Offer, ProductRow};
use crate::pipeline::rank;

/// Note fragment for a run without any valid competing offer.
pub const NO_VALID_SELLER_NOTE: &str = "Không có seller hợp lệ \n";

/// Rank sentinel when the own offer is absent from the page.
pub const RANK_SENTINEL: &str = "NaN";

/// Note fragment naming the own seller that was not found.
pub fn own_seller_missing_note(own_seller: &str) -> String {
    format!("Không tìm thấy seller {own_seller}")
}

/// Timestamp format written to the last-update field.
pub fn last_update_message(now: DateTime<Local>) -> String {
    now.format("%d/%m/%Y %H:%M:%S").to_string()
}

/// Fill the row's output fields from one evaluation.
///
/// `all_offers` is the full flattened sequence (rank input), `valid_offers`
/// the filtered competitors, `own_offer` the designated seller's offer if it
/// appeared on the page.
pub fn reconcile(
    row: &mut ProductRow,
    all_offers: &[Offer],
    valid_offers: &[Offer],
    own_offer: Option<&Offer>,
    own_seller: &str,
    now: DateTime<Local>,
) {
    row.note.clear();

    match rank::cheapest(valid_offers) {
        Some(min_offer) => {
            log::info!(
                "Cheapest valid offer: {} at {} ({} local)",
                min_offer.seller.username,
                min_offer.price.amount,
                min_offer.local_price.amount
            );
            row.seller = min_offer.seller.username.clone();
            row.lowest_price = Some(min_offer.price.amount);
        }
        None => {
            log::info!("No valid offer");
            row.seller.clear();
            row.lowest_price = None;
            row.note.push_str(NO_VALID_SELLER_NOTE);
        }
    }

    match own_offer {
        Some(own) => {
            let top = rank::own_rank(all_offers, own_seller);
            log::info!("Own offer at rank {}", top);
            row.rank = top.to_string();
            row.own_price = Some(own.price.amount);
            row.own_local_price = Some(own.local_price.amount);
        }
        None => {
            log::info!("Own seller {} not found on page", own_seller);
            row.rank = RANK_SENTINEL.to_string();
            row.own_price = None;
            row.own_local_price = None;
            row.note.push_str(&own_seller_missing_note(own_seller));
        }
    }

    row.time_update = last_update_message(now);
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::pipeline::testutil::{offer, rule_row};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 29, 14, 30, 5).unwrap()
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(last_update_message(now()), "29/08/2026 14:30:05");
    }

    #[test]
    fn test_reconcile_happy_path() {
        let mut row = rule_row();
        row.note = "stale note".to_string();
        let all = vec![offer("alice", 10.0), offer("me", 12.0), offer("bob", 11.0)];
        let valid = vec![all[0].clone(), all[2].clone()];
        let own = all[1].clone();

        reconcile(&mut row, &all, &valid, Some(&own), "me", now());

        assert_eq!(row.seller, "alice");
        assert_eq!(row.lowest_price, Some(10.0));
        assert_eq!(row.rank, "3");
        assert_eq!(row.own_price, Some(12.0));
        assert_eq!(row.own_local_price, Some(12.0 * 1.1));
        assert_eq!(row.note, "");
        assert_eq!(row.time_update, "29/08/2026 14:30:05");
    }

    #[test]
    fn test_reconcile_no_valid_offer() {
        let mut row = rule_row();
        row.seller = "old".to_string();
        row.lowest_price = Some(9.0);
        let all = vec![offer("me", 12.0)];

        reconcile(&mut row, &all, &[], Some(&all[0].clone()), "me", now());

        assert_eq!(row.seller, "");
        assert_eq!(row.lowest_price, None);
        assert!(row.note.contains("Không có seller hợp lệ"));
        assert_eq!(row.rank, "1");
    }

    #[test]
    fn test_reconcile_own_offer_missing() {
        let mut row = rule_row();
        row.own_price = Some(3.0);
        let all = vec![offer("alice", 10.0)];
        let valid = all.clone();

        reconcile(&mut row, &all, &valid, None, "me", now());

        assert_eq!(row.rank, "NaN");
        assert_eq!(row.own_price, None);
        assert_eq!(row.own_local_price, None);
        assert!(row.note.contains("Không tìm thấy seller me"));
    }

    #[test]
    fn test_reconcile_both_notes_concatenate() {
        let mut row = rule_row();
        reconcile(&mut row, &[], &[], None, "me", now());

        // Both fragments in one note, no-valid-seller first.
        let expected = format!("{}{}", NO_VALID_SELLER_NOTE, own_seller_missing_note("me"));
        assert_eq!(row.note, expected);
    }
}
