// src/pipeline/mod.rs

//! Offer evaluation pipeline.
//!
//! One evaluation walks a fixed sequence: fetch row → fetch page → flatten →
//! fetch blacklist → filter → rank → reconcile → write row. `run::Evaluator`
//! drives the sequence; the other modules are its pure stages.

pub mod filter;
pub mod flatten;
pub mod rank;
pub mod reconcile;
pub mod run;

pub use flatten::flatten_offers;
pub use run::Evaluator;

#[cfg(test)]
pub(crate) mod testutil {
    use crate::models::{
        Currency, DeliveryTime, Offer, Price, ProductRow, RowKey, Seller, SellerRating,
    };

    /// An offer that passes the default thresholds of `rule_row`.
    pub fn offer(username: &str, price: f64) -> Offer {
        Offer {
            id: 1,
            seller: Seller {
                id: 1,
                username: username.to_string(),
                rating: SellerRating {
                    value: 99.0,
                    amount: 4.95,
                    format: "percent".to_string(),
                },
                total_ratings: 500,
            },
            price: Price {
                amount: price,
                currency: Currency::Code("EUR".to_string()),
            },
            local_price: Price {
                amount: price * 1.1,
                currency: Currency::Code("USD".to_string()),
            },
            stock: None,
            min_quantity: None,
            delivery_time: DeliveryTime { seconds: 600 },
        }
    }

    /// A rule row the offers from `offer` satisfy.
    pub fn rule_row() -> ProductRow {
        ProductRow {
            key: RowKey::new("sheet-1", "Products", 4),
            status: "RUN".to_string(),
            product_name: "Gold 100k".to_string(),
            compare_url: "https://example.com/gold".to_string(),
            lowest_price: None,
            seller: String::new(),
            time_update: String::new(),
            note: String::new(),
            rank: String::new(),
            own_price: None,
            own_local_price: None,
            min_feedback_count: 100,
            min_feedback_percent: 95.0,
            max_delivery_minutes: 60,
            min_quantity_floor: 5,
            min_stock_floor: 10,
            blacklist_range: "Q2:Q20".to_string(),
        }
    }
}
