// src/models/offer.rs

//! Scraped marketplace offer structures.
//!
//! These mirror the JSON blob embedded in the compare page. A page carries up
//! to three single-offer slots and three paginated list slots; any subset,
//! including none, may be populated.

use serde::{Deserialize, Serialize};

/// Seller rating summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerRating {
    /// Rating value (e.g. percentage)
    pub value: f64,
    /// Raw rating amount
    pub amount: f64,
    /// Display format hint
    pub format: String,
}

/// Seller identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: i64,
    pub username: String,
    pub rating: SellerRating,
    pub total_ratings: i64,
}

/// Currency of a price: either a bare code string or a structured pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Currency {
    Detailed { symbol: String, code: String },
    Code(String),
}

impl Currency {
    /// The currency code regardless of variant.
    pub fn code(&self) -> &str {
        match self {
            Currency::Code(code) => code,
            Currency::Detailed { code, .. } => code,
        }
    }
}

/// Price in one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: Currency,
}

/// Promised delivery duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTime {
    pub seconds: i64,
}

impl DeliveryTime {
    /// Floor-division minutes, matching the filter contract.
    pub fn minutes(&self) -> i64 {
        self.seconds / 60
    }
}

/// One marketplace listing instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub seller: Seller,
    /// Price in the marketplace's primary currency
    pub price: Price,
    /// Price in the viewer's local currency
    pub local_price: Price,
    /// Available stock; `None` means unbounded/unknown
    #[serde(default)]
    pub stock: Option<u32>,
    /// Minimum purchase quantity; `None` means no minimum
    #[serde(default)]
    pub min_quantity: Option<u32>,
    pub delivery_time: DeliveryTime,
}

/// One page of a paginated offer list slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferPage {
    pub current_page: i64,
    pub data: Vec<Offer>,
}

/// The six offer slots of a scraped compare page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferSlots {
    #[serde(default)]
    pub currency_offer: Option<Offer>,
    #[serde(default)]
    pub currencies: Option<OfferPage>,
    #[serde(default)]
    pub item_offer: Option<Offer>,
    #[serde(default)]
    pub items: Option<OfferPage>,
    #[serde(default)]
    pub account_offer: Option<Offer>,
    #[serde(default)]
    pub accounts: Option<OfferPage>,
}

/// Wrapper matching the page JSON nesting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageProps {
    #[serde(default)]
    pub model: OfferSlots,
}

/// Root scraped page-data object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub props: PageProps,
}

impl PageData {
    /// The offer slots, skipping the JSON nesting.
    pub fn slots(&self) -> &OfferSlots {
        &self.props.model
    }
}
