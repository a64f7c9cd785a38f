// src/models/mod.rs

//! Domain models for the pricewatch application.

mod offer;
mod row;

// Re-export all public types
pub use offer::{
    Currency, DeliveryTime, Offer, OfferPage, OfferSlots, PageData, PageProps, Price, Seller,
    SellerRating,
};
pub use row::{ColumnSpec, ProductRow, RowKey, RunStatus, SheetRecord};
