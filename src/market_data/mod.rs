pub mod alpha_vantage;
pub mod loader;
pub mod price_store;

// Re-export the core types for convenient access (e.g. `use crate::market_data::PriceSeries`).
pub use loader::load_csv;
pub use price_store::{PriceSeries, PriceStore};
