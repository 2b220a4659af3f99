pub mod orderbook;
pub mod price_levels;
