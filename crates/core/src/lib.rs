pub mod catalog;
pub mod error;
pub mod types;
pub mod watchlist;
