pub mod admin;
pub mod artwork;
pub mod config;
pub mod error;
pub mod identity;
pub mod live_search;
pub mod routes;
pub mod state;
pub mod views;
