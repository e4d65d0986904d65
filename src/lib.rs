//! Streaming availability service.
//!
//! Answers which of a user's active streaming subscriptions carry a title in a
//! region, for one title or a batch, on top of TMDb watch-provider data.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
