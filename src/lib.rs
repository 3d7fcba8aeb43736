//! Papergum - German news headline aggregator
//!
//! Polls a fixed set of RSS feeds, enriches each entry with an image and an
//! excerpt scraped from the article page, and serves the result as JSON from
//! a short-lived in-memory cache.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod enricher;
pub mod extract;
pub mod fetcher;
pub mod models;
pub mod routes;
