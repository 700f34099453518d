//! Lunch-recommendation engine
//!
//! One pipeline pass per request: external place search → consolidation →
//! scoring → weighted sampling → enrichment of the sampled winners. The
//! process-wide metadata cache is the only cross-request state.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
