//! Bookpro - a book-review catalog service
//!
//! This library provides the data store, session guard, HTTP surface, and
//! typed client for the bookpro server binary.

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod metrics;
pub mod models;
pub mod server;
pub mod store;
pub mod validation;

// Re-export Args for the binary
pub use cli::Args;
