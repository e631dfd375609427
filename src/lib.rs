//! DuckDex - offline collectible duck discovery
//!
//! Keeps a local collection of scanned ducks, caches duck images in an
//! append-only blob store, and serves the app shell cache-first so the
//! app keeps working without a network.

pub mod app;
pub mod blob;
pub mod card;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod consent;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod reset;
pub mod shell;
pub mod store;
pub mod ui;

pub use error::{DexError, DexResult};
