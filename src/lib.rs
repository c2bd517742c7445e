//! An ANIMEVIETSUB episode provider backed by the Hasukatsu catalog API.
//!
//! The catalog labels episodes with free-form strings ("12", "12_2",
//! "12-13", "12_END") and may list the same episode more than once across
//! pages and mirrors. This crate pages through the listing, classifies each
//! label, drops duplicates and returns one stable, ordered episode list.
//!
//! # Features
//!
//! - Search the catalog by title, or reuse a known AniList id
//! - List the episodes of a media in release order
//! - Resolve the playable stream of an episode on a server
//!
//! # Usage
//!
//! ```bash
//! # Search
//! cargo run -- search "one piece"
//!
//! # List episodes as JSON
//! cargo run -- --json episodes 21
//! ```

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod label;
pub mod provider;
pub mod types;

pub use error::{AppError, Result};
pub use provider::{Provider, SearchOptions};
