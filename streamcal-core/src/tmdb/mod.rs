//! TMDB (The Movie Database) API v3 client.

mod client;
pub mod types;

pub use client::{API_KEY_VAR, TmdbClient};
