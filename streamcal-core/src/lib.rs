//! Core of streamcal.
//!
//! - `releases` builds the streaming release calendar from a [`discovery::Catalog`]
//!   (TMDB in production), using `eligibility` for the inclusion rules and
//!   `schedule` for grouping and rendering
//! - `merge` combines several calendars and prunes stale generated events
//! - `ics` reads and writes calendar documents

pub mod date_window;
pub mod discovery;
pub mod eligibility;
pub mod error;
pub mod event;
pub mod ics;
pub mod merge;
pub mod releases;
pub mod schedule;
pub mod settings;
pub mod title;
pub mod tmdb;

pub use error::{StreamcalError, StreamcalResult};
pub use settings::Settings;
