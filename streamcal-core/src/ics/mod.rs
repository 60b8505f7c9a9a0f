//! ICS generation and parsing.
//!
//! This module handles reading and writing calendar documents according to
//! RFC 5545, on top of the icalendar crate.

mod generate;
mod parse;

pub use generate::{generate_calendar, generate_merged};
pub use parse::{parse_calendar, start_instant};

/// PRODID of the release calendar
pub const RELEASES_PRODID: &str = "-//streamcal//Streaming Releases//EN";

/// PRODID of merged calendars
pub const MERGED_PRODID: &str = "-//streamcal//Merged Calendar//EN";
