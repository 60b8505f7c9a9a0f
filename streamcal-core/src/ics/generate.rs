//! ICS generation.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component};

use crate::event::ReleaseEvent;

/// Generate a complete calendar document for the release events
pub fn generate_calendar(events: &[ReleaseEvent], name: &str, prodid: &str) -> String {
    let mut cal = Calendar::new();
    cal.name(name);

    for event in events {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&event.uid);
        ics_event.summary(&event.summary);
        ics_event.description(&event.description);

        // DTSTAMP is pinned to the run time instead of the crate's own clock
        ics_event.add_property("DTSTAMP", utc_stamp(event.created));
        ics_event.add_property("DTSTART", utc_stamp(event.start));
        ics_event.add_property("DTEND", utc_stamp(event.end));

        cal.push(ics_event.done());
    }

    finalize(&cal.done().to_string(), prodid)
}

/// Generate a calendar document from events carried over from other
/// calendars, leaving their properties untouched
pub fn generate_merged(events: Vec<icalendar::Event>, name: &str, prodid: &str) -> String {
    let mut cal = Calendar::new();
    cal.name(name);

    for event in events {
        cal.push(event);
    }

    finalize(&cal.done().to_string(), prodid)
}

fn utc_stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn finalize(ics: &str, prodid: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(prodid);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
