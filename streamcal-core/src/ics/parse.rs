//! ICS parsing using the icalendar crate's parser.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime};

use crate::error::{StreamcalError, StreamcalResult};

/// Parse a calendar document and return its VEVENT components in order.
/// Every other component type is dropped.
pub fn parse_calendar(content: &str) -> StreamcalResult<Vec<icalendar::Event>> {
    if !content.contains("BEGIN:VCALENDAR") {
        return Err(StreamcalError::IcsParse("missing BEGIN:VCALENDAR".into()));
    }

    let calendar: Calendar = content.parse().map_err(StreamcalError::IcsParse)?;

    Ok(calendar
        .components
        .into_iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(event),
            _ => None,
        })
        .collect())
}

/// The event's DTSTART as an absolute instant.
///
/// Date-only and floating values are read as UTC. Zoned values go through
/// the IANA database; unknown zones are read as UTC.
pub fn start_instant(event: &icalendar::Event) -> Option<DateTime<Utc>> {
    match event.get_start()? {
        DatePerhapsTime::Date(d) => Some(d.and_time(NaiveTime::MIN).and_utc()),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => Some(dt),
            CalendarDateTime::Floating(naive) => Some(naive.and_utc()),
            CalendarDateTime::WithTimezone { date_time, tzid } => match tzid.parse::<Tz>() {
                Ok(tz) => tz
                    .from_local_datetime(&date_time)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .or_else(|| Some(date_time.and_utc())),
                Err(_) => Some(date_time.and_utc()),
            },
        },
    }
}
