//! Date window for release filtering.

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{StreamcalError, StreamcalResult};

/// Inclusive window of calendar dates around a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// Window of `days` on either side of `today`, both ends included
    pub fn around(today: NaiveDate, days: i64) -> Self {
        DateWindow {
            from: today - Duration::days(days),
            to: today + Duration::days(days),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    /// `from` as YYYY-MM-DD, the format discovery queries expect
    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    /// `to` as YYYY-MM-DD
    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

/// Today's date in the given IANA timezone
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Parse an IANA timezone name such as `Asia/Dhaka`
pub fn parse_timezone(name: &str) -> StreamcalResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| StreamcalError::Config(format!("Unknown timezone '{}'", name)))
}

/// Parse YYYY-MM-DD, used for `--today` overrides
pub fn parse_date(s: &str) -> StreamcalResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        StreamcalError::Config(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}
