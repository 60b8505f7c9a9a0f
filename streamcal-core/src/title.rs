//! Movie and series records as they move through the release pipeline.
//!
//! A [`Title`] is what the discovery endpoints return. Titles that pass the
//! metadata rules get their streaming platforms and trailer resolved and
//! become [`EnrichedTitle`]s, which is what the calendar is built from.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a title is a movie or a series. Decides which TMDB endpoints
/// and which date field apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Movie,
    Series,
}

impl Kind {
    /// Path segment used by TMDB for this kind (`movie` or `tv`)
    pub fn api_segment(&self) -> &'static str {
        match self {
            Kind::Movie => "movie",
            Kind::Series => "tv",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_segment())
    }
}

/// A candidate title from a discovery listing, before any filtering
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub id: u64,
    pub title: String,
    pub kind: Kind,
    pub original_language: String,
    pub popularity: f64,
    pub genre_ids: BTreeSet<u32>,
    pub origin_countries: BTreeSet<String>,
    /// Release date for movies, first-air date for series, exactly as
    /// the API sent it. May be missing or malformed.
    pub date: Option<String>,
}

impl Title {
    /// Resolve the event date for this title.
    ///
    /// Missing or unparsable dates fall back to `today` instead of dropping
    /// the title.
    pub fn resolve_date(&self, today: NaiveDate) -> NaiveDate {
        self.date
            .as_deref()
            .map(str::trim)
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .unwrap_or(today)
    }
}

/// A title that passed the metadata rules, with its availability resolved
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTitle {
    pub title: Title,
    pub date: NaiveDate,
    /// Sorted, deduplicated flat-rate provider names
    pub platforms: Vec<String>,
    pub trailer: Option<String>,
}

impl EnrichedTitle {
    pub fn popularity(&self) -> f64 {
        self.title.popularity
    }

    /// One description line: `Title (Platform A, Platform B) - <trailer>`
    pub fn line(&self) -> String {
        let mut line = self.title.title.clone();
        if !self.platforms.is_empty() {
            line.push_str(&format!(" ({})", self.platforms.join(", ")));
        }
        if let Some(ref trailer) = self.trailer {
            line.push_str(&format!(" - {}", trailer));
        }
        line
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_title(id: u64, name: &str, lang: &str, popularity: f64) -> Title {
        Title {
            id,
            title: name.to_string(),
            kind: Kind::Movie,
            original_language: lang.to_string(),
            popularity,
            genre_ids: BTreeSet::new(),
            origin_countries: BTreeSet::new(),
            date: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_date_parses_iso_date() {
        let mut title = make_title(1, "X", "en", 80.0);
        title.date = Some("2024-01-05".to_string());

        assert_eq!(title.resolve_date(date(2024, 1, 10)), date(2024, 1, 5));
    }

    #[test]
    fn test_resolve_date_falls_back_to_today() {
        let today = date(2024, 1, 10);
        let mut title = make_title(1, "X", "en", 80.0);

        assert_eq!(title.resolve_date(today), today);

        title.date = Some(String::new());
        assert_eq!(title.resolve_date(today), today);

        title.date = Some("2024-13-45".to_string());
        assert_eq!(title.resolve_date(today), today);
    }

    #[test]
    fn test_line_with_single_platform() {
        let enriched = EnrichedTitle {
            title: make_title(1, "X", "en", 80.0),
            date: date(2024, 1, 5),
            platforms: vec!["Netflix".to_string()],
            trailer: None,
        };

        assert_eq!(enriched.line(), "X (Netflix)");
    }

    #[test]
    fn test_line_with_platforms_and_trailer() {
        let enriched = EnrichedTitle {
            title: make_title(1, "X", "en", 80.0),
            date: date(2024, 1, 5),
            platforms: vec!["Netflix".to_string(), "Prime Video".to_string()],
            trailer: Some("https://www.youtube.com/watch?v=abc".to_string()),
        };

        assert_eq!(
            enriched.line(),
            "X (Netflix, Prime Video) - https://www.youtube.com/watch?v=abc"
        );
    }

    #[test]
    fn test_kind_api_segment() {
        assert_eq!(Kind::Movie.api_segment(), "movie");
        assert_eq!(Kind::Series.to_string(), "tv");
    }
}
