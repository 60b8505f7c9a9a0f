//! Inclusion rules for release titles.
//!
//! The rules split into two groups: metadata rules that only look at the
//! discovery record ([`Rules::check_metadata`]) and availability rules that
//! need the resolved date and providers ([`Rules::check_window`],
//! [`Rules::check_platforms`]). A title is included only if every rule
//! passes; the order they run in does not change the outcome.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use crate::date_window::DateWindow;
use crate::settings::ReleaseSettings;
use crate::title::Title;

/// Why a title was left out of the calendar
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    ExcludedGenre(u32),
    LowPopularity { language: String, popularity: f64 },
    OutOfRegion { language: String },
    NotStreaming,
    OutsideWindow(NaiveDate),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ExcludedGenre(id) => write!(f, "excluded genre {}", id),
            Rejection::LowPopularity {
                language,
                popularity,
            } => write!(f, "{} title with popularity {:.1}", language, popularity),
            Rejection::OutOfRegion { language } => {
                write!(f, "language {} and origin outside allowed countries", language)
            }
            Rejection::NotStreaming => f.write_str("no flat-rate provider"),
            Rejection::OutsideWindow(date) => write!(f, "date {} outside window", date),
        }
    }
}

/// Filter rules built from [`ReleaseSettings`]
#[derive(Debug, Clone)]
pub struct Rules {
    pub excluded_genres: BTreeSet<u32>,
    pub majority_language: String,
    pub popularity_threshold: f64,
    pub allowed_languages: BTreeSet<String>,
    pub allowed_countries: BTreeSet<String>,
    pub require_platform: bool,
    pub window: DateWindow,
}

impl Rules {
    pub fn from_settings(settings: &ReleaseSettings, window: DateWindow) -> Self {
        Rules {
            excluded_genres: settings.excluded_genres.iter().copied().collect(),
            majority_language: settings.majority_language.clone(),
            popularity_threshold: settings.popularity_threshold,
            allowed_languages: settings.allowed_languages.iter().cloned().collect(),
            allowed_countries: settings.allowed_countries.iter().cloned().collect(),
            require_platform: settings.require_platform,
            window,
        }
    }

    /// Genre, popularity and regional relevance rules
    pub fn check_metadata(&self, title: &Title) -> Result<(), Rejection> {
        if let Some(genre) = title
            .genre_ids
            .iter()
            .find(|g| self.excluded_genres.contains(*g))
        {
            return Err(Rejection::ExcludedGenre(*genre));
        }

        // Majority-language titles need real traction to make the cut
        if title.original_language == self.majority_language
            && title.popularity < self.popularity_threshold
        {
            return Err(Rejection::LowPopularity {
                language: title.original_language.clone(),
                popularity: title.popularity,
            });
        }

        let relevant_language = self.allowed_languages.contains(&title.original_language);
        let relevant_origin = title
            .origin_countries
            .iter()
            .any(|c| self.allowed_countries.contains(c));
        if !relevant_language && !relevant_origin {
            return Err(Rejection::OutOfRegion {
                language: title.original_language.clone(),
            });
        }

        Ok(())
    }

    pub fn check_window(&self, date: NaiveDate) -> Result<(), Rejection> {
        if self.window.contains(date) {
            Ok(())
        } else {
            Err(Rejection::OutsideWindow(date))
        }
    }

    pub fn check_platforms(&self, platforms: &[String]) -> Result<(), Rejection> {
        if self.require_platform && platforms.is_empty() {
            Err(Rejection::NotStreaming)
        } else {
            Ok(())
        }
    }
}
