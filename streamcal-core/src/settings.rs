//! streamcal configuration.
//!
//! Settings come from an optional TOML file, then `STREAMCAL_`-prefixed
//! environment variables (nested keys separated by `__`, e.g.
//! `STREAMCAL_RELEASES__WINDOW_DAYS=14`). Every field has a default, so
//! running without a config file works.
//!
//! The TMDB credential is not part of the settings; it is read from
//! `TMDB_API_KEY` by [`crate::tmdb::TmdbClient::from_env`].

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::discovery::Feed;
use crate::error::{StreamcalError, StreamcalResult};
use crate::schedule::Granularity;

static DEFAULT_CONFIG_PATH: &str = "streamcal.toml";

/// Upper bound for `window_days` and `cutoff_days`
const MAX_DAYS: i64 = 3650;

/// TMDB genre id for documentaries
pub const DOCUMENTARY_GENRE_ID: u32 = 99;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tmdb: TmdbSettings,
    pub releases: ReleaseSettings,
    pub merge: MergeSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TmdbSettings {
    pub base_url: String,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        TmdbSettings {
            base_url: "https://api.themoviedb.org/3".to_string(),
        }
    }
}

/// Settings for the release calendar
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseSettings {
    pub output: PathBuf,
    pub calendar_name: String,

    /// IANA timezone used to decide what "today" is
    pub timezone: String,
    /// Days on either side of today that titles may fall on
    pub window_days: i64,

    /// Regions whose flat-rate providers count as "streaming"
    pub regions: Vec<String>,
    /// Language passed to TMDB for localized titles
    pub language: String,

    pub majority_language: String,
    pub popularity_threshold: f64,
    pub allowed_languages: Vec<String>,
    pub allowed_countries: Vec<String>,
    pub excluded_genres: Vec<u32>,

    /// Drop titles that have no flat-rate provider in any region
    pub require_platform: bool,
    /// Ask TMDB to return only flat-rate titles in the first region
    pub flatrate_only_discovery: bool,

    pub granularity: Granularity,
    pub feed: Feed,

    /// Video site a trailer must be hosted on
    pub trailer_site: String,
    pub max_pages: u32,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        ReleaseSettings {
            output: PathBuf::from("releases.ics"),
            calendar_name: "Streaming Releases".to_string(),
            timezone: "Asia/Dhaka".to_string(),
            window_days: 30,
            regions: vec!["IN".to_string(), "BD".to_string()],
            language: "en-US".to_string(),
            majority_language: "en".to_string(),
            popularity_threshold: 50.0,
            allowed_languages: vec!["en".to_string(), "hi".to_string(), "bn".to_string()],
            allowed_countries: vec!["IN".to_string(), "BD".to_string()],
            excluded_genres: vec![DOCUMENTARY_GENRE_ID],
            require_platform: true,
            flatrate_only_discovery: false,
            granularity: Granularity::Daily,
            feed: Feed::Discover,
            trailer_site: "YouTube".to_string(),
            max_pages: 500,
        }
    }
}

/// Settings for the calendar merger
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Text file listing one source (URL or path) per line
    pub sources: PathBuf,
    pub output: PathBuf,
    pub calendar_name: String,

    /// Prune generated events that started more than `cutoff_days` ago
    pub prune: bool,
    pub cutoff_days: i64,
    /// Summary prefixes that mark an event as generated by streamcal
    pub markers: Vec<String>,
}

impl Default for MergeSettings {
    fn default() -> Self {
        MergeSettings {
            sources: PathBuf::from("calendar-sources.txt"),
            output: PathBuf::from("docs/merged.ics"),
            calendar_name: "Merged Calendar".to_string(),
            prune: true,
            cutoff_days: 30,
            markers: vec![crate::schedule::GENERATED_MARKER.to_string()],
        }
    }
}

impl Settings {
    /// Load settings from `path` (or `streamcal.toml` if it exists) and the
    /// environment. An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> StreamcalResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if required && !path.exists() {
            return Err(StreamcalError::Config(format!(
                "Config file not found at {}",
                path.display()
            )));
        }

        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(
                Environment::with_prefix("STREAMCAL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| StreamcalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| StreamcalError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> StreamcalResult<()> {
        check_days("releases.window_days", self.releases.window_days)?;
        check_days("merge.cutoff_days", self.merge.cutoff_days)?;
        if self.releases.regions.is_empty() {
            return Err(StreamcalError::Config(
                "releases.regions must list at least one region".into(),
            ));
        }
        crate::date_window::parse_timezone(&self.releases.timezone)?;
        Ok(())
    }
}

fn check_days(key: &str, days: i64) -> StreamcalResult<()> {
    if !(0..=MAX_DAYS).contains(&days) {
        return Err(StreamcalError::Config(format!(
            "{} must be between 0 and {}, got {}",
            key, MAX_DAYS, days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.releases.window_days, 30);
        assert_eq!(settings.releases.popularity_threshold, 50.0);
        assert_eq!(settings.releases.excluded_genres, vec![DOCUMENTARY_GENRE_ID]);
        assert_eq!(settings.merge.cutoff_days, 30);
        assert_eq!(settings.merge.output, PathBuf::from("docs/merged.ics"));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[releases]\nwindow_days = 14\ngranularity = \"per-title\"\n\n[merge]\nprune = false"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.releases.window_days, 14);
        assert_eq!(settings.releases.granularity, Granularity::PerTitle);
        assert_eq!(settings.releases.regions, vec!["IN", "BD"]);
        assert!(!settings.merge.prune);
        assert_eq!(settings.merge.cutoff_days, 30);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = Settings::load(Some(Path::new("/nonexistent/streamcal.toml")));
        assert!(matches!(result, Err(StreamcalError::Config(_))));
    }

    #[test]
    fn test_load_rejects_out_of_range_days() {
        for body in [
            "[releases]\nwindow_days = -1",
            "[releases]\nwindow_days = 9223372036854775807",
            "[merge]\ncutoff_days = 3651",
        ] {
            let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
            writeln!(file, "{}", body).unwrap();

            let result = Settings::load(Some(file.path()));
            assert!(matches!(result, Err(StreamcalError::Config(_))), "{}", body);
        }
    }

    #[test]
    fn test_load_rejects_unknown_timezone() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[releases]\ntimezone = \"Nowhere/Town\"").unwrap();

        let result = Settings::load(Some(file.path()));
        assert!(matches!(result, Err(StreamcalError::Config(_))));
    }
}
