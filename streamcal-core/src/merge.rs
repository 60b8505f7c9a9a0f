//! Merging several calendars into one.
//!
//! Sources are read in order and their events appended in order. A source
//! that cannot be read or parsed is logged and skipped; the rest of the
//! merge carries on. Events generated by streamcal (recognised by their
//! summary marker) are dropped once they are older than the cutoff; all
//! other events are carried over untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use icalendar::Component;
use tracing::{debug, warn};

use crate::error::{StreamcalError, StreamcalResult};
use crate::ics::{self, MERGED_PRODID};

/// Where a calendar comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

impl Source {
    /// Lines starting with `http` (any case) are remote, everything else
    /// is a local path
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.to_ascii_lowercase().starts_with("http") {
            Source::Remote(line.to_string())
        } else {
            Source::Local(PathBuf::from(line))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => f.write_str(url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse a sources list: one source per line, blank lines and `#` comments
/// ignored
pub fn parse_sources(text: &str) -> Vec<Source> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Source::parse)
        .collect()
}

pub fn load_sources(path: &Path) -> StreamcalResult<Vec<Source>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        StreamcalError::Config(format!(
            "Could not read sources list {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(parse_sources(&text))
}

/// Rule for dropping stale generated events
#[derive(Debug, Clone)]
pub struct Pruning {
    /// Summary prefixes of generated events
    pub markers: Vec<String>,
    /// Generated events starting before this instant are dropped
    pub cutoff: DateTime<Utc>,
}

impl Pruning {
    pub fn days_before(now: DateTime<Utc>, days: i64, markers: Vec<String>) -> Self {
        Pruning {
            markers,
            cutoff: now - Duration::days(days),
        }
    }

    fn is_generated(&self, summary: &str) -> bool {
        self.markers.iter().any(|m| summary.starts_with(m.as_str()))
    }

    /// Whether `event` survives the merge. Generated events without a
    /// readable start are kept.
    pub fn keeps(&self, event: &icalendar::Event) -> bool {
        let Some(summary) = event.get_summary() else {
            return true;
        };
        if !self.is_generated(summary) {
            return true;
        }

        match ics::start_instant(event) {
            Some(start) => start >= self.cutoff,
            None => true,
        }
    }
}

/// Result of a merge
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub events: Vec<icalendar::Event>,
    pub sources_read: usize,
    pub pruned: usize,
    pub failed: Vec<Source>,
}

impl MergeOutcome {
    /// The merged calendar document
    pub fn to_ics(&self, calendar_name: &str) -> String {
        ics::generate_merged(self.events.clone(), calendar_name, MERGED_PRODID)
    }
}

pub struct Merger {
    http: reqwest::Client,
    pruning: Option<Pruning>,
}

impl Merger {
    pub fn new(pruning: Option<Pruning>) -> StreamcalResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("streamcal/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Merger { http, pruning })
    }

    pub async fn merge(&self, sources: &[Source]) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for source in sources {
            let result = match self.read(source).await {
                Ok(content) => self.absorb(&content, &mut outcome),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => outcome.sources_read += 1,
                Err(e) => {
                    warn!(source = %source, error = %e, "Failed to fetch or parse calendar source");
                    outcome.failed.push(source.clone());
                }
            }
        }

        outcome
    }

    async fn read(&self, source: &Source) -> StreamcalResult<String> {
        match source {
            Source::Remote(url) => {
                let response = self.http.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(StreamcalError::Status {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.text().await?)
            }
            Source::Local(path) => Ok(std::fs::read_to_string(path)?),
        }
    }

    /// Parse one calendar and append the events that survive pruning.
    /// Nothing is appended if the document does not parse.
    fn absorb(&self, content: &str, outcome: &mut MergeOutcome) -> StreamcalResult<()> {
        let events = ics::parse_calendar(content)?;

        for event in events {
            let keep = self.pruning.as_ref().is_none_or(|p| p.keeps(&event));
            if keep {
                outcome.events.push(event);
            } else {
                debug!(summary = event.get_summary().unwrap_or_default(), "Pruning stale event");
                outcome.pruned += 1;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    /// Calendar of (uid, summary, DTSTART property line) events
    fn calendar(events: &[(&str, &str, &str)]) -> String {
        let mut ics = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//test//EN\r\n");
        for (uid, summary, dtstart) in events {
            ics.push_str(&format!(
                "BEGIN:VEVENT\r\nUID:{}\r\nDTSTAMP:20240101T000000Z\r\nSUMMARY:{}\r\n{}\r\nEND:VEVENT\r\n",
                uid, summary, dtstart
            ));
        }
        ics.push_str("END:VCALENDAR\r\n");
        ics
    }

    fn write_source(dir: &tempfile::TempDir, name: &str, content: &str) -> Source {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        Source::Local(path)
    }

    fn uids(outcome: &MergeOutcome) -> Vec<String> {
        outcome
            .events
            .iter()
            .filter_map(|e| e.get_uid().map(str::to_string))
            .collect()
    }

    fn pruning() -> Pruning {
        Pruning::days_before(now(), 30, vec!["🎬".to_string()])
    }

    #[test]
    fn test_parse_sources_skips_blanks_and_comments() {
        let text = "# sports\nhttps://example.com/fixtures.ics\n\n  HTTP://EXAMPLE.COM/a.ics  \n   # movies\ndocs/movies.ics\n";

        assert_eq!(
            parse_sources(text),
            vec![
                Source::Remote("https://example.com/fixtures.ics".to_string()),
                Source::Remote("HTTP://EXAMPLE.COM/a.ics".to_string()),
                Source::Local(PathBuf::from("docs/movies.ics")),
            ]
        );
    }

    #[tokio::test]
    async fn test_merge_prunes_stale_generated_events_only() {
        let dir = tempfile::tempdir().unwrap();
        // 40 days before merge time
        let old = "DTSTART:20240121T090000Z";
        let movies = write_source(
            &dir,
            "movies.ics",
            &calendar(&[
                ("releases-2024-01-21@streamcal", "🎬 Old Film", old),
                ("releases-2024-02-20@streamcal", "🎬 Recent Film", "DTSTART:20240220T090000Z"),
            ]),
        );
        let sports = write_source(&dir, "sports.ics", &calendar(&[("match-1", "Derby", old)]));

        let merger = Merger::new(Some(pruning())).unwrap();
        let outcome = merger.merge(&[movies, sports]).await;

        assert_eq!(
            uids(&outcome),
            vec!["releases-2024-02-20@streamcal", "match-1"]
        );
        assert_eq!(outcome.pruned, 1);
        assert_eq!(outcome.sources_read, 2);
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn test_failed_sources_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Source::Local(dir.path().join("missing.ics"));
        let garbage = write_source(&dir, "garbage.ics", "this is not a calendar");
        let good = write_source(
            &dir,
            "good.ics",
            &calendar(&[("match-1", "Derby", "DTSTART:20240305T150000Z")]),
        );

        let merger = Merger::new(Some(pruning())).unwrap();
        let outcome = merger
            .merge(&[missing.clone(), garbage.clone(), good])
            .await;

        assert_eq!(uids(&outcome), vec!["match-1"]);
        assert_eq!(outcome.failed, vec![missing, garbage]);
        assert_eq!(outcome.sources_read, 1);
    }

    #[tokio::test]
    async fn test_duplicates_across_sources_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let content = calendar(&[("match-1", "Derby", "DTSTART:20240305T150000Z")]);
        let a = write_source(&dir, "a.ics", &content);
        let b = write_source(&dir, "b.ics", &content);

        let merger = Merger::new(None).unwrap();
        let outcome = merger.merge(&[a, b]).await;

        assert_eq!(uids(&outcome), vec!["match-1", "match-1"]);
    }

    #[tokio::test]
    async fn test_without_pruning_everything_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let movies = write_source(
            &dir,
            "movies.ics",
            &calendar(&[("old", "🎬 Old Film", "DTSTART:20230101T090000Z")]),
        );

        let merger = Merger::new(None).unwrap();
        let outcome = merger.merge(&[movies]).await;

        assert_eq!(uids(&outcome), vec!["old"]);
        assert_eq!(outcome.pruned, 0);
    }

    #[test]
    fn test_cutoff_boundary_and_date_only_starts() {
        let content = calendar(&[
            ("edge", "🎬 Edge", "DTSTART:20240131T120000Z"),
            ("day", "🎬 All day", "DTSTART;VALUE=DATE:20240131"),
        ]);
        let events = ics::parse_calendar(&content).unwrap();
        let pruning = pruning();

        // Exactly 30 days old is not older than the cutoff
        assert!(pruning.keeps(&events[0]));
        // Date-only starts are midnight UTC, twelve hours before the cutoff
        assert!(!pruning.keeps(&events[1]));
    }

    #[test]
    fn test_merged_output_contains_only_events() {
        let content = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//test//EN\r\n\
            BEGIN:VTIMEZONE\r\nTZID:Europe/London\r\nEND:VTIMEZONE\r\n\
            BEGIN:VEVENT\r\nUID:match-1\r\nDTSTAMP:20240101T000000Z\r\nSUMMARY:Derby\r\nDTSTART:20240305T150000Z\r\nEND:VEVENT\r\n\
            END:VCALENDAR\r\n";
        let merger = Merger::new(None).unwrap();
        let mut outcome = MergeOutcome::default();
        merger.absorb(content, &mut outcome).unwrap();

        let ics = outcome.to_ics("Merged");

        assert!(ics.contains("UID:match-1"), "ICS:\n{}", ics);
        assert!(!ics.contains("VTIMEZONE"), "ICS:\n{}", ics);
        assert!(ics.contains("PRODID:-//streamcal//Merged Calendar//EN"), "ICS:\n{}", ics);
    }
}
