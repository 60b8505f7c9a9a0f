//! Grouping enriched titles by date and rendering them as calendar events.
//!
//! Grouping is a fold into an immutable date-ordered map; rendering is a
//! separate pure pass over that map. Event uids only depend on the date
//! (or the title id in per-title mode), so regenerating the calendar from
//! the same data yields the same uids.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::event::ReleaseEvent;
use crate::title::EnrichedTitle;

/// Summary prefix of every event streamcal generates. The merger uses it
/// to recognise its own events.
pub const GENERATED_MARKER: &str = "🎬";

/// Events start at this hour (UTC) on their date and last one hour
const START_HOUR: i64 = 9;

const UID_DOMAIN: &str = "streamcal";

/// How many events the calendar gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// One event per date listing every title released that day
    #[default]
    Daily,
    /// One event per title
    PerTitle,
}

/// Titles keyed by their resolved date, in insertion order per date
pub type DailyBuckets = BTreeMap<NaiveDate, Vec<EnrichedTitle>>;

pub fn group_by_date<I>(titles: I) -> DailyBuckets
where
    I: IntoIterator<Item = EnrichedTitle>,
{
    titles
        .into_iter()
        .fold(DailyBuckets::new(), |mut buckets, title| {
            buckets.entry(title.date).or_default().push(title);
            buckets
        })
}

impl Granularity {
    pub fn render(&self, buckets: &DailyBuckets, created: DateTime<Utc>) -> Vec<ReleaseEvent> {
        match self {
            Granularity::Daily => render_daily(buckets, created),
            Granularity::PerTitle => render_per_title(buckets, created),
        }
    }
}

/// One event per bucket, ascending by date
pub fn render_daily(buckets: &DailyBuckets, created: DateTime<Utc>) -> Vec<ReleaseEvent> {
    buckets
        .iter()
        .filter(|(_, titles)| !titles.is_empty())
        .map(|(date, titles)| {
            let ranked = by_popularity(titles);
            let (start, end) = slot(*date);

            let names: Vec<&str> = ranked.iter().map(|t| t.title.title.as_str()).collect();
            let lines: Vec<String> = ranked.iter().map(|t| t.line()).collect();

            ReleaseEvent {
                uid: daily_uid(*date),
                summary: format!("{} {}", GENERATED_MARKER, names.join(" | ")),
                description: lines.join("\n"),
                start,
                end,
                created,
            }
        })
        .collect()
}

/// One event per title, ascending by date then descending by popularity
pub fn render_per_title(buckets: &DailyBuckets, created: DateTime<Utc>) -> Vec<ReleaseEvent> {
    buckets
        .iter()
        .flat_map(|(date, titles)| {
            let (start, end) = slot(*date);
            by_popularity(titles)
                .into_iter()
                .map(move |t| {
                    let mut lines = Vec::new();
                    if !t.platforms.is_empty() {
                        lines.push(format!("Available on: {}", t.platforms.join(", ")));
                    }
                    if let Some(ref trailer) = t.trailer {
                        lines.push(format!("Trailer: {}", trailer));
                    }

                    ReleaseEvent {
                        uid: format!(
                            "{}-{}-stream@{}",
                            t.title.kind, t.title.id, UID_DOMAIN
                        ),
                        summary: format!("{} Now Streaming: {}", GENERATED_MARKER, t.title.title),
                        description: lines.join("\n"),
                        start,
                        end,
                        created,
                    }
                })
        })
        .collect()
}

pub fn daily_uid(date: NaiveDate) -> String {
    format!("releases-{}@{}", date.format("%Y-%m-%d"), UID_DOMAIN)
}

/// Most popular first; equal popularity keeps insertion order
fn by_popularity(titles: &[EnrichedTitle]) -> Vec<&EnrichedTitle> {
    let mut ranked: Vec<&EnrichedTitle> = titles.iter().collect();
    ranked.sort_by(|a, b| b.popularity().total_cmp(&a.popularity()));
    ranked
}

fn slot(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = (date.and_time(NaiveTime::MIN) + Duration::hours(START_HOUR)).and_utc();
    (start, start + Duration::hours(1))
}
