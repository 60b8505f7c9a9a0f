//! The release calendar pipeline: fetch listings, filter, enrich, group,
//! render.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::date_window::DateWindow;
use crate::discovery::{Catalog, Feed, Listing, fetch_all};
use crate::eligibility::{Rejection, Rules};
use crate::error::StreamcalResult;
use crate::event::ReleaseEvent;
use crate::schedule::group_by_date;
use crate::settings::ReleaseSettings;
use crate::title::{EnrichedTitle, Title};

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct ReleaseRun {
    /// Distinct titles returned by the listings
    pub candidates: usize,
    /// Titles that passed every rule
    pub eligible: usize,
    pub events: Vec<ReleaseEvent>,
}

/// Run the whole pipeline against `catalog`.
///
/// `today` is the reference date for the window and for titles without a
/// usable date; `now` becomes every event's creation stamp. Any failed
/// catalog request aborts the run.
pub async fn build<C: Catalog>(
    catalog: &C,
    settings: &ReleaseSettings,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> StreamcalResult<ReleaseRun> {
    let window = DateWindow::around(today, settings.window_days);
    let rules = Rules::from_settings(settings, window);

    let candidates = fetch_candidates(catalog, settings, window).await?;
    info!(count = candidates.len(), "Fetched candidates");

    let mut eligible = Vec::new();
    for title in &candidates {
        if let Some(enriched) = enrich(catalog, settings, &rules, title, today).await? {
            eligible.push(enriched);
        }
    }
    info!(count = eligible.len(), "Eligible titles");

    let eligible_count = eligible.len();
    let buckets = group_by_date(eligible);
    let events = settings.granularity.render(&buckets, now);

    Ok(ReleaseRun {
        candidates: candidates.len(),
        eligible: eligible_count,
        events,
    })
}

/// All listing results, first occurrence of each title kept
async fn fetch_candidates<C: Catalog>(
    catalog: &C,
    settings: &ReleaseSettings,
    window: DateWindow,
) -> StreamcalResult<Vec<Title>> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for listing in Listing::for_feed(settings, window) {
        let titles = fetch_all(catalog, &listing, settings.max_pages).await?;
        candidates.extend(
            titles
                .into_iter()
                .filter(|t| seen.insert((t.kind, t.id))),
        );
    }

    Ok(candidates)
}

/// Apply every rule to one title, resolving providers and trailer on the way.
/// Returns `None` for rejected titles.
async fn enrich<C: Catalog>(
    catalog: &C,
    settings: &ReleaseSettings,
    rules: &Rules,
    title: &Title,
    today: NaiveDate,
) -> StreamcalResult<Option<EnrichedTitle>> {
    // Now-playing titles are streaming today, whatever their release date
    let date = match settings.feed {
        Feed::Discover => title.resolve_date(today),
        Feed::NowPlaying => today,
    };

    // Metadata and date rules need no requests, so they go first
    if let Err(rejection) = rules
        .check_metadata(title)
        .and_then(|_| rules.check_window(date))
    {
        log_rejection(title, &rejection);
        return Ok(None);
    }

    let platforms = catalog
        .flatrate_providers(title.kind, title.id, &settings.regions)
        .await?;
    if let Err(rejection) = rules.check_platforms(&platforms) {
        log_rejection(title, &rejection);
        return Ok(None);
    }

    let trailer = catalog
        .trailer(title.kind, title.id, &settings.trailer_site)
        .await?;

    Ok(Some(EnrichedTitle {
        title: title.clone(),
        date,
        platforms,
        trailer,
    }))
}

fn log_rejection(title: &Title, rejection: &Rejection) {
    debug!(id = title.id, kind = %title.kind, title = %title.title, reason = %rejection, "Skipping title");
}
