//! Discovery listings and the catalog interface the pipeline runs against.
//!
//! [`Catalog`] is the seam between the filtering/grouping logic and the
//! network: the TMDB client implements it, tests use in-memory fakes.

use serde::Deserialize;
use tracing::debug;

use crate::date_window::DateWindow;
use crate::error::StreamcalResult;
use crate::settings::ReleaseSettings;
use crate::title::{Kind, Title};

/// Which listings the release calendar is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feed {
    /// Movies and series released inside the date window
    #[default]
    Discover,
    /// Movies currently in theatres in each configured region
    NowPlaying,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListingSource {
    Discover { kind: Kind, window: DateWindow },
    NowPlaying { region: String },
}

/// One paginated listing query
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub source: ListingSource,
    pub language: String,
    /// Restrict results to flat-rate titles in this region
    pub flatrate_region: Option<String>,
}

impl Listing {
    pub fn kind(&self) -> Kind {
        match &self.source {
            ListingSource::Discover { kind, .. } => *kind,
            ListingSource::NowPlaying { .. } => Kind::Movie,
        }
    }

    /// Listings to query for the configured feed
    pub fn for_feed(settings: &ReleaseSettings, window: DateWindow) -> Vec<Listing> {
        let flatrate_region = if settings.flatrate_only_discovery {
            settings.regions.first().cloned()
        } else {
            None
        };

        let sources: Vec<ListingSource> = match settings.feed {
            Feed::Discover => [Kind::Movie, Kind::Series]
                .into_iter()
                .map(|kind| ListingSource::Discover { kind, window })
                .collect(),
            Feed::NowPlaying => settings
                .regions
                .iter()
                .map(|region| ListingSource::NowPlaying {
                    region: region.clone(),
                })
                .collect(),
        };

        sources
            .into_iter()
            .map(|source| Listing {
                source,
                language: settings.language.clone(),
                flatrate_region: flatrate_region.clone(),
            })
            .collect()
    }
}

/// One page of listing results
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub titles: Vec<Title>,
    pub total_pages: u32,
}

/// Source of titles and their availability.
///
/// Every method fails on transport errors and non-success responses; an
/// empty result means the data is confirmed absent.
#[allow(async_fn_in_trait)]
pub trait Catalog {
    async fn listing_page(&self, listing: &Listing, page: u32) -> StreamcalResult<ListingPage>;

    /// Flat-rate provider names across `regions`, sorted and deduplicated
    async fn flatrate_providers(
        &self,
        kind: Kind,
        id: u64,
        regions: &[String],
    ) -> StreamcalResult<Vec<String>>;

    /// URL of the first trailer hosted on `site`
    async fn trailer(&self, kind: Kind, id: u64, site: &str) -> StreamcalResult<Option<String>>;
}

/// Fetch every page of a listing.
///
/// Stops at the first empty page, at the reported page count, or at
/// `max_pages`. Any failed request aborts the fetch.
pub async fn fetch_all<C: Catalog>(
    catalog: &C,
    listing: &Listing,
    max_pages: u32,
) -> StreamcalResult<Vec<Title>> {
    let mut titles = Vec::new();
    let mut page = 1;

    loop {
        let result = catalog.listing_page(listing, page).await?;
        if result.titles.is_empty() {
            break;
        }

        debug!(page, total_pages = result.total_pages, count = result.titles.len(), "Fetched listing page");
        titles.extend(result.titles);

        if page >= result.total_pages || page >= max_pages {
            break;
        }
        page += 1;
    }

    Ok(titles)
}
