//! TMDB API response types.

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;

use crate::title::{Kind, Title};

/// A page of a listing endpoint (`discover/*`, `movie/now_playing`)
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
}

/// A movie or series as listed by discovery. Movies carry `title` and
/// `release_date`, series carry `name` and `first_air_date`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedTitle {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub origin_country: Vec<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
}

impl ListedTitle {
    pub fn into_title(self, kind: Kind) -> Title {
        let (name, date) = match kind {
            Kind::Movie => (self.title.or(self.name), self.release_date),
            Kind::Series => (self.name.or(self.title), self.first_air_date),
        };

        Title {
            id: self.id,
            title: name.unwrap_or_else(|| "(No title)".to_string()),
            kind,
            original_language: self.original_language,
            popularity: self.popularity,
            genre_ids: self.genre_ids.into_iter().collect(),
            origin_countries: self.origin_country.into_iter().collect(),
            date,
        }
    }
}

/// Response of `{movie|tv}/{id}/watch/providers`, keyed by region code
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchProviders {
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionProviders {
    /// Subscription offers. Rent/buy offers are ignored.
    #[serde(default)]
    pub flatrate: Vec<Provider>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Provider {
    pub provider_name: String,
}

impl WatchProviders {
    /// Flat-rate provider names across `regions`, sorted and deduplicated
    pub fn flatrate_names(&self, regions: &[String]) -> Vec<String> {
        regions
            .iter()
            .filter_map(|region| self.results.get(region))
            .flat_map(|offers| offers.flatrate.iter())
            .map(|p| p.provider_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Response of `{movie|tv}/{id}/videos`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

impl Videos {
    /// First trailer hosted on `site`
    pub fn first_trailer(&self, site: &str) -> Option<&Video> {
        self.results
            .iter()
            .find(|v| v.site == site && v.video_type == "Trailer")
    }
}

impl Video {
    pub fn url(&self) -> String {
        match self.site.as_str() {
            "YouTube" => format!("https://www.youtube.com/watch?v={}", self.key),
            "Vimeo" => format!("https://vimeo.com/{}", self.key),
            _ => self.key.clone(),
        }
    }
}
