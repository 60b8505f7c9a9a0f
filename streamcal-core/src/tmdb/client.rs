//! HTTP client for the TMDB v3 API.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::discovery::{Catalog, Listing, ListingPage, ListingSource};
use crate::error::{StreamcalError, StreamcalResult};
use crate::tmdb::types::{ListedTitle, Paged, Videos, WatchProviders};
use crate::title::Kind;

/// Environment variable holding the TMDB API key
pub const API_KEY_VAR: &str = "TMDB_API_KEY";

pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> StreamcalResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(StreamcalError::MissingCredential);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("streamcal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(TmdbClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Create a client with the key from `TMDB_API_KEY`
    pub fn from_env(base_url: impl Into<String>) -> StreamcalResult<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| StreamcalError::MissingCredential)?;
        Self::new(api_key, base_url)
    }

    /// GET `path` and decode the JSON body. Non-success statuses are errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> StreamcalResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(path, "TMDB request");

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamcalError::Status {
                url: path.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StreamcalError::Decode {
                url: path.to_string(),
                reason: e.without_url().to_string(),
            })
    }
}

/// Endpoint path and query parameters for one page of a listing
fn listing_request(listing: &Listing, page: u32) -> (String, Vec<(&'static str, String)>) {
    let mut query = vec![
        ("language", listing.language.clone()),
        ("page", page.to_string()),
    ];

    let path = match &listing.source {
        ListingSource::Discover { kind, window } => {
            let (gte, lte) = match kind {
                Kind::Movie => ("primary_release_date.gte", "primary_release_date.lte"),
                Kind::Series => ("first_air_date.gte", "first_air_date.lte"),
            };
            query.push(("sort_by", "popularity.desc".to_string()));
            query.push((gte, window.from_param()));
            query.push((lte, window.to_param()));
            format!("discover/{}", kind.api_segment())
        }
        ListingSource::NowPlaying { region } => {
            query.push(("region", region.clone()));
            "movie/now_playing".to_string()
        }
    };

    if let Some(ref region) = listing.flatrate_region {
        query.push(("with_watch_monetization_types", "flatrate".to_string()));
        query.push(("watch_region", region.clone()));
    }

    (path, query)
}

impl Catalog for TmdbClient {
    async fn listing_page(&self, listing: &Listing, page: u32) -> StreamcalResult<ListingPage> {
        let (path, query) = listing_request(listing, page);
        let response: Paged<ListedTitle> = self.get_json(&path, &query).await?;

        let kind = listing.kind();
        Ok(ListingPage {
            titles: response
                .results
                .into_iter()
                .map(|listed| listed.into_title(kind))
                .collect(),
            total_pages: response.total_pages,
        })
    }

    async fn flatrate_providers(
        &self,
        kind: Kind,
        id: u64,
        regions: &[String],
    ) -> StreamcalResult<Vec<String>> {
        let path = format!("{}/{}/watch/providers", kind.api_segment(), id);
        let providers: WatchProviders = self.get_json(&path, &[]).await?;
        Ok(providers.flatrate_names(regions))
    }

    async fn trailer(&self, kind: Kind, id: u64, site: &str) -> StreamcalResult<Option<String>> {
        let path = format!("{}/{}/videos", kind.api_segment(), id);
        let videos: Videos = self.get_json(&path, &[]).await?;
        Ok(videos.first_trailer(site).map(|v| v.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_window::DateWindow;
    use chrono::NaiveDate;

    fn param<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_new_rejects_blank_key() {
        let result = TmdbClient::new("  ", "https://api.themoviedb.org/3");
        assert!(matches!(result, Err(StreamcalError::MissingCredential)));
    }

    #[test]
    fn test_from_env_requires_key() {
        // SAFETY: no other test touches this variable
        unsafe { std::env::remove_var(API_KEY_VAR) };

        let result = TmdbClient::from_env("https://api.themoviedb.org/3");
        assert!(matches!(result, Err(StreamcalError::MissingCredential)));
    }

    #[test]
    fn test_discover_series_request() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let listing = Listing {
            source: ListingSource::Discover {
                kind: Kind::Series,
                window: DateWindow::around(today, 30),
            },
            language: "en-US".to_string(),
            flatrate_region: Some("IN".to_string()),
        };

        let (path, query) = listing_request(&listing, 3);

        assert_eq!(path, "discover/tv");
        assert_eq!(param(&query, "page"), Some("3"));
        assert_eq!(param(&query, "sort_by"), Some("popularity.desc"));
        assert_eq!(param(&query, "first_air_date.gte"), Some("2023-12-11"));
        assert_eq!(param(&query, "first_air_date.lte"), Some("2024-02-09"));
        assert_eq!(param(&query, "with_watch_monetization_types"), Some("flatrate"));
        assert_eq!(param(&query, "watch_region"), Some("IN"));
    }

    #[test]
    fn test_now_playing_request() {
        let listing = Listing {
            source: ListingSource::NowPlaying {
                region: "BD".to_string(),
            },
            language: "en-US".to_string(),
            flatrate_region: None,
        };

        let (path, query) = listing_request(&listing, 1);

        assert_eq!(path, "movie/now_playing");
        assert_eq!(param(&query, "region"), Some("BD"));
        assert_eq!(param(&query, "watch_region"), None);
        assert_eq!(param(&query, "primary_release_date.gte"), None);
    }
}
