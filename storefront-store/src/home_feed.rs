//! Home page refresh orchestration.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use storefront_core::{CommerceApi, HomeListings, ListingSlot};
use tracing::{debug, info, warn};

use crate::listing_cache::ListingCache;

/// Where a [`HomeFeed::load`] result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    /// A valid cache generation.
    Cache,
    /// A complete fetch that was just cached.
    Network,
    /// A failed fetch; the last cached listings, possibly expired.
    Stale,
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Cache => write!(f, "cache"),
            FeedSource::Network => write!(f, "network"),
            FeedSource::Stale => write!(f, "stale"),
        }
    }
}

/// Listings returned by [`HomeFeed::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeFeedResult {
    /// The four home listings.
    pub listings: HomeListings,
    /// Where they came from.
    pub source: FeedSource,
}

/// Loads the home listings through the cache.
#[derive(Clone)]
pub struct HomeFeed {
    api: Arc<dyn CommerceApi>,
    cache: Arc<ListingCache>,
}

impl fmt::Debug for HomeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HomeFeed").field("cache", &self.cache).finish_non_exhaustive()
    }
}

impl HomeFeed {
    /// Creates a feed over `api` and `cache`.
    pub fn new(api: Arc<dyn CommerceApi>, cache: Arc<ListingCache>) -> Self {
        Self { api, cache }
    }

    /// Returns the home listings.
    ///
    /// Serves a valid cache unless `force` is set. Otherwise every slot is
    /// fetched concurrently and the results are cached only if all of them
    /// succeeded. A failed refresh falls back to the last cached listings.
    pub async fn load(&self, force: bool) -> HomeFeedResult {
        if !force {
            if let Some(listings) = self.cache.listings() {
                debug!("Serving home listings from cache");
                return HomeFeedResult {
                    listings,
                    source: FeedSource::Cache,
                };
            }
        }

        let api = &self.api;
        let results = join_all(ListingSlot::all().iter().map(|slot| async move {
            (*slot, api.fetch_listing(*slot).await)
        }))
        .await;

        let mut listings = HomeListings::default();
        let mut failed = 0usize;
        for (slot, result) in results {
            match result {
                Ok(payload) => listings.set(slot, payload),
                Err(e) => {
                    warn!(slot = %slot, error = %e, "Failed to fetch listing");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            warn!(failed, "Home refresh incomplete, keeping previous listings");
            return HomeFeedResult {
                listings: self.cache.last_known(),
                source: FeedSource::Stale,
            };
        }

        self.cache.store_all(&listings);
        info!("Home listings refreshed");
        HomeFeedResult {
            listings,
            source: FeedSource::Network,
        }
    }
}
