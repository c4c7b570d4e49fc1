use crate::api::geography::GeographyRepository;
use crate::models::geography::Country;
use crate::models::ids::CountryId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub type CountryIndex = HashMap<CountryId, Country>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Countries rarely change; keep the first successful fetch until `invalidate`.
    #[default]
    NeverExpire,
    TimeToLive(Duration),
}

impl CachePolicy {
    pub fn from_ttl(ttl: Option<Duration>) -> Self {
        ttl.map_or(CachePolicy::NeverExpire, CachePolicy::TimeToLive)
    }
}

#[derive(Debug)]
struct Entry {
    countries: Arc<CountryIndex>,
    fetched_at: Instant,
}

/// Process-wide country lookup shared by every profile load.
#[derive(Debug, Default)]
pub struct CountriesCache {
    policy: CachePolicy,
    entry: Mutex<Option<Entry>>,
}

impl CountriesCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entry: Mutex::new(None),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        match self.policy {
            CachePolicy::NeverExpire => true,
            CachePolicy::TimeToLive(ttl) => entry.fetched_at.elapsed() < ttl,
        }
    }

    /// Cached countries, fetching them first when the entry is missing or stale.
    /// The lock is held across the fetch so concurrent callers share one request.
    /// A failed fetch is not cached and yields an empty index.
    pub async fn get_or_fetch<B: GeographyRepository + ?Sized>(&self, backend: &B) -> Arc<CountryIndex> {
        let mut guard = self.entry.lock().await;

        if let Some(entry) = guard.as_ref()
            && self.is_fresh(entry)
        {
            return Arc::clone(&entry.countries);
        }

        match backend.fetch_countries().await.map(|r| r.into_data()) {
            Ok(Some(countries)) => {
                let index: CountryIndex = countries.into_iter().map(|c| (c.id.clone(), c)).collect();
                debug!(count = index.len(), "countries cached");
                let countries = Arc::new(index);
                *guard = Some(Entry {
                    countries: Arc::clone(&countries),
                    fetched_at: Instant::now(),
                });
                countries
            }
            Ok(None) => {
                warn!("countries could not be loaded");
                Arc::new(CountryIndex::new())
            }
            Err(e) => {
                warn!(error = %e, "countries request failed");
                Arc::new(CountryIndex::new())
            }
        }
    }

    pub async fn invalidate(&self) {
        self.entry.lock().await.take();
        debug!("countries cache invalidated");
    }

    pub async fn is_populated(&self) -> bool {
        self.entry.lock().await.is_some()
    }
}
