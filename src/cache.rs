//! In-memory caching using moka
//!
//! Caches public listing reads. Availability is never served from here:
//! searches with stay dates always hit the database, and booking gates read
//! through their own transaction. Listing writes bump a generation counter
//! so a read that started before the write cannot put its result back.

use moka::future::Cache;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::booking::Property;
use crate::listings::{SearchFilter, SearchPage};

/// Application cache holding listings and search pages
#[derive(Clone)]
pub struct AppCache {
    /// Public property detail (id -> Property)
    pub properties: Cache<Uuid, Arc<Property>>,
    /// Undated search result pages (normalized filter -> page)
    pub searches: Cache<String, Arc<SearchPage>>,
    /// Bumped by every listing write
    generation: Arc<AtomicU64>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Listings: 1000 entries, 10 min TTL, 5 min idle
            properties: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(10 * 60))
                .time_to_idle(Duration::from_secs(5 * 60))
                .build(),

            // Search pages: 500 entries, 30 s TTL
            searches: Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(30))
                .build(),

            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            properties_size: self.properties.entry_count(),
            searches_size: self.searches.entry_count(),
        }
    }

    /// Current write generation; read it before loading from the database
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Drop a property and every search page that may list it
    pub async fn invalidate_property(&self, id: Uuid) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.properties.invalidate(&id).await;
        self.searches.invalidate_all();
        info!("Cache invalidated for property: {}", id);
    }

    /// Cache a search page loaded at `generation`.
    ///
    /// Returns false, leaving nothing cached, if a write landed since.
    pub async fn insert_search(&self, key: String, page: Arc<SearchPage>, generation: u64) -> bool {
        if self.generation() != generation {
            debug!("Skipping stale search page: {}", key);
            return false;
        }
        self.searches.insert(key.clone(), page).await;
        // The write may have raced the insert itself
        if self.generation() != generation {
            self.searches.invalidate(&key).await;
            return false;
        }
        true
    }

    /// Cache a property loaded at `generation`; same rule as [`Self::insert_search`]
    pub async fn insert_property(&self, property: Arc<Property>, generation: u64) -> bool {
        let id = property.id;
        if self.generation() != generation {
            debug!("Skipping stale property: {}", id);
            return false;
        }
        self.properties.insert(id, property).await;
        if self.generation() != generation {
            self.properties.invalidate(&id).await;
            return false;
        }
        true
    }

    /// Cache key for a search page, or `None` when the result depends on
    /// availability and must not be cached
    pub fn search_key(filter: &SearchFilter) -> Option<String> {
        if filter.stay.is_some() {
            return None;
        }
        Some(format!(
            "search:{}:{}:{}:{}:{}:{}:{}:{}",
            filter.text.as_deref().unwrap_or(""),
            filter.city.as_deref().unwrap_or(""),
            opt(filter.min_price_cents),
            opt(filter.max_price_cents),
            opt(filter.min_bedrooms),
            opt(filter.guests),
            filter.limit,
            filter.offset,
        ))
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub properties_size: u64,
    pub searches_size: u64,
}
