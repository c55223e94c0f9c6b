/*!
 * Unit translation cache.
 *
 * Lives inside the model service, so it is shared by every document that
 * service processes. Only validated translations are stored. The cache holds
 * at most `capacity` units; the least recently used unit is evicted first.
 */

use log::debug;
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default number of cached units
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Cache key: one normalised source unit for one language direction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    unit: String,
    source_language: String,
    target_language: String,
}

impl CacheKey {
    fn new(unit: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            unit: unit.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

/// Hit/miss counters snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
    /// Units dropped to stay within capacity
    pub evictions: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Thread-safe cache of unit translations
#[derive(Clone)]
pub struct TranslationCache {
    // LruCache::get reorders entries, so reads take the lock exclusively
    entries: Arc<Mutex<LruCache<CacheKey, String>>>,
    hits: Arc<RwLock<usize>>,
    misses: Arc<RwLock<usize>>,
    evictions: Arc<RwLock<usize>>,
    enabled: bool,
}

impl TranslationCache {
    /// Create a new cache; a disabled cache never hits and never stores.
    /// A zero capacity is raised to one entry.
    pub fn new(enabled: bool, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            evictions: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Look up a unit, counting the hit or miss
    pub fn get(&self, unit: &str, source_language: &str, target_language: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(unit, source_language, target_language);
        let found = self.entries.lock().get(&key).cloned();

        match found {
            Some(translation) => {
                *self.hits.write() += 1;
                debug!("Cache hit for '{}'", truncate_text(unit, 30));
                Some(translation)
            }
            None => {
                *self.misses.write() += 1;
                None
            }
        }
    }

    /// Store a validated translation, evicting the least recently used unit when full
    pub fn store(&self, unit: &str, source_language: &str, target_language: &str, translation: &str) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(unit, source_language, target_language);
        let evicted = self.entries.lock().push(key.clone(), translation.to_string());
        if let Some((old_key, _)) = evicted {
            // push also hands back the replaced value of an existing key
            if old_key != key {
                *self.evictions.write() += 1;
                debug!("Evicted '{}' from translation cache", truncate_text(&old_key.unit, 30));
            }
        }
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: *self.hits.read(),
            misses: *self.misses.read(),
            entries: self.entries.lock().len(),
            evictions: *self.evictions.read(),
        }
    }

    /// Drop all entries and reset counters
    pub fn clear(&self) {
        self.entries.lock().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;
        *self.evictions.write() = 0;
        debug!("Translation cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true, DEFAULT_CACHE_CAPACITY)
    }
}

/// Truncate text to at most `max_chars` characters with ellipsis
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}
