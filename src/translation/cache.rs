//! Shared translation cache.
//!
//! Every label that shows the same string in the same language shares one
//! cache entry, so a repeated string reaches the network once per language.
//! Concurrent misses for the same key share a single in-flight request.
//! Failed translations are never cached.

use super::{TranslateError, Translator};
use crate::i18n::{Language, TranslationMetrics};
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    language: Language,
}

impl CacheKey {
    fn new(text: &str, language: Language) -> Self {
        Self {
            text: text.to_string(),
            language,
        }
    }
}

/// Bounded least-recently-used map from (source text, language) to the
/// translated text.
pub struct TranslationCache {
    entries: Mutex<LruCache<CacheKey, String>>,
    metrics: Arc<TranslationMetrics>,
}

impl TranslationCache {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize, metrics: Arc<TranslationMetrics>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            metrics,
        }
    }

    pub fn get(&self, text: &str, language: Language) -> Option<String> {
        let hit = lock(&self.entries)
            .get(&CacheKey::new(text, language))
            .cloned();

        match hit {
            Some(_) => self.metrics.record_cache_hit(),
            None => self.metrics.record_cache_miss(),
        }
        hit
    }

    pub fn insert(&self, text: &str, language: Language, translated: String) {
        if let Some((evicted, _)) = lock(&self.entries).push(CacheKey::new(text, language), translated)
        {
            if evicted.text != text || evicted.language != language {
                debug!("Evicted cached {} translation", evicted.language.code());
            }
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        lock(&self.entries).cap().get()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

/// The guarded data stays consistent even if a holder panicked, so a
/// poisoned lock is recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

type PendingTranslation = Shared<BoxFuture<'static, Result<String, TranslateError>>>;

/// A [`Translator`] fronted by a shared [`TranslationCache`].
pub struct CachedTranslator {
    inner: Arc<dyn Translator>,
    cache: Arc<TranslationCache>,
    in_flight: Mutex<HashMap<CacheKey, PendingTranslation>>,
}

impl CachedTranslator {
    pub fn new(inner: Arc<dyn Translator>, cache: Arc<TranslationCache>) -> Self {
        Self {
            inner,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    fn pending(&self, key: &CacheKey) -> PendingTranslation {
        lock(&self.in_flight)
            .entry(key.clone())
            .or_insert_with(|| {
                let inner = Arc::clone(&self.inner);
                let text = key.text.clone();
                let language = key.language;
                async move { inner.try_translate(&text, language).await }
                    .boxed()
                    .shared()
            })
            .clone()
    }

    /// Drop the in-flight entry for `key` if it is still `pending`. A newer
    /// request registered after a failure stays in place.
    fn finish(&self, key: &CacheKey, pending: &PendingTranslation) {
        let mut in_flight = lock(&self.in_flight);
        if in_flight
            .get(key)
            .is_some_and(|current| current.ptr_eq(pending))
        {
            in_flight.remove(key);
        }
    }
}

impl Translator for CachedTranslator {
    fn try_translate<'a>(
        &'a self,
        text: &'a str,
        target: Language,
    ) -> BoxFuture<'a, Result<String, TranslateError>> {
        Box::pin(async move {
            if let Some(cached) = self.cache.get(text, target) {
                return Ok(cached);
            }

            let key = CacheKey::new(text, target);
            let pending = self.pending(&key);
            let result = pending.clone().await;

            // Populate the cache before dropping the in-flight entry so a
            // concurrent caller always finds one or the other.
            if let Ok(translated) = &result {
                self.cache.insert(text, target, translated.clone());
            }
            self.finish(&key, &pending);

            result
        })
    }
}
