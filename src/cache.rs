//! Corpus cache keyed by URL.
//!
//! The fetcher itself is supplied by the caller; this module only decides
//! when to call it. Concurrent requests for one URL share a single fetch.

use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;

use crate::error::Error;

/// `^(?:http|ftp)s?://\S+$`, case-insensitive.
pub fn is_valid_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    let rest = ["https://", "http://", "ftps://", "ftp://"]
        .iter()
        .find(|scheme| lower.starts_with(*scheme))
        .map(|scheme| &url[scheme.len()..]);
    match rest {
        Some(rest) => !rest.is_empty() && !rest.chars().any(char::is_whitespace),
        None => false,
    }
}

type Slot = Arc<Mutex<Option<Arc<str>>>>;

pub struct CorpusCache<F> {
    fetch: F,
    slots: Mutex<FxHashMap<String, Slot>>,
}

impl<F, E> CorpusCache<F>
where
    F: Fn(&str) -> Result<String, E>,
    E: Display,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            slots: Mutex::new(FxHashMap::default()),
        }
    }

    /// Returns the corpus for `url`, fetching it if it is not cached yet.
    ///
    /// Callers asking for the same URL while a fetch is running wait for it
    /// and get its result. A failed fetch is not cached, so the next call
    /// tries again.
    pub fn get(&self, url: &str) -> Result<Arc<str>, Error> {
        if !is_valid_url(url) {
            return Err(Error::Input(format!("Invalid URL '{url}'")));
        }

        let slot = Arc::clone(
            self.slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(url.to_string())
                .or_default(),
        );

        let mut corpus = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(text) = corpus.as_ref() {
            return Ok(Arc::clone(text));
        }

        log::debug!("fetching corpus for {url}");
        match (self.fetch)(url) {
            Ok(text) => {
                let text: Arc<str> = text.into();
                *corpus = Some(Arc::clone(&text));
                Ok(text)
            }
            Err(e) => {
                log::warn!("fetching {url} failed: {e}");
                self.evict(url, &slot);
                Err(Error::Fetch {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Drops the map entry for `url` if it still points at `slot`; an
    /// invalidation may already have replaced it.
    fn evict(&self, url: &str, slot: &Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.get(url).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(url);
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned();
        match slot {
            Some(slot) => {
                let cached = slot.lock().unwrap_or_else(PoisonError::into_inner).is_some();
                cached
            }
            None => false,
        }
    }

    /// Forgets the cached corpus for `url`. A fetch already in flight still
    /// completes for the callers waiting on it.
    pub fn invalidate(&self, url: &str) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url);
    }

    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com/page"));
        assert!(is_valid_url("HTTP://EXAMPLE.COM"));
        assert!(is_valid_url("ftp://files.example.com/a.txt"));
        assert!(is_valid_url("ftps://x"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("https://exa mple.com"));
        assert!(!is_valid_url("file:///etc/passwd"));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_fetches_once_until_invalidated() {
        let calls = AtomicUsize::new(0);
        let cache = CorpusCache::new(|url: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(format!("text of {url}"))
        });

        let a = cache.get("https://a.test").unwrap();
        let b = cache.get("https://a.test").unwrap();
        assert_eq!(&*a, "text of https://a.test");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains("https://a.test"));

        cache.invalidate("https://a.test");
        assert!(!cache.contains("https://a.test"));
        cache.get("https://a.test").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.get("https://b.test").unwrap();
        cache.clear();
        assert!(!cache.contains("https://b.test"));
    }

    #[test]
    fn test_failures_are_not_cached() {
        let calls = AtomicUsize::new(0);
        let cache = CorpusCache::new(|_: &str| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("503 Service Unavailable")
            } else {
                Ok("recovered".to_string())
            }
        });

        let err = cache.get("https://flaky.test").unwrap_err();
        assert!(matches!(err, Error::Fetch { ref reason, .. } if reason.contains("503")));
        assert!(!cache.contains("https://flaky.test"));
        assert!(cache.slots.lock().unwrap().is_empty());
        assert_eq!(&*cache.get("https://flaky.test").unwrap(), "recovered");
    }

    #[test]
    fn test_failed_urls_leave_no_entries() {
        let cache = CorpusCache::new(|url: &str| Err::<String, _>(format!("404 for {url}")));
        for i in 0..50 {
            assert!(cache.get(&format!("https://gone.test/{i}")).is_err());
        }
        assert!(cache.slots.lock().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_url_is_rejected_without_fetching() {
        let cache = CorpusCache::new(|_: &str| -> Result<String, String> {
            panic!("must not fetch")
        });
        assert!(matches!(cache.get("not a url"), Err(Error::Input(_))));
    }
}
