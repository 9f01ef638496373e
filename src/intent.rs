//! Vague-intent detection.
//!
//! A message is unclear when it has fewer than [`MIN_WORDS`] whitespace-delimited words
//! or contains one of [`VAGUE_TERMS`] as a case-insensitive substring. The check is pure,
//! so [`IntentClassifier`] memoizes recent answers in a fixed-capacity LRU.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

/// Messages with fewer words than this are considered unclear.
pub const MIN_WORDS: usize = 3;

/// Terms that signal an unresolved reference. Matched as substrings of the lowercased text.
pub const VAGUE_TERMS: &[&str] = &[
    "that",
    "this",
    "it",
    "thing",
    "stuff",
    "handle that",
    "do it",
    "take care of it",
    "whatever",
];

/// Default number of memoized classifications.
pub const DEFAULT_CACHE_SIZE: usize = 128;

/// Uncached classification.
pub fn is_unclear(text: &str) -> bool {
    let low_word_count = text.split_whitespace().count() < MIN_WORDS;
    if low_word_count {
        return true;
    }
    let lowered = text.to_lowercase();
    VAGUE_TERMS.iter().any(|term| lowered.contains(term))
}

/// Classifier with an optional bounded memo of recent inputs.
pub struct IntentClassifier {
    cache: Option<Mutex<LruCache<String, bool>>>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

impl IntentClassifier {
    /// `cache_size == 0` disables memoization.
    pub fn new(cache_size: usize) -> Self {
        let cache = NonZeroUsize::new(cache_size).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { cache }
    }

    pub fn is_unclear(&self, text: &str) -> bool {
        let Some(cache) = &self.cache else {
            return is_unclear(text);
        };

        let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(&hit) = cache.get(text) {
            return hit;
        }
        let verdict = is_unclear(text);
        cache.put(text.to_string(), verdict);
        verdict
    }

    /// Number of memoized entries (0 when caching is disabled).
    #[cfg(test)]
    fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }
}
