use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
const SWEEP_THRESHOLD: usize = 1000;

#[derive(Debug)]
struct CacheEntry {
    value: serde_json::Value,
    created_at: Instant,
}

/// Process-local TTL cache for computed analysis results, keyed by
/// `(user, analysis type, params)`. Owned by the composition root and handed
/// to whoever needs it; there is no global instance.
#[derive(Debug)]
pub struct AnalysisCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get<T, P>(&self, user_id: &str, analysis_type: &str, params: &P) -> Option<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let key = compose_key(user_id, analysis_type, params)?;
        let mut entries = self.entries.lock();

        match entries.get(&key) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => {
                serde_json::from_value(entry.value.clone()).ok()
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn set<T, P>(&self, user_id: &str, analysis_type: &str, params: &P, value: &T)
    where
        T: Serialize,
        P: Serialize,
    {
        let Some(key) = compose_key(user_id, analysis_type, params) else {
            return;
        };
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };

        let mut entries = self.entries.lock();
        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );

        // Overflow triggers a TTL sweep, not an LRU eviction.
        if entries.len() > SWEEP_THRESHOLD {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.created_at.elapsed() < ttl);
        }
    }

    pub fn clear(&self, user_id: &str) {
        let prefix = format!("{user_id}-");
        self.entries.lock().retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Params round-trip through `serde_json::Value`, whose object map is ordered
/// by key, so two structurally equal params always produce the same key.
fn compose_key<P: Serialize>(user_id: &str, analysis_type: &str, params: &P) -> Option<String> {
    let canonical = serde_json::to_value(params).ok()?;
    Some(format!("{user_id}-{analysis_type}-{canonical}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Params {
        period: String,
        limit: u32,
    }

    fn params() -> Params {
        Params {
            period: "week".to_string(),
            limit: 5,
        }
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.set("u1", "insights", &params(), &42i64);
        assert_eq!(cache.get::<i64, _>("u1", "insights", &params()), Some(42));
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = AnalysisCache::new(Duration::from_millis(1));
        cache.set("u1", "insights", &params(), &42i64);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get::<i64, _>("u1", "insights", &params()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_removes_only_that_user() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.set("u1", "insights", &params(), &1i64);
        cache.set("u2", "insights", &params(), &2i64);

        cache.clear("u1");
        assert_eq!(cache.get::<i64, _>("u1", "insights", &params()), None);
        assert_eq!(cache.get::<i64, _>("u2", "insights", &params()), Some(2));
    }

    #[test]
    fn test_key_ignores_field_order() {
        // Two JSON objects with the same fields in different declaration
        // order canonicalize to the same key.
        let a = serde_json::json!({"period": "week", "limit": 5});
        let b = serde_json::json!({"limit": 5, "period": "week"});

        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.set("u1", "insights", &a, &7i64);
        assert_eq!(cache.get::<i64, _>("u1", "insights", &b), Some(7));
    }

    #[test]
    fn test_overflow_sweeps_expired_entries() {
        let cache = AnalysisCache::new(Duration::from_millis(1));
        for i in 0..SWEEP_THRESHOLD {
            cache.set("u1", "insights", &i, &i);
        }
        std::thread::sleep(Duration::from_millis(5));

        // The insert that crosses the threshold triggers the sweep; only the
        // fresh entry survives.
        cache.set("u1", "insights", &"fresh", &1i64);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_params_are_distinct_entries() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.set("u1", "summary", &params(), &1i64);
        let other = Params {
            period: "month".to_string(),
            limit: 5,
        };
        assert_eq!(cache.get::<i64, _>("u1", "summary", &other), None);
    }
}
