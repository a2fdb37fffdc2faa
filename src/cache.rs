use std::collections::HashMap;
use std::time::{Duration, Instant};

/// In-memory cache with per-entry insertion timestamps and a fixed TTL.
///
/// Expiry is checked lazily on read; a stale entry is removed the first time
/// a read observes it. There is no size bound and no background sweep, so a
/// long-lived process trades memory for the saved requests.
///
/// Reads and writes take an explicit `Instant` so tests can drive the clock;
/// the `get`/`insert` wrappers use `Instant::now()`.
pub struct TtlCache<T> {
    entries: HashMap<String, Entry<T>>,
    ttl: Duration,
}

struct Entry<T> {
    value: T,
    inserted_at: Instant,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    /// Return the stored value if it is younger than the TTL as of `now`.
    /// An expired entry is deleted as a side effect of the miss.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<T> {
        match self.entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.inserted_at) < self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.insert_at(key, value, Instant::now());
    }

    /// Store `value` under `key`, unconditionally replacing any prior entry.
    pub fn insert_at(&mut self, key: impl Into<String>, value: T, now: Instant) {
        self.entries.insert(
            key.into(),
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the composite cache key for a request: the method name plus its
/// parameters serialized in name order, so two logically identical requests
/// produce the same key no matter how the caller ordered the parameters.
pub fn cache_key(method: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut key = String::from(method);
    for (name, value) in sorted {
        key.push(':');
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[test]
    fn get_returns_what_set_stored() {
        let mut cache = TtlCache::new(HOUR);
        let t0 = Instant::now();
        cache.insert_at("teamStats:teamId=5", 42, t0);
        assert_eq!(cache.get_at("teamStats:teamId=5", t0), Some(42));
    }

    #[test]
    fn entry_is_present_just_before_expiry_and_gone_just_after() {
        let mut cache = TtlCache::new(HOUR);
        let t0 = Instant::now();
        cache.insert_at("teamStats:teamId=5", 42, t0);

        let almost = t0 + Duration::from_secs(59 * 60 + 59);
        assert_eq!(cache.get_at("teamStats:teamId=5", almost), Some(42));

        let past = t0 + Duration::from_secs(60 * 60 + 1);
        assert_eq!(cache.get_at("teamStats:teamId=5", past), None);
    }

    #[test]
    fn stale_entry_is_evicted_and_does_not_resurrect() {
        let mut cache = TtlCache::new(HOUR);
        let t0 = Instant::now();
        cache.insert_at("k", 1, t0);

        let past = t0 + HOUR + Duration::from_secs(1);
        assert_eq!(cache.get_at("k", past), None);
        assert!(cache.is_empty(), "expired entry must be deleted on read");

        // A read back at the original time must not find the value again.
        assert_eq!(cache.get_at("k", t0), None);
    }

    #[test]
    fn insert_overwrites_value_and_timestamp() {
        let mut cache = TtlCache::new(HOUR);
        let t0 = Instant::now();
        cache.insert_at("k", 1, t0);

        let later = t0 + Duration::from_secs(45 * 60);
        cache.insert_at("k", 2, later);

        // The rewrite restarts the clock: still valid 90 minutes after t0.
        let check = t0 + Duration::from_secs(90 * 60);
        assert_eq!(cache.get_at("k", check), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_key_is_order_independent() {
        let a = cache_key(
            "schedule",
            &[("teamId", "5".into()), ("season", "2024".into())],
        );
        let b = cache_key(
            "schedule",
            &[("season", "2024".into()), ("teamId", "5".into())],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_distinguishes_methods_and_values() {
        let a = cache_key("schedule", &[("teamId", "5".into())]);
        let b = cache_key("teamStats", &[("teamId", "5".into())]);
        let c = cache_key("schedule", &[("teamId", "6".into())]);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
