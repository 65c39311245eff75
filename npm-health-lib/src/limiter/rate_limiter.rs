use crate::HashMap;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;

const LOG_TARGET: &str = "   limiter";

/// Tuning knobs of a [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Maximum number of distinct keys tracked at once.
    pub capacity: usize,

    /// How long a key's counter lives after its most recent request.
    #[serde(with = "humantime_serde")]
    pub window: Duration,

    /// Maximum number of admitted requests per key per window.
    pub threshold: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            window: Duration::from_secs(5 * 60),
            threshold: 30,
        }
    }
}

/// The request budget reported back to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u32,
    pub remaining: u32,
}

/// Outcome of [`RateLimiter::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted(Quota),
    Limited(Quota),
}

impl Admission {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }

    #[must_use]
    pub const fn quota(&self) -> Quota {
        match self {
            Self::Admitted(q) | Self::Limited(q) => *q,
        }
    }
}

#[derive(Debug)]
struct Entry {
    count: u32,
    expires_at: Instant,
    touched: u64,
}

#[derive(Debug, Default)]
struct Table {
    entries: HashMap<String, Entry>,

    /// Keys ordered by last touch. Every touch also refreshes the expiry by the
    /// same window, so this is expiry order too.
    recency: BTreeMap<u64, String>,

    next_touch: u64,
}

impl Table {
    fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        let _ = self.recency.remove(&entry.touched);
        Some(entry)
    }

    fn purge_expired(&mut self, now: Instant) {
        while let Some(entry) = self.recency.first_key_value().and_then(|(_, key)| self.entries.get(key)) {
            if entry.expires_at > now {
                break;
            }

            let _ = self.recency.pop_first().map(|(_, key)| self.entries.remove(&key));
        }
    }

    fn evict_least_recent(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            log::debug!(target: LOG_TARGET, "Evicting least recently seen client '{key}'");
            let _ = self.entries.remove(&key);
        }
    }
}

/// A bounded, time-expiring request counter per client key.
///
/// Each key gets a counter that lives for `window` after the key's most recent
/// request. This is a fixed counter per time-to-live, not a sliding window: a
/// client that keeps knocking keeps its counter alive and stays limited until
/// it pauses for a full window. When `capacity` keys are live, admitting a new
/// key evicts the least recently seen one, which bounds memory at the cost of
/// letting an evicted key start over.
///
/// The whole read-increment-write-evict sequence runs under one lock, so
/// concurrent requests for the same key always observe each other's increments.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    table: Mutex<Table>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            table: Mutex::new(Table::default()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request for `key` and decide whether it may proceed.
    pub fn admit(&self, key: &str) -> Admission {
        self.admit_at(key, Instant::now())
    }

    /// Like [`Self::admit`], at an explicit point in time.
    pub fn admit_at(&self, key: &str, now: Instant) -> Admission {
        let mut table = self.table.lock().expect("lock not poisoned");

        let previous = table
            .remove(key)
            .filter(|entry| entry.expires_at > now)
            .map_or(0, |entry| entry.count);

        table.purge_expired(now);
        while table.entries.len() >= self.config.capacity.max(1) {
            table.evict_least_recent();
        }

        let count = previous.saturating_add(1);
        let touched = table.next_touch;
        table.next_touch += 1;

        let _ = table.recency.insert(touched, key.to_string());
        let _ = table.entries.insert(
            key.to_string(),
            Entry {
                count,
                expires_at: now + self.config.window,
                touched,
            },
        );

        let quota = Quota {
            limit: self.config.threshold,
            remaining: self.config.threshold.saturating_sub(count),
        };

        if count <= self.config.threshold {
            Admission::Admitted(quota)
        } else {
            log::info!(target: LOG_TARGET, "Client '{key}' exceeded {} request(s) per {:?}", self.config.threshold, self.config.window);
            Admission::Limited(quota)
        }
    }

    /// Number of keys currently tracked, including ones that expired but were not purged yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().expect("lock not poisoned").entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(capacity: usize, window_secs: u64, threshold: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            capacity,
            window: Duration::from_secs(window_secs),
            threshold,
        })
    }

    #[test]
    fn test_threshold_of_one() {
        let limiter = limiter(10, 60, 1);

        let first = limiter.admit("1.2.3.4");
        assert!(first.is_allowed());
        assert_eq!(first.quota(), Quota { limit: 1, remaining: 0 });

        let second = limiter.admit("1.2.3.4");
        assert!(!second.is_allowed());
        assert_eq!(second.quota(), Quota { limit: 1, remaining: 0 });
    }

    #[test]
    fn test_remaining_counts_down() {
        let limiter = limiter(10, 60, 3);
        let now = Instant::now();

        assert_eq!(limiter.admit_at("k", now), Admission::Admitted(Quota { limit: 3, remaining: 2 }));
        assert_eq!(limiter.admit_at("k", now), Admission::Admitted(Quota { limit: 3, remaining: 1 }));
        assert_eq!(limiter.admit_at("k", now), Admission::Admitted(Quota { limit: 3, remaining: 0 }));
        assert_eq!(limiter.admit_at("k", now), Admission::Limited(Quota { limit: 3, remaining: 0 }));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(10, 60, 2);
        let now = Instant::now();

        for _ in 0..5 {
            let _ = limiter.admit_at("noisy", now);
        }

        assert!(!limiter.admit_at("noisy", now).is_allowed());
        assert_eq!(limiter.admit_at("quiet", now), Admission::Admitted(Quota { limit: 2, remaining: 1 }));
    }

    #[test]
    fn test_counter_expires_after_window() {
        let limiter = limiter(10, 60, 1);
        let start = Instant::now();

        assert!(limiter.admit_at("k", start).is_allowed());
        assert!(!limiter.admit_at("k", start + Duration::from_secs(30)).is_allowed());

        // the rejected request refreshed the expiry, so 61s after the start is still inside the window
        assert!(!limiter.admit_at("k", start + Duration::from_secs(61)).is_allowed());

        assert!(limiter.admit_at("k", start + Duration::from_secs(122)).is_allowed());
    }

    #[test]
    fn test_capacity_evicts_least_recently_seen() {
        let limiter = limiter(2, 60, 1);
        let now = Instant::now();

        let _ = limiter.admit_at("a", now);
        let _ = limiter.admit_at("b", now);

        // touching "a" makes "b" the eviction candidate
        assert!(!limiter.admit_at("a", now).is_allowed());

        let _ = limiter.admit_at("c", now);
        assert_eq!(limiter.len(), 2);

        // "b" was evicted and starts over
        assert!(limiter.admit_at("b", now).is_allowed());
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn test_expired_entries_are_purged_before_eviction() {
        let limiter = limiter(2, 60, 1);
        let start = Instant::now();

        let _ = limiter.admit_at("old", start);
        let _ = limiter.admit_at("fresh", start + Duration::from_secs(50));
        let _ = limiter.admit_at("new", start + Duration::from_secs(70));

        // "old" expired and made room, so "fresh" is still tracked
        assert!(!limiter.admit_at("fresh", start + Duration::from_secs(71)).is_allowed());
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let limiter = limiter(5, 60, 30);
        let now = Instant::now();

        for i in 0..100 {
            let _ = limiter.admit_at(&format!("10.0.0.{i}"), now);
            assert!(limiter.len() <= 5);
        }
    }

    #[test]
    fn test_zero_capacity_still_tracks_one_key() {
        let limiter = limiter(0, 60, 1);
        assert!(limiter.admit("k").is_allowed());
        assert!(!limiter.admit("k").is_allowed());
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_concurrent_admissions_are_counted_exactly() {
        let limiter = Arc::new(limiter(10, 60, 50));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || (0..25).filter(|_| limiter.admit("shared").is_allowed()).count())
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
    }

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.capacity, 500);
        assert_eq!(config.window, Duration::from_secs(300));
        assert_eq!(config.threshold, 30);
    }
}
