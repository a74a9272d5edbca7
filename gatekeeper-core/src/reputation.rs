use crate::config::ReputationConfig;
use gatekeeper_packets::SourceAddress;
use std::collections::HashMap;
use tokio::time::{Duration, Instant};

/// Failure count and optional blacklist deadline for one source address.
#[derive(Debug, Clone, Copy)]
struct ReputationEntry {
    failures: u32,
    blacklisted_until: Option<Instant>,
    last_activity: Instant,
}

/// Tracks verification failures per source and blacklists repeat offenders for a configured
/// duration. Entries are swept out once both the blacklist deadline has passed and the entry
/// has aged beyond `remember_time`.
///
/// Mirrors the teacher's rate limiter in shape: a plain `HashMap` behind exclusive access,
/// cleaned up by an explicit sweep rather than a background task owned by the map itself.
#[derive(Debug)]
pub struct ReputationCache {
    config: ReputationConfig,
    entries: HashMap<SourceAddress, ReputationEntry>,
}

impl ReputationCache {
    pub fn new(config: ReputationConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    /// Records a verification failure, possibly blacklisting the source.
    pub fn record_failure(&mut self, source: SourceAddress, now: Instant) {
        let entry = self.entries.entry(source).or_insert(ReputationEntry {
            failures: 0,
            blacklisted_until: None,
            last_activity: now,
        });
        entry.failures += 1;
        entry.last_activity = now;

        if entry.failures >= self.config.blacklist_threshold {
            entry.blacklisted_until =
                Some(now + Duration::from_secs(self.config.blacklist_time_secs));
            tracing::info!(%source, failures = entry.failures, "source blacklisted");
        }
    }

    pub fn is_blacklisted(&self, source: SourceAddress, now: Instant) -> bool {
        self.entries
            .get(&source)
            .and_then(|entry| entry.blacklisted_until)
            .is_some_and(|deadline| deadline > now)
    }

    /// Removes entries whose blacklist has expired and whose last activity is older than
    /// `remember_time`. Run on a roughly 30-second period by the composition root.
    pub fn sweep(&mut self, now: Instant) {
        let remember = Duration::from_secs(self.config.remember_time_secs);
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            let blacklist_active = entry.blacklisted_until.is_some_and(|d| d > now);
            let aged_out = now.saturating_duration_since(entry.last_activity) > remember;
            blacklist_active || !aged_out
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "reputation cache sweep evicted entries");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr(n: u8) -> SourceAddress {
        SourceAddress::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, n)))
    }

    fn cache() -> ReputationCache {
        ReputationCache::new(ReputationConfig {
            blacklist_threshold: 3,
            blacklist_time_secs: 600,
            remember_time_secs: 3600,
        })
    }

    #[tokio::test]
    async fn blacklists_after_threshold_failures() {
        tokio::time::pause();
        let mut cache = cache();
        let source = addr(1);
        let now = Instant::now();
        cache.record_failure(source, now);
        cache.record_failure(source, now);
        assert!(!cache.is_blacklisted(source, now));
        cache.record_failure(source, now);
        assert!(cache.is_blacklisted(source, now));
    }

    #[tokio::test]
    async fn blacklist_expires_after_blacklist_time() {
        tokio::time::pause();
        let mut cache = cache();
        let source = addr(2);
        let now = Instant::now();
        for _ in 0..3 {
            cache.record_failure(source, now);
        }
        assert!(cache.is_blacklisted(source, now));

        let later = now + Duration::from_secs(601);
        assert!(!cache.is_blacklisted(source, later));
    }

    #[tokio::test]
    async fn sweep_evicts_aged_out_non_blacklisted_entries() {
        tokio::time::pause();
        let mut cache = cache();
        let source = addr(3);
        let now = Instant::now();
        cache.record_failure(source, now);
        assert_eq!(cache.len(), 1);

        let later = now + Duration::from_secs(3601);
        cache.sweep(later);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn sweep_keeps_active_blacklist_even_if_aged() {
        tokio::time::pause();
        let mut cache = cache();
        let source = addr(4);
        let now = Instant::now();
        for _ in 0..3 {
            cache.record_failure(source, now);
        }

        let later = now + Duration::from_secs(3601);
        cache.sweep(later);
        assert_eq!(cache.len(), 1, "blacklist is still active, entry must survive the sweep");
    }
}
