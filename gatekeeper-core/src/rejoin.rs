use crate::config::RejoinConfig;
use gatekeeper_packets::SourceAddress;
use std::collections::HashMap;
use tokio::time::{Duration, Instant};

/// Key for a pending rejoin nonce: a lower-cased username paired with the source address that
/// requested it. Lower-casing here (rather than at every call site) keeps the two-step admission
/// match case-insensitive, matching how Minecraft usernames are compared elsewhere in the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RejoinKey {
    username: String,
    source: SourceAddress,
}

impl RejoinKey {
    fn new(username: &str, source: SourceAddress) -> Self {
        Self {
            username: username.to_ascii_lowercase(),
            source,
        }
    }
}

/// Tracks soft-denials that force a client to reconnect, gating the second connection attempt
/// of a two-step admission.
#[derive(Debug)]
pub struct RejoinCache {
    config: RejoinConfig,
    entries: HashMap<RejoinKey, Instant>,
}

impl RejoinCache {
    pub fn new(config: RejoinConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    pub fn issue(&mut self, username: &str, source: SourceAddress, now: Instant) {
        self.entries.insert(RejoinKey::new(username, source), now);
    }

    /// Returns `true` and removes the entry iff present and still within `rejoin_valid_time`.
    pub fn consume(&mut self, username: &str, source: SourceAddress, now: Instant) -> bool {
        let key = RejoinKey::new(username, source);
        let Some(issued) = self.entries.remove(&key) else {
            return false;
        };
        now.saturating_duration_since(issued)
            <= Duration::from_secs(self.config.rejoin_valid_time_secs)
    }

    /// Removes entries that have aged past `rejoin_valid_time`, regardless of whether they were
    /// ever consumed. Run on a roughly 30-second period by the composition root.
    pub fn sweep(&mut self, now: Instant) {
        let valid_for = Duration::from_secs(self.config.rejoin_valid_time_secs);
        self.entries
            .retain(|_, issued| now.saturating_duration_since(*issued) <= valid_for);
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

    fn cache() -> RejoinCache {
        RejoinCache::new(RejoinConfig {
            rejoin_valid_time_secs: 30,
        })
    }

    #[tokio::test]
    async fn issue_then_consume_returns_true_exactly_once() {
        tokio::time::pause();
        let mut cache = cache();
        let now = Instant::now();
        cache.issue("Alice", addr(1), now);
        assert!(cache.consume("alice", addr(1), now));
        assert!(!cache.consume("alice", addr(1), now));
    }

    #[tokio::test]
    async fn consume_fails_after_the_valid_window() {
        tokio::time::pause();
        let mut cache = cache();
        let now = Instant::now();
        cache.issue("bob", addr(2), now);
        let later = now + Duration::from_secs(31);
        assert!(!cache.consume("bob", addr(2), later));
    }

    #[tokio::test]
    async fn different_sources_do_not_share_an_entry() {
        tokio::time::pause();
        let mut cache = cache();
        let now = Instant::now();
        cache.issue("carol", addr(3), now);
        assert!(!cache.consume("carol", addr(4), now));
    }

    #[tokio::test]
    async fn sweep_evicts_aged_entries() {
        tokio::time::pause();
        let mut cache = cache();
        let now = Instant::now();
        cache.issue("dave", addr(5), now);
        cache.sweep(now + Duration::from_secs(31));
        assert!(cache.is_empty());
    }
}
