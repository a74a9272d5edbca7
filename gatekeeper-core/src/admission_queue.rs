use crate::config::QueueConfig;
use gatekeeper_packets::{Handshake, SourceAddress};
use std::collections::{HashMap, VecDeque};
use tokio::time::{Duration, Instant};

struct QueuedEntry {
    handshake: Handshake,
    #[allow(dead_code)]
    enqueued_at: Instant,
}

/// Bounded FIFO of handshakes suspended while the [`crate::attack_detector::AttackDetector`] is
/// in `UnderAttack` mode, drained at a fixed rate by a one-second periodic worker.
///
/// Mirrors the teacher's rate limiter: a plain owned map plus queue behind exclusive access,
/// with its own per-source throttle rather than delegating to a separate limiter.
pub struct AdmissionQueue {
    config: QueueConfig,
    queue: VecDeque<QueuedEntry>,
    last_attempt: HashMap<SourceAddress, Instant>,
}

/// Outcome of attempting to suspend a handshake in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// The source retried too soon after its previous queue attempt.
    TooSoon,
}

impl AdmissionQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            last_attempt: HashMap::new(),
        }
    }

    /// Suspends `handshake`, unless its source retried within `rejoin_delay` of its last
    /// attempt, in which case the caller should respond with
    /// `SoftDeny("wait_before_reconnecting", allow_rejoin=false)`.
    pub fn enqueue(&mut self, handshake: Handshake, now: Instant) -> EnqueueOutcome {
        let source = handshake.source;
        if let Some(last) = self.last_attempt.get(&source) {
            if now.saturating_duration_since(*last) < Duration::from_secs(self.config.rejoin_delay_secs) {
                return EnqueueOutcome::TooSoon;
            }
        }
        self.last_attempt.insert(source, now);
        self.queue.push_back(QueuedEntry {
            handshake,
            enqueued_at: now,
        });
        EnqueueOutcome::Queued
    }

    /// Removes up to `max_polls` handshakes from the front of the queue for the caller to
    /// resume (re-entering the controller at step 6).
    pub fn drain(&mut self) -> Vec<Handshake> {
        let take = self.config.max_polls as usize;
        let mut resumed = Vec::with_capacity(take.min(self.queue.len()));
        for _ in 0..take {
            let Some(entry) = self.queue.pop_front() else {
                break;
            };
            resumed.push(entry.handshake);
        }
        if !resumed.is_empty() {
            tracing::debug!(count = resumed.len(), remaining = self.queue.len(), "drained admission queue");
        }
        resumed
    }

    /// Discards any queued handshake matching `predicate`, used when the underlying connection
    /// closes before its turn to drain.
    pub fn cancel(&mut self, mut predicate: impl FnMut(&Handshake) -> bool) {
        self.queue.retain(|entry| !predicate(&entry.handshake));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
