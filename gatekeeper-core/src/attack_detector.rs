use crate::config::AttackDetectorConfig;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use tokio::time::{Duration, Instant};

/// Current operating mode of the [`AttackDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackMode {
    Normal,
    UnderAttack,
}

/// Per-second counter of admission decisions that reach step 5 of the controller, with
/// hysteresis between `Normal` and `UnderAttack`.
///
/// The counter itself is a plain atomic so [`AttackDetector::record_decision`] never blocks a
/// handshake task; `tick` is expected to be driven by a single one-second periodic worker.
#[derive(Debug)]
pub struct AttackDetector {
    config: AttackDetectorConfig,
    current_second_count: AtomicU32,
    under_attack: AtomicBool,
    entered_at_millis: AtomicU64,
    started_at: Instant,
}

impl AttackDetector {
    pub fn new(config: AttackDetectorConfig) -> Self {
        Self {
            config,
            current_second_count: AtomicU32::new(0),
            under_attack: AtomicBool::new(false),
            entered_at_millis: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Records that a handshake reached the attack-detector step of the controller.
    pub fn record_decision(&self) {
        self.current_second_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mode(&self) -> AttackMode {
        if self.under_attack.load(Ordering::Relaxed) {
            AttackMode::UnderAttack
        } else {
            AttackMode::Normal
        }
    }

    /// Reads-and-resets the per-second counter, applying the hysteresis rule from the
    /// documented invariant: entry requires the sampled count to cross the threshold; exit
    /// requires both a below-threshold sample and `min_attack_duration` elapsed since entry.
    pub fn tick(&self, now: Instant) {
        let sampled = self.current_second_count.swap(0, Ordering::Relaxed);
        let above_threshold = sampled >= self.config.min_players_for_attack;

        if above_threshold {
            if !self.under_attack.swap(true, Ordering::Relaxed) {
                self.entered_at_millis.store(
                    now.saturating_duration_since(self.started_at).as_millis() as u64,
                    Ordering::Relaxed,
                );
                tracing::info!(sampled, "attack detector entered UNDER_ATTACK");
            }
            return;
        }

        if self.under_attack.load(Ordering::Relaxed) {
            let entered_at = self.started_at
                + Duration::from_millis(self.entered_at_millis.load(Ordering::Relaxed));
            if now.saturating_duration_since(entered_at)
                >= Duration::from_secs(self.config.min_attack_duration_secs)
            {
                self.under_attack.store(false, Ordering::Relaxed);
                tracing::info!("attack detector returned to NORMAL");
            }
        }
    }
}
