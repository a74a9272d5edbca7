use crate::admission_queue::{AdmissionQueue, EnqueueOutcome};
use crate::attack_detector::{AttackDetector, AttackMode};
use crate::config::AdmissionConfig;
use crate::error::Error;
use crate::reputation::ReputationCache;
use crate::rejoin::RejoinCache;
use crate::session::checks::{
    CaptchaCheck, CheckInstance, ClientBrandCheck, CollisionCheck, GravityCheck, VehicleCheck,
};
use crate::session::{SessionState, VerificationSession};
use gatekeeper_captcha::{CaptchaGenerator, CaptchaPool};
use gatekeeper_packets::{AdmissionDecision, Handshake, InboundEvent, OutboundPacket, Reason, SourceAddress};
use regex::Regex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

/// What the caller should do immediately after `begin_admission`: either a final verdict
/// (including the `Queue` case handled entirely by steps 1-6), or a verification session was
/// started and the caller must start forwarding inbound events for `session_id`.
///
/// This is the idiomatic-Rust shape of the source's step 7 ("create a session; return Admit
/// only after it reaches Passed"): rather than blocking the caller's task until verification
/// concludes, the session starts immediately and its eventual terminal state is observed through
/// [`AdmissionController::on_inbound_event`], [`AdmissionController::on_client_close`], or the
/// stale-session sweep. See `DESIGN.md` for why this departs from a single synchronous return.
#[derive(Debug)]
pub enum AdmissionOutcome {
    Decision(AdmissionDecision),
    Verifying {
        session_id: Uuid,
        outbound: Vec<OutboundPacket>,
    },
}

/// Composition root: owns the attack detector, admission queue, reputation and rejoin caches,
/// the CAPTCHA pool, and every live verification session. Constructed inert via `new`; must be
/// brought up with `enable` before `begin_admission` will accept handshakes.
pub struct AdmissionController {
    config: AdmissionConfig,
    valid_name_regex: Regex,
    client_brand_regex: Regex,
    enabled: AtomicBool,
    attack_detector: AttackDetector,
    queue: Mutex<AdmissionQueue>,
    reputation: Mutex<ReputationCache>,
    rejoin: Mutex<RejoinCache>,
    sessions: Mutex<HashMap<Uuid, VerificationSession>>,
    online_per_ip: Mutex<HashMap<SourceAddress, u32>>,
    captcha_generator: CaptchaGenerator,
    captcha_pool: Mutex<CaptchaPool>,
}

impl AdmissionController {
    /// Builds the composition root without priming the CAPTCHA pool or accepting traffic; call
    /// [`AdmissionController::enable`] to finish startup.
    pub fn new(config: AdmissionConfig) -> Result<Self, Error> {
        let valid_name_regex = Regex::new(&config.valid_name_regex).map_err(|source| Error::InvalidRegex {
            field: "valid_name_regex",
            source,
        })?;
        let client_brand_regex =
            Regex::new(&config.client_brand.valid_brand_regex).map_err(|source| Error::InvalidRegex {
                field: "client_brand.valid_brand_regex",
                source,
            })?;

        let alphabet: Vec<char> = config.map_captcha.alphabet.chars().collect();
        let mut captcha_generator = CaptchaGenerator::new(alphabet, config.map_captcha.code_length)?;
        if let Some(path) = &config.map_captcha.background_path {
            captcha_generator = captcha_generator.with_background_file(path)?;
        }
        let captcha_pool = CaptchaPool::new(captcha_generator.clone(), config.map_captcha.precompute);

        Ok(Self {
            attack_detector: AttackDetector::new(config.attack_detector.clone()),
            queue: Mutex::new(AdmissionQueue::new(config.queue.clone())),
            reputation: Mutex::new(ReputationCache::new(config.reputation.clone())),
            rejoin: Mutex::new(RejoinCache::new(config.rejoin.clone())),
            sessions: Mutex::new(HashMap::new()),
            online_per_ip: Mutex::new(HashMap::new()),
            captcha_generator,
            captcha_pool: Mutex::new(captcha_pool),
            valid_name_regex,
            client_brand_regex,
            enabled: AtomicBool::new(false),
            config,
        })
    }

    /// Brings the composition root up: primes the CAPTCHA pool and opens admission to traffic.
    /// Refuses to start if the core is configured disabled.
    pub async fn enable(&self, rng: &mut impl rand::Rng) -> Result<(), Error> {
        if !self.config.enabled {
            return Err(Error::Disabled);
        }
        if self.config.map_captcha.enabled {
            self.captcha_pool.lock().await.prime(rng);
        }
        self.enabled.store(true, Ordering::Relaxed);
        tracing::info!("admission core enabled");
        Ok(())
    }

    /// Closes admission to new traffic; sessions already verifying are left to run to their own
    /// deadline or the stale-session sweep.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
        tracing::info!("admission core disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Runs steps 1-7 of the admission ordering for a freshly-arrived handshake.
    #[tracing::instrument(skip(self, handshake), fields(username = %handshake.username, source = %handshake.source))]
    pub async fn begin_admission(&self, handshake: Handshake) -> AdmissionOutcome {
        let now = Instant::now();

        if !self.enabled.load(Ordering::Relaxed) {
            return AdmissionOutcome::Decision(AdmissionDecision::hard_deny(Reason::Internal));
        }

        // 1. username regex
        if !self.valid_name_regex.is_match(&handshake.username) {
            return AdmissionOutcome::Decision(AdmissionDecision::hard_deny(Reason::InvalidName));
        }

        // 2. blacklist
        if self.reputation.lock().await.is_blacklisted(handshake.source, now) {
            return AdmissionOutcome::Decision(AdmissionDecision::hard_deny(Reason::Blacklisted));
        }

        // 3. per-IP cap
        {
            let counts = self.online_per_ip.lock().await;
            if counts.get(&handshake.source).copied().unwrap_or(0) >= self.config.max_online_per_ip {
                return AdmissionOutcome::Decision(AdmissionDecision::hard_deny(Reason::IpLimit));
            }
        }

        // 4. rejoin consume -> skip straight to verification
        let is_rejoin_leg = self
            .rejoin
            .lock()
            .await
            .consume(&handshake.username, handshake.source, now);
        if is_rejoin_leg {
            return self.start_verification(handshake, now).await;
        }

        // 5. attack detector
        self.attack_detector.record_decision();
        if self.attack_detector.mode() == AttackMode::UnderAttack {
            let mut queue = self.queue.lock().await;
            return AdmissionOutcome::Decision(match queue.enqueue(handshake, now) {
                EnqueueOutcome::Queued => AdmissionDecision::Queue,
                EnqueueOutcome::TooSoon => {
                    AdmissionDecision::soft_deny(Reason::WaitBeforeReconnecting, false)
                }
            });
        }

        // 6. forced rejoin
        if self.config.force_rejoin {
            self.rejoin
                .lock()
                .await
                .issue(&handshake.username, handshake.source, now);
            return AdmissionOutcome::Decision(AdmissionDecision::soft_deny(Reason::PleaseReconnect, true));
        }

        // 7. verification
        self.start_verification(handshake, now).await
    }

    async fn start_verification(&self, handshake: Handshake, now: Instant) -> AdmissionOutcome {
        let checks = self.build_checks(now).await;
        let (session, outbound) = VerificationSession::new(
            handshake.username,
            handshake.source,
            checks,
            Duration::from_secs(self.config.session.verification_deadline_secs),
            now,
        );
        let session_id = session.id;

        *self
            .online_per_ip
            .lock()
            .await
            .entry(handshake.source)
            .or_insert(0) += 1;

        self.sessions.lock().await.insert(session_id, session);
        tracing::debug!(%session_id, "verification session started");

        AdmissionOutcome::Verifying { session_id, outbound }
    }

    async fn build_checks(&self, now: Instant) -> Vec<CheckInstance> {
        let mut checks = Vec::new();
        if self.config.gravity.enabled {
            checks.push(CheckInstance::Gravity(GravityCheck::new(
                self.config.gravity.max_movement_ticks,
            )));
        }
        if self.config.collision.enabled {
            checks.push(CheckInstance::Collision(CollisionCheck::new()));
        }
        if self.config.vehicle.enabled {
            checks.push(CheckInstance::Vehicle(VehicleCheck::new(
                self.config.vehicle.required_conforming_ticks,
            )));
        }
        if self.config.map_captcha.enabled {
            let artifact = self.captcha_pool.lock().await.take();
            checks.push(CheckInstance::Captcha(CaptchaCheck::new(
                artifact,
                self.config.map_captcha.max_tries,
                Duration::from_secs(self.config.map_captcha.max_duration_secs),
                now,
            )));
        }
        if self.config.client_brand.enabled {
            checks.push(CheckInstance::ClientBrand(ClientBrandCheck::new(
                self.client_brand_regex.clone(),
            )));
        }
        checks
    }

    /// Forwards one inbound event to the named session. Returns the final decision once the
    /// session reaches a terminal state, `None` while still verifying.
    pub async fn on_inbound_event(&self, session_id: Uuid, event: InboundEvent) -> Option<AdmissionDecision> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(&session_id) else {
            return None;
        };

        session.on_event(&event, now);
        if !session.is_terminal() {
            return None;
        }

        let source = session.source;
        let state = session.state();
        let fail_reason = session.fail_reason();
        session.cleanup();
        sessions.remove(&session_id);
        drop(sessions);

        self.conclude_session(source, state, fail_reason).await
    }

    /// Marks a session closed because its connection dropped. No reputation consequence.
    pub async fn on_client_close(&self, session_id: Uuid) {
        let mut sessions = self.sessions.lock().await;
        if let Some(mut session) = sessions.remove(&session_id) {
            session.close();
            session.cleanup();
            self.decrement_ip_count(session.source).await;
        }
    }

    async fn conclude_session(
        &self,
        source: SourceAddress,
        state: SessionState,
        fail_reason: Option<Reason>,
    ) -> Option<AdmissionDecision> {
        match state {
            SessionState::Passed => {
                self.decrement_ip_count(source).await;
                Some(AdmissionDecision::Admit)
            }
            SessionState::Failed => {
                self.decrement_ip_count(source).await;
                if fail_reason != Some(Reason::ClientClosed) {
                    self.reputation.lock().await.record_failure(source, Instant::now());
                }
                Some(AdmissionDecision::hard_deny(fail_reason.unwrap_or(Reason::Internal)))
            }
            SessionState::Closed => {
                self.decrement_ip_count(source).await;
                Some(AdmissionDecision::hard_deny(Reason::ClientClosed))
            }
            SessionState::Init | SessionState::Verifying => None,
        }
    }

    async fn decrement_ip_count(&self, source: SourceAddress) {
        let mut counts = self.online_per_ip.lock().await;
        if let Some(count) = counts.get_mut(&source) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(&source);
            }
        }
    }

    /// One-second periodic worker: rotates the attack detector and drains the admission queue,
    /// re-entering each resumed handshake at step 6.
    pub async fn tick_one_second(&self) -> Vec<AdmissionOutcome> {
        let now = Instant::now();
        self.attack_detector.tick(now);

        let resumed = self.queue.lock().await.drain();
        let mut outcomes = Vec::with_capacity(resumed.len());
        for handshake in resumed {
            if self.config.force_rejoin {
                self.rejoin
                    .lock()
                    .await
                    .issue(&handshake.username, handshake.source, now);
                outcomes.push(AdmissionOutcome::Decision(AdmissionDecision::soft_deny(
                    Reason::PleaseReconnect,
                    true,
                )));
                continue;
            }
            outcomes.push(self.start_verification(handshake, now).await);
        }
        outcomes
    }

    /// Thirty-second periodic worker: sweeps the reputation and rejoin caches and terminates
    /// verification sessions that have outlived `remember_time`.
    pub async fn tick_thirty_seconds(&self) -> Vec<(Uuid, AdmissionDecision)> {
        let now = Instant::now();
        self.reputation.lock().await.sweep(now);
        self.rejoin.lock().await.sweep(now);

        let remember = Duration::from_secs(self.config.session.remember_time_secs);
        let mut stale = Vec::new();
        {
            let mut sessions = self.sessions.lock().await;
            sessions.retain(|id, session| {
                if now.saturating_duration_since(session.created_at) > remember {
                    session.mark_stale();
                    session.cleanup();
                    stale.push((*id, session.source));
                    false
                } else {
                    true
                }
            });
        }

        let mut decisions = Vec::with_capacity(stale.len());
        for (id, source) in stale {
            self.decrement_ip_count(source).await;
            self.reputation.lock().await.record_failure(source, now);
            decisions.push((id, AdmissionDecision::hard_deny(Reason::Stale)));
        }
        decisions
    }

    /// Enforces each live session's `verification_deadline`, independent of the thirty-second
    /// sweep's coarser `remember_time`.
    pub async fn check_session_deadlines(&self) -> Vec<(Uuid, AdmissionDecision)> {
        let now = Instant::now();
        let mut terminated = Vec::new();
        {
            let mut sessions = self.sessions.lock().await;
            let ids: Vec<Uuid> = sessions.keys().copied().collect();
            for id in ids {
                let session = sessions.get_mut(&id).unwrap();
                session.check_deadline(now);
                if session.is_terminal() {
                    let source = session.source;
                    let fail_reason = session.fail_reason();
                    session.cleanup();
                    sessions.remove(&id);
                    terminated.push((id, source, fail_reason));
                }
            }
        }

        let mut decisions = Vec::with_capacity(terminated.len());
        for (id, source, fail_reason) in terminated {
            self.decrement_ip_count(source).await;
            self.reputation.lock().await.record_failure(source, now);
            decisions.push((id, AdmissionDecision::hard_deny(fail_reason.unwrap_or(Reason::Timeout))));
        }
        decisions
    }

    // -- metrics accessors (see the ambient metrics section: no exporter, just plain reads) --

    pub async fn queue_depth(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub fn attack_mode(&self) -> AttackMode {
        self.attack_detector.mode()
    }

    pub async fn reputation_size(&self) -> usize {
        self.reputation.lock().await.len()
    }

    pub async fn rejoin_size(&self) -> usize {
        self.rejoin.lock().await.len()
    }

    pub async fn captcha_pool_size(&self) -> usize {
        self.captcha_pool.lock().await.len()
    }

    pub async fn live_session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
