pub mod checks;

use checks::CheckInstance;
use gatekeeper_packets::{CheckOutcome, InboundEvent, OutboundPacket, Reason, SourceAddress};
use tokio::time::{Duration, Instant};
use uuid::Uuid;

/// Lifecycle state of a [`VerificationSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Verifying,
    Passed,
    Failed,
    Closed,
}

/// Per-status bookkeeping for one attached check, tracked by the session rather than inside the
/// check itself so the session can decide when every check has reached `Pass` without asking
/// each one to remember its own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Pending,
    Passed,
}

/// One accepted handshake under verification: a fixed set of [`CheckInstance`]s driven by
/// inbound events until every one of them passes, one fails, or the session's deadline elapses.
#[derive(Debug)]
pub struct VerificationSession {
    pub id: Uuid,
    pub username: String,
    pub source: SourceAddress,
    pub created_at: Instant,
    state: SessionState,
    checks: Vec<CheckInstance>,
    statuses: Vec<CheckStatus>,
    fail_reason: Option<Reason>,
    verification_deadline: Duration,
}

impl VerificationSession {
    /// Attaches `checks` in order and runs `initialize` on each, collecting the packets they
    /// want sent immediately. A check that resolves itself outright during initialization (the
    /// CAPTCHA check, when the pool is empty) is recorded as already-passed.
    pub fn new(
        username: impl Into<String>,
        source: SourceAddress,
        checks: Vec<CheckInstance>,
        verification_deadline: Duration,
        now: Instant,
    ) -> (Self, Vec<OutboundPacket>) {
        let mut outbound = Vec::new();
        let mut statuses = Vec::with_capacity(checks.len());
        let mut checks = checks;
        for check in &mut checks {
            let (packets, outcome) = check.initialize();
            outbound.extend(packets);
            statuses.push(match outcome {
                CheckOutcome::Pass => CheckStatus::Passed,
                _ => CheckStatus::Pending,
            });
        }

        let session = Self {
            id: Uuid::new_v4(),
            username: username.into(),
            source,
            created_at: now,
            state: SessionState::Verifying,
            checks,
            statuses,
            fail_reason: None,
            verification_deadline,
        };

        (session, outbound)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn fail_reason(&self) -> Option<Reason> {
        self.fail_reason
    }

    fn all_passed(&self) -> bool {
        self.statuses.iter().all(|s| *s == CheckStatus::Passed)
    }

    fn fail(&mut self, reason: Reason) {
        self.state = SessionState::Failed;
        self.fail_reason = Some(reason);
    }

    /// Dispatches one inbound event to every still-pending check, in attachment order. The
    /// session transitions to `Failed` on the first `Fail` and stops evaluating remaining
    /// checks for this event; it transitions to `Passed` once every check has reached `Pass`.
    #[tracing::instrument(skip(self, event), fields(session_id = %self.id))]
    pub fn on_event(&mut self, event: &InboundEvent, now: Instant) {
        if self.state != SessionState::Verifying {
            return;
        }

        for (check, status) in self.checks.iter_mut().zip(self.statuses.iter_mut()) {
            if *status == CheckStatus::Passed {
                continue;
            }

            match check.on_event(event, now) {
                CheckOutcome::Pass => *status = CheckStatus::Passed,
                CheckOutcome::Fail(reason) => {
                    self.state = SessionState::Failed;
                    self.fail_reason = Some(reason);
                    tracing::info!(reason = reason.as_str(), "verification session failed");
                    return;
                }
                CheckOutcome::Pending => {}
            }
        }

        if self.state != SessionState::Verifying {
            return;
        }
        self.finalize_last_pending();

        if self.state == SessionState::Verifying && self.all_passed() {
            self.state = SessionState::Passed;
            tracing::info!("verification session passed");
        }
    }

    /// Gives the sole remaining pending check a chance at a verdict from its own accumulated
    /// state, now that every other check has already passed. A check like [`checks::CollisionCheck`]
    /// needs this: it cannot tell from events alone whether the player has *finished* moving, only
    /// whether it has not yet violated a rule, so its real verdict only makes sense once nothing
    /// else is still waiting on further events.
    fn finalize_last_pending(&mut self) {
        let mut pending = self
            .statuses
            .iter()
            .enumerate()
            .filter(|(_, status)| **status == CheckStatus::Pending)
            .map(|(index, _)| index);

        let (Some(index), None) = (pending.next(), pending.next()) else {
            return;
        };

        match self.checks[index].finalize() {
            CheckOutcome::Pass => self.statuses[index] = CheckStatus::Passed,
            CheckOutcome::Fail(reason) => {
                self.fail(reason);
                tracing::info!(reason = reason.as_str(), "verification session failed");
            }
            CheckOutcome::Pending => {}
        }
    }

    /// Applies the session deadline. Any check still pending gets one last chance via
    /// `finalize` to supply a verdict — a pass if it was already settled, a specific failure
    /// reason, or nothing — before the session falls back to the generic `"timeout"` reason.
    pub fn check_deadline(&mut self, now: Instant) {
        if self.state != SessionState::Verifying {
            return;
        }
        if now.saturating_duration_since(self.created_at) <= self.verification_deadline {
            return;
        }

        for (check, status) in self.checks.iter().zip(self.statuses.iter_mut()) {
            if *status != CheckStatus::Pending {
                continue;
            }
            match check.finalize() {
                CheckOutcome::Pass => *status = CheckStatus::Passed,
                CheckOutcome::Fail(reason) => {
                    self.fail(reason);
                    return;
                }
                CheckOutcome::Pending => {}
            }
        }

        if self.all_passed() {
            self.state = SessionState::Passed;
            tracing::info!("verification session passed at deadline");
            return;
        }

        self.fail(Reason::Timeout);
    }

    /// Marks the session failed because the underlying connection closed; no reputation
    /// consequence follows from this path.
    pub fn close(&mut self) {
        if self.state == SessionState::Verifying {
            self.state = SessionState::Closed;
            self.fail_reason = Some(Reason::ClientClosed);
        }
    }

    /// Marks the session failed for having outlived `remember_time`, run by the 30-second sweep.
    pub fn mark_stale(&mut self) {
        if self.state == SessionState::Verifying {
            self.fail(Reason::Stale);
        }
    }

    /// Releases every check's resources; invoked exactly once per session on any terminal
    /// transition.
    pub fn cleanup(&mut self) {
        for check in &mut self.checks {
            check.reset();
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            SessionState::Passed | SessionState::Failed | SessionState::Closed
        )
    }
}
