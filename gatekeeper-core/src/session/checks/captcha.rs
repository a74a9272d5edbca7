use gatekeeper_captcha::CaptchaArtifact;
use gatekeeper_packets::{CheckOutcome, InboundEvent, OutboundPacket, Reason};
use tokio::time::{Duration, Instant};

/// Presents a pre-rendered map-item CAPTCHA and checks the player's chat response against it.
///
/// If the pool had no artifact to hand out when this check was attached, it is skipped outright
/// (see [`CaptchaCheck::new`]) rather than punishing a legitimate client for a resource-starvation
/// condition on the proxy's side.
#[derive(Debug)]
pub struct CaptchaCheck {
    artifact: Option<CaptchaArtifact>,
    remaining_tries: u32,
    max_duration: Duration,
    started_at: Instant,
}

impl CaptchaCheck {
    pub fn new(artifact: Option<CaptchaArtifact>, max_tries: u32, max_duration: Duration, now: Instant) -> Self {
        if artifact.is_none() {
            tracing::warn!("captcha pool exhausted, skipping check for this session");
        }
        Self {
            artifact,
            remaining_tries: max_tries,
            max_duration,
            started_at: now,
        }
    }

    /// Packets to send, plus the outcome the session should record immediately: `Pending` when a
    /// challenge was handed out, `Pass` when the check was skipped for pool exhaustion.
    pub fn initialize(&mut self) -> (Vec<OutboundPacket>, CheckOutcome) {
        match &self.artifact {
            Some(artifact) => (
                vec![OutboundPacket::MapImage {
                    map_id: artifact.id as i32,
                    palette: artifact.image_bytes.clone(),
                }],
                CheckOutcome::Pending,
            ),
            None => (Vec::new(), CheckOutcome::Pass),
        }
    }

    pub fn on_event(&mut self, event: &InboundEvent, now: Instant) -> CheckOutcome {
        let Some(artifact) = &self.artifact else {
            return CheckOutcome::Pass;
        };
        let InboundEvent::ChatLine { text } = event else {
            return CheckOutcome::Pending;
        };

        if now.saturating_duration_since(self.started_at) > self.max_duration {
            return CheckOutcome::Fail(Reason::CaptchaTimeout);
        }
        if self.remaining_tries == 0 {
            return CheckOutcome::Fail(Reason::CaptchaNoTries);
        }

        if text.eq_ignore_ascii_case(&artifact.answer) {
            return CheckOutcome::Pass;
        }

        self.remaining_tries -= 1;
        if self.remaining_tries == 0 {
            CheckOutcome::Fail(Reason::CaptchaFailed)
        } else {
            CheckOutcome::Pending
        }
    }

    pub fn reset(&mut self) {
        self.artifact = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(answer: &str) -> CaptchaArtifact {
        CaptchaArtifact {
            id: 1,
            answer: answer.to_string(),
            image_bytes: vec![29; 16384],
        }
    }

    fn chat(text: &str) -> InboundEvent {
        InboundEvent::ChatLine { text: text.to_string() }
    }

    #[tokio::test]
    async fn correct_answer_passes_case_insensitively() {
        tokio::time::pause();
        let mut check = CaptchaCheck::new(Some(artifact("CAB")), 3, Duration::from_secs(60), Instant::now());
        let outcome = check.on_event(&chat("cab"), Instant::now());
        assert_eq!(outcome, CheckOutcome::Pass);
    }

    #[tokio::test]
    async fn wrong_answer_consumes_a_try_then_eventually_fails() {
        tokio::time::pause();
        let mut check = CaptchaCheck::new(Some(artifact("CAB")), 2, Duration::from_secs(60), Instant::now());
        assert_eq!(check.on_event(&chat("cat"), Instant::now()), CheckOutcome::Pending);
        assert_eq!(
            check.on_event(&chat("cat"), Instant::now()),
            CheckOutcome::Fail(Reason::CaptchaFailed)
        );
    }

    #[tokio::test]
    async fn timeout_fails_even_with_tries_remaining() {
        tokio::time::pause();
        let start = Instant::now();
        let mut check = CaptchaCheck::new(Some(artifact("CAB")), 3, Duration::from_secs(60), start);
        tokio::time::advance(Duration::from_secs(61)).await;
        let outcome = check.on_event(&chat("cab"), Instant::now());
        assert_eq!(outcome, CheckOutcome::Fail(Reason::CaptchaTimeout));
    }

    #[tokio::test]
    async fn empty_pool_skips_the_check_immediately() {
        tokio::time::pause();
        let mut check = CaptchaCheck::new(None, 3, Duration::from_secs(60), Instant::now());
        let (packets, outcome) = check.initialize();
        assert!(packets.is_empty());
        assert_eq!(outcome, CheckOutcome::Pass);
    }
}
