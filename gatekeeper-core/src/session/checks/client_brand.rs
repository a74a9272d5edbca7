use gatekeeper_packets::{CheckOutcome, InboundEvent, OutboundPacket, Reason};
use regex::Regex;
use tokio::time::Instant;

/// Validates the client-brand plugin message against a configured pattern. Vanilla and every
/// well-behaved mod loader send exactly one of these early in configuration; never receiving
/// one is handled by the session's overall deadline, not by this check.
#[derive(Debug)]
pub struct ClientBrandCheck {
    valid_brand: Regex,
}

impl ClientBrandCheck {
    pub fn new(valid_brand: Regex) -> Self {
        Self { valid_brand }
    }

    pub fn initialize(&mut self) -> Vec<OutboundPacket> {
        Vec::new()
    }

    pub fn on_event(&mut self, event: &InboundEvent, _now: Instant) -> CheckOutcome {
        let InboundEvent::PluginMessageBrand { brand } = event else {
            return CheckOutcome::Pending;
        };

        if self.valid_brand.is_match(brand) {
            CheckOutcome::Pass
        } else {
            CheckOutcome::Fail(Reason::InvalidBrand)
        }
    }

    pub fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand_check() -> ClientBrandCheck {
        ClientBrandCheck::new(Regex::new(r"^[\w\-. ]{1,64}$").unwrap())
    }

    #[test]
    fn accepts_a_conventional_brand() {
        let mut check = brand_check();
        let outcome = check.on_event(
            &InboundEvent::PluginMessageBrand { brand: "vanilla".into() },
            Instant::now(),
        );
        assert_eq!(outcome, CheckOutcome::Pass);
    }

    #[test]
    fn rejects_a_brand_with_control_characters() {
        let mut check = brand_check();
        let outcome = check.on_event(
            &InboundEvent::PluginMessageBrand {
                brand: "bot\u{0000}net".into(),
            },
            Instant::now(),
        );
        assert_eq!(outcome, CheckOutcome::Fail(Reason::InvalidBrand));
    }

    #[test]
    fn ignores_unrelated_events() {
        let mut check = brand_check();
        let outcome = check.on_event(&InboundEvent::ChatLine { text: "hi".into() }, Instant::now());
        assert_eq!(outcome, CheckOutcome::Pending);
    }
}
