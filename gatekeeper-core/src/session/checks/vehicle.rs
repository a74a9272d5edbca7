use gatekeeper_packets::{CheckOutcome, InboundEvent, OutboundPacket, Reason};
use tokio::time::Instant;

/// Maximum lateral drift, per tick, tolerated for a non-interacting passenger.
const MAX_DRIFT: f64 = 0.1;

/// Asserts that a player placed in a vehicle produces movement packets consistent with a
/// passive passenger: small lateral drift, no teleports, for a fixed number of consecutive
/// ticks.
#[derive(Debug)]
pub struct VehicleCheck {
    required_conforming_ticks: u32,
    conforming_ticks: u32,
    last_position: Option<(f64, f64, f64)>,
}

impl VehicleCheck {
    pub fn new(required_conforming_ticks: u32) -> Self {
        Self {
            required_conforming_ticks,
            conforming_ticks: 0,
            last_position: None,
        }
    }

    pub fn initialize(&mut self) -> Vec<OutboundPacket> {
        Vec::new()
    }

    pub fn on_event(&mut self, event: &InboundEvent, _now: Instant) -> CheckOutcome {
        let InboundEvent::VehicleMove { x, y, z } = event else {
            return CheckOutcome::Pending;
        };

        let Some((lx, ly, lz)) = self.last_position else {
            self.last_position = Some((*x, *y, *z));
            return CheckOutcome::Pending;
        };

        let drift = ((x - lx).powi(2) + (y - ly).powi(2) + (z - lz).powi(2)).sqrt();
        self.last_position = Some((*x, *y, *z));

        if drift > MAX_DRIFT {
            return CheckOutcome::Fail(Reason::VehicleAnomaly);
        }

        self.conforming_ticks += 1;
        if self.conforming_ticks >= self.required_conforming_ticks {
            CheckOutcome::Pass
        } else {
            CheckOutcome::Pending
        }
    }

    pub fn reset(&mut self) {}
}
