pub mod captcha;
pub mod client_brand;
pub mod collision;
pub mod gravity;
pub mod vehicle;

pub use captcha::CaptchaCheck;
pub use client_brand::ClientBrandCheck;
pub use collision::CollisionCheck;
pub use gravity::GravityCheck;
pub use vehicle::VehicleCheck;

use gatekeeper_packets::{CheckOutcome, InboundEvent, OutboundPacket};
use tokio::time::Instant;

/// The closed set of verification probes a session can be composed from.
///
/// Each variant owns its state directly rather than through a shared string-keyed scratchpad:
/// the tagged-variant dispatch this core uses makes a generic scratchpad redundant, and typed
/// fields rule out the key-collision class of bug a shared map would otherwise risk.
#[derive(Debug)]
pub enum CheckInstance {
    Gravity(GravityCheck),
    Collision(CollisionCheck),
    Vehicle(VehicleCheck),
    Captcha(CaptchaCheck),
    ClientBrand(ClientBrandCheck),
}

impl CheckInstance {
    /// Packets to send immediately after attaching this check, plus the outcome the session
    /// should record before any event has been dispatched (`Pending`, except for a check that
    /// can resolve itself outright, like a CAPTCHA check skipped for pool exhaustion).
    pub fn initialize(&mut self) -> (Vec<OutboundPacket>, CheckOutcome) {
        match self {
            Self::Gravity(c) => (c.initialize(), CheckOutcome::Pending),
            Self::Collision(c) => (c.initialize(), CheckOutcome::Pending),
            Self::Vehicle(c) => (c.initialize(), CheckOutcome::Pending),
            Self::ClientBrand(c) => (c.initialize(), CheckOutcome::Pending),
            Self::Captcha(c) => c.initialize(),
        }
    }

    pub fn on_event(&mut self, event: &InboundEvent, now: Instant) -> CheckOutcome {
        match self {
            Self::Gravity(c) => c.on_event(event, now),
            Self::Collision(c) => c.on_event(event, now),
            Self::Vehicle(c) => c.on_event(event, now),
            Self::Captcha(c) => c.on_event(event, now),
            Self::ClientBrand(c) => c.on_event(event, now),
        }
    }

    /// A second opportunity for a check to report a verdict that depends on accumulated state
    /// rather than the event that was just dispatched. Called by the session only once this
    /// check is the sole one still `Pending` (every other check has already passed) or at the
    /// session deadline; only [`CollisionCheck`] uses it today, to confirm the player has
    /// actually settled on the ground rather than merely never having violated a transition
    /// rule mid-flight.
    pub fn finalize(&self) -> CheckOutcome {
        match self {
            Self::Collision(c) => c.on_verify(),
            _ => CheckOutcome::Pending,
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Gravity(c) => c.reset(),
            Self::Collision(c) => c.reset(),
            Self::Vehicle(c) => c.reset(),
            Self::Captcha(c) => c.reset(),
            Self::ClientBrand(c) => c.reset(),
        }
    }
}
