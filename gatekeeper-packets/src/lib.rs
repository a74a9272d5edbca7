//! Data types shared between the admission/verification core and whatever protocol layer
//! embeds it. Nothing in this crate knows about Minecraft's wire format — packet framing,
//! packet IDs and per-version codecs are the protocol layer's concern (see the crate's
//! top-level documentation for the scope boundary).

pub mod decision;
pub mod event;
pub mod handshake;
pub mod outbound;

pub use decision::{AdmissionDecision, Reason};
pub use event::InboundEvent;
pub use handshake::{Handshake, SourceAddress};
pub use outbound::OutboundPacket;

/// The outcome of driving a single [`crate::event::InboundEvent`] through one verification check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The check has not yet reached a verdict; more inbound events are needed.
    Pending,
    /// The check is satisfied.
    Pass,
    /// The check is permanently dissatisfied; the session fails with this reason.
    Fail(Reason),
}
