/// An inbound packet, translated by the protocol layer into one of the event classes the
/// verification checks understand. The core dispatches each event to every attached check
/// whose type accepts that event class (see `gatekeeper_core::session::checks`).
#[derive(Debug, Clone)]
pub enum InboundEvent {
    PlayerPosition {
        x: f64,
        y: f64,
        z: f64,
        on_ground: bool,
        has_rotation: bool,
    },
    TeleportConfirm {
        id: i32,
    },
    VehicleMove {
        x: f64,
        y: f64,
        z: f64,
    },
    ChatLine {
        text: String,
    },
    PluginMessageBrand {
        brand: String,
    },
}
