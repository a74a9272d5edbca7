use crate::Reason;

/// An opaque outbound instruction emitted by the core. The protocol layer serialises each
/// variant into the wire packet appropriate for the connected client's protocol version;
/// that mapping is entirely the protocol layer's concern (see the crate-level scope note).
#[derive(Debug, Clone)]
pub enum OutboundPacket {
    /// Disconnect the client, citing a stable reason key from [`Reason`].
    DisconnectWith { reason: Reason },
    /// Keep the connection open and show an informational actionbar message; never a disconnect.
    HoldOpenWithActionbar { message_key: &'static str },
    JoinWorld { entity_id: i32, gamemode: u8 },
    SpawnPosition { x: i32, y: i32, z: i32 },
    TeleportAbsolute { x: f64, y: f64, z: f64, teleport_id: i32 },
    BlockUpdate { x: i32, y: i32, z: i32, block_id: u32 },
    /// A rendered map item; `palette` is always 16384 (128×128) Minecraft map-color indices.
    MapImage { map_id: i32, palette: Vec<u8> },
}
