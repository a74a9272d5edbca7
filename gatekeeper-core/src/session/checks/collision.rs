use gatekeeper_packets::{CheckOutcome, InboundEvent, OutboundPacket, Reason};
use tokio::time::Instant;

const PLATFORM_Y: i32 = 64;
const LANDING_TOLERANCE: f64 = 0.1;
const BLOCK_ID: u32 = 1;

/// Asserts that a player's reported position is consistent with a solid 5x5 platform, both
/// while standing on it and while falling past its edge.
#[derive(Debug)]
pub struct CollisionCheck {
    teleported: bool,
    on_ground: bool,
}

impl CollisionCheck {
    pub fn new() -> Self {
        Self {
            teleported: false,
            on_ground: false,
        }
    }

    pub fn initialize(&mut self) -> Vec<OutboundPacket> {
        let initial_y = (PLATFORM_Y + 5) as f64;
        let mut packets = vec![
            OutboundPacket::JoinWorld {
                entity_id: 0,
                gamemode: 0,
            },
            OutboundPacket::SpawnPosition {
                x: 0,
                y: PLATFORM_Y,
                z: 0,
            },
            OutboundPacket::TeleportAbsolute {
                x: 0.0,
                y: initial_y,
                z: 0.0,
                teleport_id: 0,
            },
        ];
        for x in -2..=2 {
            for z in -2..=2 {
                packets.push(OutboundPacket::BlockUpdate {
                    x,
                    y: PLATFORM_Y,
                    z,
                    block_id: BLOCK_ID,
                });
            }
        }
        packets
    }

    pub fn on_event(&mut self, event: &InboundEvent, _now: Instant) -> CheckOutcome {
        let InboundEvent::PlayerPosition { y, on_ground, .. } = event else {
            return CheckOutcome::Pending;
        };

        if !self.teleported {
            self.teleported = true;
            self.on_ground = *on_ground;
            return CheckOutcome::Pending;
        }

        self.on_ground = *on_ground;

        if *on_ground {
            if (*y - (PLATFORM_Y as f64 + 1.0)).abs() > LANDING_TOLERANCE {
                return CheckOutcome::Fail(Reason::CollisionWrongY);
            }
        } else if *y < PLATFORM_Y as f64 {
            return CheckOutcome::Fail(Reason::BelowPlatformNotOnGround);
        }

        CheckOutcome::Pending
    }

    /// Final verdict, invoked by the session once every other check has reached `Pass` and this
    /// one is still `Pending`: the player must be settled on the platform.
    pub fn on_verify(&self) -> CheckOutcome {
        if self.on_ground {
            CheckOutcome::Pass
        } else {
            CheckOutcome::Fail(Reason::NotOnGround)
        }
    }

    pub fn reset(&mut self) {}
}
