use gatekeeper_packets::{CheckOutcome, InboundEvent, OutboundPacket, Reason};
use tokio::time::Instant;

/// Fixed Y-level of the isolated platform every check spawns a player onto.
const PLATFORM_Y: i32 = 64;
const LANDING_TOLERANCE: f64 = 0.1;

/// Cumulative predicted fall distance for ticks 1..=20, derived from the recurrence
/// `v <- (v - 0.08) * 0.98`, `v0 = 0`. `table()[k]` is the expected `y` delta after `k + 1`
/// ticks of unobstructed falling.
const fn predicted_y_delta_table() -> [f64; 20] {
    let mut table = [0.0; 20];
    let mut velocity = 0.0;
    let mut cumulative = 0.0;
    let mut i = 0;
    while i < 20 {
        velocity = (velocity - 0.08) * 0.98;
        cumulative += velocity;
        table[i] = cumulative;
        i += 1;
    }
    table
}

const PREDICTED_Y_DELTA: [f64; 20] = predicted_y_delta_table();

/// Asserts that a player's vertical motion after being teleported onto an isolated platform
/// follows vanilla gravity, to the tick.
#[derive(Debug)]
pub struct GravityCheck {
    max_movement_ticks: u32,
    teleported: bool,
    can_fall: bool,
    ticks: u32,
    last_y: f64,
    last_on_ground: bool,
}

impl GravityCheck {
    pub fn new(max_movement_ticks: u32) -> Self {
        Self {
            max_movement_ticks,
            teleported: false,
            can_fall: false,
            ticks: 0,
            last_y: (PLATFORM_Y + 10) as f64,
            last_on_ground: false,
        }
    }

    pub fn initialize(&mut self) -> Vec<OutboundPacket> {
        let initial_y = (PLATFORM_Y + 10) as f64;
        self.last_y = initial_y;
        vec![
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
        ]
    }

    pub fn on_event(&mut self, event: &InboundEvent, _now: Instant) -> CheckOutcome {
        let InboundEvent::PlayerPosition { y, on_ground, .. } = event else {
            return CheckOutcome::Pending;
        };
        let outcome = self.handle_position(*y, *on_ground);
        self.last_y = *y;
        self.last_on_ground = *on_ground;
        outcome
    }

    fn handle_position(&mut self, y: f64, on_ground: bool) -> CheckOutcome {
        if !self.teleported {
            self.teleported = true;
            self.can_fall = true;
            return CheckOutcome::Pending;
        }

        if self.last_on_ground && !on_ground {
            return CheckOutcome::Fail(Reason::IllegalGroundTransition);
        }

        if on_ground {
            return if (y - (PLATFORM_Y as f64 + 1.0)).abs() <= LANDING_TOLERANCE {
                CheckOutcome::Pass
            } else {
                CheckOutcome::Fail(Reason::WrongLandingHeight)
            };
        }

        self.ticks += 1;
        if self.ticks > self.max_movement_ticks {
            return CheckOutcome::Fail(Reason::ExceededFallTicks);
        }

        if self.ticks as usize <= PREDICTED_Y_DELTA.len() {
            let expected = self.last_y + PREDICTED_Y_DELTA[self.ticks as usize - 1];
            if (y - expected).abs() > LANDING_TOLERANCE {
                return CheckOutcome::Fail(Reason::UnexpectedYMotion);
            }
        }

        CheckOutcome::Pending
    }

    pub fn reset(&mut self) {}
}
