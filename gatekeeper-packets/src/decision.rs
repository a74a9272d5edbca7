/// Stable reason keys for every denial and terminal outcome the core can produce.
///
/// These are not exceptions: they are values, returned from [`AdmissionDecision`] and
/// [`crate::CheckOutcome::Fail`] alike. The protocol layer maps a `Reason` to a localised
/// message; the core never localises anything itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    // admission-phase
    InvalidName,
    IpLimit,
    Blacklisted,
    WaitBeforeReconnecting,
    PleaseReconnect,
    // verification-phase
    IllegalGroundTransition,
    WrongLandingHeight,
    ExceededFallTicks,
    UnexpectedYMotion,
    CollisionWrongY,
    BelowPlatformNotOnGround,
    NotOnGround,
    VehicleAnomaly,
    InvalidBrand,
    CaptchaTimeout,
    CaptchaNoTries,
    CaptchaFailed,
    // lifecycle
    Timeout,
    Stale,
    ClientClosed,
    /// A check raised an unexpected internal error (missing scratchpad entry, etc.); never
    /// propagated as a panic, always downgraded to this reason instead.
    Internal,
}

impl Reason {
    /// The stable identifier used in logs and handed to the protocol layer, e.g. `"invalid_name"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Reason::InvalidName => "invalid_name",
            Reason::IpLimit => "ip_limit",
            Reason::Blacklisted => "blacklisted",
            Reason::WaitBeforeReconnecting => "wait_before_reconnecting",
            Reason::PleaseReconnect => "please_reconnect",
            Reason::IllegalGroundTransition => "illegal_ground_transition",
            Reason::WrongLandingHeight => "wrong_landing_height",
            Reason::ExceededFallTicks => "exceeded_fall_ticks",
            Reason::UnexpectedYMotion => "unexpected_y_motion",
            Reason::CollisionWrongY => "collision_wrong_y",
            Reason::BelowPlatformNotOnGround => "below_platform_not_on_ground",
            Reason::NotOnGround => "not_on_ground",
            Reason::VehicleAnomaly => "vehicle_anomaly",
            Reason::InvalidBrand => "invalid_brand",
            Reason::CaptchaTimeout => "captcha_timeout",
            Reason::CaptchaNoTries => "captcha_no_tries",
            Reason::CaptchaFailed => "captcha_failed",
            Reason::Timeout => "timeout",
            Reason::Stale => "stale",
            Reason::ClientClosed => "client_closed",
            Reason::Internal => "internal",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The verdict the admission controller reaches for a single handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The connection may proceed to downstream session setup.
    Admit,
    /// The handshake was suspended in the admission queue; the protocol layer must keep the
    /// connection open and not disconnect it.
    Queue,
    /// A recoverable denial; `allow_rejoin` tells the protocol layer whether the client is
    /// expected (and permitted) to reconnect.
    SoftDeny { reason: Reason, allow_rejoin: bool },
    /// A terminal denial; the protocol layer should disconnect with `reason`.
    HardDeny { reason: Reason },
}

impl AdmissionDecision {
    pub fn soft_deny(reason: Reason, allow_rejoin: bool) -> Self {
        Self::SoftDeny {
            reason,
            allow_rejoin,
        }
    }

    pub fn hard_deny(reason: Reason) -> Self {
        Self::HardDeny { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_keys_are_stable() {
        assert_eq!(Reason::InvalidName.as_str(), "invalid_name");
        assert_eq!(Reason::Blacklisted.as_str(), "blacklisted");
        assert_eq!(Reason::CaptchaFailed.as_str(), "captcha_failed");
        assert_eq!(Reason::ClientClosed.as_str(), "client_closed");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Reason::Stale.to_string(), Reason::Stale.as_str());
    }
}
