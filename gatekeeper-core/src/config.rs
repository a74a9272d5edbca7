//! Typed configuration for the admission core, one struct per component so each sits next to the
//! code it configures. [`AdmissionConfig`] aggregates all of them for the composition root, the
//! same way the proxy aggregates its per-adapter configuration under a single top-level `Config`.

use serde::Deserialize;

/// Top-level configuration for the admission core, loaded via a layered `config::Config`
/// (defaults → file → environment) at the composition root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Master switch; when `false` the composition root's `enable()` refuses to start.
    pub enabled: bool,
    pub max_online_per_ip: u32,
    pub valid_name_regex: String,
    pub valid_locale_regex: String,
    pub force_rejoin: bool,
    pub attack_detector: AttackDetectorConfig,
    pub queue: QueueConfig,
    pub reputation: ReputationConfig,
    pub rejoin: RejoinConfig,
    pub session: SessionConfig,
    pub gravity: GravityConfig,
    pub collision: CollisionConfig,
    pub vehicle: VehicleConfig,
    pub client_brand: ClientBrandConfig,
    pub map_captcha: CaptchaConfig,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_online_per_ip: 3,
            valid_name_regex: "^[A-Za-z0-9_]{3,16}$".to_string(),
            valid_locale_regex: "^[a-z]{2}_[a-z]{2}$".to_string(),
            force_rejoin: false,
            attack_detector: AttackDetectorConfig::default(),
            queue: QueueConfig::default(),
            reputation: ReputationConfig::default(),
            rejoin: RejoinConfig::default(),
            session: SessionConfig::default(),
            gravity: GravityConfig::default(),
            collision: CollisionConfig::default(),
            vehicle: VehicleConfig::default(),
            client_brand: ClientBrandConfig::default(),
            map_captcha: CaptchaConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AttackDetectorConfig {
    pub min_players_for_attack: u32,
    pub min_attack_duration_secs: u64,
}

impl Default for AttackDetectorConfig {
    fn default() -> Self {
        Self {
            min_players_for_attack: 100,
            min_attack_duration_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub max_polls: u32,
    pub rejoin_delay_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_polls: 10,
            rejoin_delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    pub blacklist_threshold: u32,
    pub blacklist_time_secs: u64,
    pub remember_time_secs: u64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            blacklist_threshold: 3,
            blacklist_time_secs: 600,
            remember_time_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RejoinConfig {
    pub rejoin_valid_time_secs: u64,
}

impl Default for RejoinConfig {
    fn default() -> Self {
        Self {
            rejoin_valid_time_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub verification_deadline_secs: u64,
    pub remember_time_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verification_deadline_secs: 20,
            remember_time_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    pub enabled: bool,
    pub max_movement_ticks: u32,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_movement_ticks: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub enabled: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub enabled: bool,
    pub required_conforming_ticks: u32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            required_conforming_ticks: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientBrandConfig {
    pub enabled: bool,
    pub valid_brand_regex: String,
}

impl Default for ClientBrandConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            valid_brand_regex: "^[\\w\\-. ]{1,64}$".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    pub enabled: bool,
    pub alphabet: String,
    pub code_length: usize,
    pub precompute: usize,
    pub max_tries: u32,
    pub max_duration_secs: u64,
    pub background_path: Option<String>,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alphabet: "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".to_string(),
            code_length: 5,
            precompute: 32,
            max_tries: 3,
            max_duration_secs: 60,
            background_path: None,
        }
    }
}
