use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlayerConfig {
    /// Seconds an empty, inactive session waits before destroying itself.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Volume a freshly created session starts with, in percent (1..=100).
    #[serde(default = "default_volume_percent")]
    pub default_volume_percent: u8,
}

impl PlayerConfig {
    pub fn idle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.idle_timeout_secs)
    }

    /// Starting volume as a fraction in [0.01, 1.00].
    pub fn default_volume(&self) -> f32 {
        f32::from(self.default_volume_percent.clamp(1, 100)) / 100.0
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            default_volume_percent: default_volume_percent(),
        }
    }
}

fn default_idle_timeout_secs() -> u64 {
    300
}

fn default_volume_percent() -> u8 {
    50
}
