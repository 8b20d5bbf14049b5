//! Service settings for SoundFlow
//!
//! This module handles the tunables stored in settings.json.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Paths;
use crate::utils::auth::generate_random_string;

/// Settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Secret used to sign local session tokens
    #[serde(default)]
    pub server_secret: String,

    /// Simulated latency of local list reads
    #[serde(default = "default_list_latency_ms")]
    pub list_latency_ms: u64,

    /// Simulated latency of local uploads
    #[serde(default = "default_upload_latency_ms")]
    pub upload_latency_ms: u64,

    /// Simulated latency of local sign-in
    #[serde(default = "default_sign_in_latency_ms")]
    pub sign_in_latency_ms: u64,

    /// Fixed delay of the insight generator
    #[serde(default = "default_insight_delay_ms")]
    pub insight_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_secret: String::new(),
            list_latency_ms: default_list_latency_ms(),
            upload_latency_ms: default_upload_latency_ms(),
            sign_in_latency_ms: default_sign_in_latency_ms(),
            insight_delay_ms: default_insight_delay_ms(),
        }
    }
}

/// Artificial delays applied by the local emulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub list: Duration,
    pub upload: Duration,
    pub sign_in: Duration,
}

impl LatencyProfile {
    /// No artificial delays at all
    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            upload: Duration::ZERO,
            sign_in: Duration::ZERO,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Settings::default().latency()
    }
}

impl Settings {
    /// Load settings from file, creating it with defaults when missing
    pub fn load(paths: &Paths) -> Result<Self> {
        let settings_path = paths.settings_path();

        let mut settings = if settings_path.exists() {
            let content =
                std::fs::read_to_string(&settings_path).context("Failed to read settings file")?;
            serde_json::from_str(&content).context("Failed to parse settings file")?
        } else {
            Self::default()
        };

        if settings.server_secret.is_empty() {
            settings.server_secret = generate_random_string(48);
            settings.save(paths)?;
        }

        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self, paths: &Paths) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(paths.settings_path(), content).context("Failed to write settings file")?;
        Ok(())
    }

    /// Latencies of the local emulation
    pub fn latency(&self) -> LatencyProfile {
        LatencyProfile {
            list: Duration::from_millis(self.list_latency_ms),
            upload: Duration::from_millis(self.upload_latency_ms),
            sign_in: Duration::from_millis(self.sign_in_latency_ms),
        }
    }

    /// Drop the simulated latencies for this run only
    pub fn disable_latency(&mut self) {
        self.list_latency_ms = 0;
        self.upload_latency_ms = 0;
        self.sign_in_latency_ms = 0;
    }

    /// Delay of the mock insight generator
    pub fn insight_delay(&self) -> Duration {
        Duration::from_millis(self.insight_delay_ms)
    }
}

// Default value functions for serde

fn default_list_latency_ms() -> u64 {
    500
}

fn default_upload_latency_ms() -> u64 {
    800
}

fn default_sign_in_latency_ms() -> u64 {
    800
}

fn default_insight_delay_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.latency().list, Duration::from_millis(500));
        assert_eq!(settings.latency().upload, Duration::from_millis(800));
        assert_eq!(settings.insight_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"listLatencyMs": 10}"#).unwrap();
        assert_eq!(settings.list_latency_ms, 10);
        assert_eq!(settings.upload_latency_ms, 800);
        assert!(settings.server_secret.is_empty());
    }

    #[test]
    fn test_load_generates_and_keeps_secret() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::new(Some(temp_dir.path().to_path_buf())).unwrap();

        let first = Settings::load(&paths).unwrap();
        assert_eq!(first.server_secret.len(), 48);
        assert!(paths.settings_path().exists());

        let second = Settings::load(&paths).unwrap();
        assert_eq!(first.server_secret, second.server_secret);
    }

    #[test]
    fn test_disable_latency_keeps_insight_delay() {
        let mut settings = Settings::default();
        settings.disable_latency();
        assert_eq!(settings.latency(), LatencyProfile::none());
        assert_eq!(settings.insight_delay(), Duration::from_secs(5));
    }
}
