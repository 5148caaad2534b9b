use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::audio::AudioBackendConfig;
use crate::modes::Mode;
use crate::session::{ReconnectPolicy, SessionConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Where the interview backends live
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    /// WebSocket origin every mode path is appended to, e.g. `ws://localhost:8000`
    pub base_url: String,

    /// Per-mode full URLs that replace `base_url` + path
    #[serde(default)]
    pub overrides: HashMap<Mode, String>,
}

impl EndpointsConfig {
    pub fn url_for(&self, mode: Mode) -> String {
        match self.overrides.get(&mode) {
            Some(url) => url.clone(),
            None => mode.descriptor().endpoint(&self.base_url),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_duration_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        let defaults = AudioBackendConfig::default();
        Self {
            sample_rate: defaults.target_sample_rate,
            channels: defaults.target_channels,
            buffer_duration_ms: defaults.buffer_duration_ms,
        }
    }
}

impl From<&AudioConfig> for AudioBackendConfig {
    fn from(audio: &AudioConfig) -> Self {
        AudioBackendConfig {
            target_sample_rate: audio.sample_rate,
            target_channels: audio.channels,
            buffer_duration_ms: audio.buffer_duration_ms,
        }
    }
}

/// Timeouts and reconnect behaviour, in whole seconds / milliseconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub connect_timeout_secs: u64,
    pub configure_timeout_secs: u64,
    pub summary_timeout_secs: u64,
    pub end_summary_timeout_secs: u64,

    /// 0 disables reconnection
    pub reconnect_max_retries: u32,
    pub reconnect_base_ms: u64,
    pub reconnect_max_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            configure_timeout_secs: 30,
            summary_timeout_secs: 10,
            end_summary_timeout_secs: 15,
            reconnect_max_retries: 0,
            reconnect_base_ms: 800,
            reconnect_max_ms: 5000,
        }
    }
}

impl SessionSettings {
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        if self.reconnect_max_retries == 0 {
            return ReconnectPolicy::Never;
        }
        ReconnectPolicy::Backoff {
            max_retries: self.reconnect_max_retries,
            base: Duration::from_millis(self.reconnect_base_ms),
            max: Duration::from_millis(self.reconnect_max_ms),
        }
    }
}

impl Config {
    /// Load `path` (extension optional) with `INTERVIEW__SECTION__KEY` overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("INTERVIEW")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn endpoint_for(&self, mode: Mode) -> String {
        self.endpoints.url_for(mode)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            connect_timeout: Duration::from_secs(self.session.connect_timeout_secs),
            configure_timeout: Duration::from_secs(self.session.configure_timeout_secs),
            summary_timeout: Duration::from_secs(self.session.summary_timeout_secs),
            end_summary_timeout: Duration::from_secs(self.session.end_summary_timeout_secs),
            reconnect: self.session.reconnect_policy(),
            audio: AudioBackendConfig::from(&self.audio),
        }
    }

    /// Configuration pointing every mode at `base_url`, with defaults elsewhere
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            service: ServiceConfig {
                name: "interview-client".to_string(),
                http: HttpConfig {
                    bind: "127.0.0.1".to_string(),
                    port: 8090,
                },
            },
            endpoints: EndpointsConfig {
                base_url: base_url.into(),
                overrides: HashMap::new(),
            },
            audio: AudioConfig::default(),
            session: SessionSettings::default(),
        }
    }
}
