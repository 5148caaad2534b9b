use std::time::Duration;

use crate::audio::AudioBackendConfig;

/// What to do when the socket drops without the client asking for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Surface a connection error and stay disconnected; the user restarts
    /// from configuration
    Never,
    /// Reconnect with exponential backoff and replay the last configuration
    Backoff {
        max_retries: u32,
        base: Duration,
        max: Duration,
    },
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (1-based), or None to give up
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        match self {
            ReconnectPolicy::Never => None,
            ReconnectPolicy::Backoff {
                max_retries,
                base,
                max,
            } => {
                if attempt == 0 || attempt > *max_retries {
                    return None;
                }
                let exp = attempt.saturating_sub(1).min(10);
                let factor = 1u32 << exp;
                Some(base.saturating_mul(factor).min(*max))
            }
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Never
    }
}

/// Configuration for one session client
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time allowed for the WebSocket handshake
    pub connect_timeout: Duration,

    /// Time allowed between sending configure and a ready-equivalent status
    pub configure_timeout: Duration,

    /// Window for a summary after `request_summary`
    /// Default: 10 seconds
    pub summary_timeout: Duration,

    /// Window for a summary after `end_interview`
    /// Default: 15 seconds
    pub end_summary_timeout: Duration,

    pub reconnect: ReconnectPolicy,

    /// Format audio is converted to before it is sent
    pub audio: AudioBackendConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            configure_timeout: Duration::from_secs(30),
            summary_timeout: Duration::from_secs(10),
            end_summary_timeout: Duration::from_secs(15),
            reconnect: ReconnectPolicy::Never,
            audio: AudioBackendConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_gives_up_immediately() {
        assert_eq!(ReconnectPolicy::Never.delay(1), None);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = ReconnectPolicy::Backoff {
            max_retries: 5,
            base: Duration::from_millis(800),
            max: Duration::from_secs(5),
        };
        assert_eq!(policy.delay(1), Some(Duration::from_millis(800)));
        assert_eq!(policy.delay(2), Some(Duration::from_millis(1600)));
        assert_eq!(policy.delay(3), Some(Duration::from_millis(3200)));
        assert_eq!(policy.delay(4), Some(Duration::from_secs(5)));
        assert_eq!(policy.delay(6), None);
    }
}
