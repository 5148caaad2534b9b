use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-observed phase of a session
///
/// Published through a `watch` channel by the session client; every UI flag is
/// derived from this value through [`SessionView::project`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "detail", rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Socket open, configuration not yet acknowledged
    Connected,
    Ready,
    Recording,
    Processing,
    Analyzing,
    Complete,
    Error(String),
}

/// Status strings the backends send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Ready,
    Created,
    Joined,
    Recording,
    Listening,
    Muted,
    Paused,
    Processing,
    Analyzing,
    Complete,
    Disconnected,
    Other(String),
}

impl RemoteStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ready" => RemoteStatus::Ready,
            "created" => RemoteStatus::Created,
            "joined" => RemoteStatus::Joined,
            "recording" => RemoteStatus::Recording,
            "listening" => RemoteStatus::Listening,
            "muted" => RemoteStatus::Muted,
            "paused" => RemoteStatus::Paused,
            "processing" => RemoteStatus::Processing,
            "analyzing" | "analysing" => RemoteStatus::Analyzing,
            "complete" | "completed" => RemoteStatus::Complete,
            "disconnected" => RemoteStatus::Disconnected,
            other => RemoteStatus::Other(other.to_string()),
        }
    }

    /// Mute and pause are sub-states of recording, not phases
    pub fn is_mute(&self) -> bool {
        matches!(self, RemoteStatus::Muted | RemoteStatus::Paused)
    }

    /// The backend is taking audio again after a mute or pause
    pub fn resumes_audio(&self) -> bool {
        matches!(self, RemoteStatus::Recording | RemoteStatus::Listening)
    }
}

impl ConnectionState {
    /// Apply a status reported by the backend
    pub fn on_remote_status(&self, status: &RemoteStatus) -> ConnectionState {
        if *status == RemoteStatus::Disconnected {
            return ConnectionState::Disconnected;
        }

        // Only a disconnect leaves a finished or dropped session
        if matches!(self, ConnectionState::Complete | ConnectionState::Disconnected) {
            return self.clone();
        }

        match status {
            RemoteStatus::Ready | RemoteStatus::Created | RemoteStatus::Joined => {
                ConnectionState::Ready
            }
            RemoteStatus::Recording | RemoteStatus::Listening => ConnectionState::Recording,
            RemoteStatus::Processing => ConnectionState::Processing,
            RemoteStatus::Analyzing => ConnectionState::Analyzing,
            RemoteStatus::Complete => ConnectionState::Complete,
            RemoteStatus::Muted
            | RemoteStatus::Paused
            | RemoteStatus::Disconnected
            | RemoteStatus::Other(_) => self.clone(),
        }
    }

    /// A new question or message ends a processing pause
    pub fn on_turn(&self) -> ConnectionState {
        match self {
            ConnectionState::Processing => ConnectionState::Recording,
            other => other.clone(),
        }
    }

    pub fn on_recording_started(&self) -> ConnectionState {
        match self {
            ConnectionState::Ready => ConnectionState::Recording,
            other => other.clone(),
        }
    }

    pub fn on_recording_stopped(&self) -> ConnectionState {
        match self {
            ConnectionState::Recording | ConnectionState::Processing => ConnectionState::Ready,
            other => other.clone(),
        }
    }

    /// Phases in which captured audio may leave the client
    pub fn accepts_audio(&self) -> bool {
        matches!(
            self,
            ConnectionState::Ready | ConnectionState::Recording | ConnectionState::Processing
        )
    }

    /// Configuration has been acknowledged by the backend
    pub fn is_configured(&self) -> bool {
        matches!(
            self,
            ConnectionState::Ready
                | ConnectionState::Recording
                | ConnectionState::Processing
                | ConnectionState::Analyzing
                | ConnectionState::Complete
        )
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ConnectionState::Disconnected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Ready => "ready",
            ConnectionState::Recording => "recording",
            ConnectionState::Processing => "processing",
            ConnectionState::Analyzing => "analyzing",
            ConnectionState::Complete => "complete",
            ConnectionState::Error(_) => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Error(msg) => write!(f, "error: {}", msg),
            other => f.write_str(other.label()),
        }
    }
}

/// Flat projection of session state for a UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub phase: &'static str,
    pub is_connected: bool,
    pub is_configured: bool,
    pub is_recording: bool,
    pub is_mic_muted: bool,
    pub can_start_recording: bool,
    pub can_request_summary: bool,
    pub is_finished: bool,
    pub error: Option<String>,
}

impl SessionView {
    pub fn project(state: &ConnectionState, muted: bool, capturing: bool) -> Self {
        let is_recording = capturing
            && matches!(
                state,
                ConnectionState::Recording | ConnectionState::Processing
            );

        Self {
            phase: state.label(),
            is_connected: state.is_open(),
            is_configured: state.is_configured(),
            is_recording,
            is_mic_muted: capturing && muted,
            can_start_recording: state.accepts_audio() && !capturing,
            can_request_summary: state.is_configured(),
            is_finished: matches!(
                state,
                ConnectionState::Complete | ConnectionState::Disconnected
            ),
            error: match state {
                ConnectionState::Error(msg) => Some(msg.clone()),
                _ => None,
            },
        }
    }
}
