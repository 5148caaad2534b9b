//! Interview session management
//!
//! This module provides the `SessionClient` abstraction that manages:
//! - The WebSocket connection to one mode's backend
//! - The connection state machine and its derived view
//! - Audio capture gated by mute and readiness
//! - Event decoding, listener fan-out, and the merged transcript
//! - Summary requests and session teardown

mod any;
mod client;
mod config;
mod connection;
mod events;
mod listeners;
mod state;
mod stats;
mod transcript;

pub use any::{open_session, ErrorCallback, InterviewSession, MessageCallback, StatusCallback};
pub use client::SessionClient;
pub use config::{ReconnectPolicy, SessionConfig};
pub use events::{
    BoardMember, LanguagePrompt, ParticipantEvent, Question, SessionEvent, SetupInfo, Summary,
};
pub use listeners::{ListenerSet, Listeners, Subscription};
pub use state::{ConnectionState, RemoteStatus, SessionView};
pub use stats::{SessionInfo, SessionStats};
pub use transcript::{ChatMessage, LocalizedText, Participant, Participants, Speaker, Transcript};
