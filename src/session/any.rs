//! Mode-erased sessions
//!
//! `SessionClient<C>` is generic over the configuration type. Callers that
//! pick the mode at runtime (the HTTP API, the CLI) hold an
//! `Arc<dyn InterviewSession>` instead and pass configuration as JSON.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::client::SessionClient;
use super::events::Summary;
use super::listeners::Subscription;
use super::state::{ConnectionState, SessionView};
use super::stats::{SessionInfo, SessionStats};
use super::transcript::{ChatMessage, Participants};
use crate::audio::AudioSource;
use crate::config::Config;
use crate::error::{SessionError, SessionResult};
use crate::modes::{
    CandidateInterviewConfig, GroupDiscussionConfig, Mode, ModeConfig, PracticeConfig,
    SubjectInterviewConfig, UpscMainConfig,
};

pub type MessageCallback = Box<dyn Fn(&ChatMessage) + Send + Sync>;
pub type ErrorCallback = Box<dyn Fn(&SessionError) + Send + Sync>;
pub type StatusCallback = Box<dyn Fn(&ConnectionState) + Send + Sync>;

#[async_trait]
pub trait InterviewSession: Send + Sync {
    fn session_id(&self) -> &str;

    fn mode(&self) -> Mode;

    /// Parse `config` as this mode's configuration, then configure
    async fn configure_json(&self, config: Value) -> SessionResult<SessionInfo>;

    async fn start_recording(&self, source: AudioSource) -> SessionResult<()>;

    async fn stop_recording(&self) -> SessionResult<()>;

    fn pause_audio(&self);

    fn resume_audio(&self);

    fn select_language(&self, language: &str);

    fn submit_text_answer(&self, text: &str) -> SessionResult<()>;

    fn request_summary(&self) -> SessionResult<()>;

    async fn end_interview(&self) -> SessionResult<Option<Summary>>;

    async fn disconnect(&self);

    fn state(&self) -> ConnectionState;

    fn view(&self) -> SessionView;

    fn transcript(&self) -> Vec<ChatMessage>;

    fn participants(&self) -> Participants;

    fn summary(&self) -> Option<Summary>;

    fn stats(&self) -> SessionStats;

    fn subscribe_messages(&self, callback: MessageCallback) -> Subscription;

    fn subscribe_errors(&self, callback: ErrorCallback) -> Subscription;

    fn subscribe_status(&self, callback: StatusCallback) -> Subscription;
}

#[async_trait]
impl<C: ModeConfig> InterviewSession for SessionClient<C> {
    fn session_id(&self) -> &str {
        SessionClient::session_id(self)
    }

    fn mode(&self) -> Mode {
        SessionClient::mode(self)
    }

    async fn configure_json(&self, config: Value) -> SessionResult<SessionInfo> {
        let config: C = serde_json::from_value(config)
            .map_err(|e| SessionError::Validation(e.to_string()))?;
        self.configure(&config).await
    }

    async fn start_recording(&self, source: AudioSource) -> SessionResult<()> {
        SessionClient::start_recording(self, source).await
    }

    async fn stop_recording(&self) -> SessionResult<()> {
        SessionClient::stop_recording(self).await
    }

    fn pause_audio(&self) {
        SessionClient::pause_audio(self)
    }

    fn resume_audio(&self) {
        SessionClient::resume_audio(self)
    }

    fn select_language(&self, language: &str) {
        SessionClient::select_language(self, language)
    }

    fn submit_text_answer(&self, text: &str) -> SessionResult<()> {
        SessionClient::submit_text_answer(self, text)
    }

    fn request_summary(&self) -> SessionResult<()> {
        SessionClient::request_summary(self)
    }

    async fn end_interview(&self) -> SessionResult<Option<Summary>> {
        SessionClient::end_interview(self).await
    }

    async fn disconnect(&self) {
        SessionClient::disconnect(self).await
    }

    fn state(&self) -> ConnectionState {
        SessionClient::state(self)
    }

    fn view(&self) -> SessionView {
        SessionClient::view(self)
    }

    fn transcript(&self) -> Vec<ChatMessage> {
        SessionClient::transcript(self)
    }

    fn participants(&self) -> Participants {
        SessionClient::participants(self)
    }

    fn summary(&self) -> Option<Summary> {
        SessionClient::summary(self)
    }

    fn stats(&self) -> SessionStats {
        SessionClient::stats(self)
    }

    fn subscribe_messages(&self, callback: MessageCallback) -> Subscription {
        self.on_message(callback)
    }

    fn subscribe_errors(&self, callback: ErrorCallback) -> Subscription {
        self.on_error(callback)
    }

    fn subscribe_status(&self, callback: StatusCallback) -> Subscription {
        self.on_status_change(callback)
    }
}

/// Build the client for `mode` against the configured endpoint
pub fn open_session(mode: Mode, app: &Config) -> SessionResult<Arc<dyn InterviewSession>> {
    let session: Arc<dyn InterviewSession> = match mode {
        Mode::GroupDiscussion => Arc::new(SessionClient::<GroupDiscussionConfig>::for_mode(mode, app)?),
        Mode::Hcs | Mode::Pcs => {
            Arc::new(SessionClient::<CandidateInterviewConfig>::for_mode(mode, app)?)
        }
        Mode::UpscMain => Arc::new(SessionClient::<UpscMainConfig>::for_mode(mode, app)?),
        Mode::Csat | Mode::Polity => {
            Arc::new(SessionClient::<SubjectInterviewConfig>::for_mode(mode, app)?)
        }
        Mode::Practice => Arc::new(SessionClient::<PracticeConfig>::for_mode(mode, app)?),
    };
    Ok(session)
}
