pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod modes;
pub mod protocol;
pub mod session;

pub use audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFile, AudioFrame, AudioLevel,
    AudioSource, Signal,
};
pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use http::{create_router, AppState};
pub use modes::{Mode, ModeConfig, ModeDescriptor};
pub use session::{
    open_session, ChatMessage, ConnectionState, InterviewSession, ReconnectPolicy, SessionClient,
    SessionConfig, SessionInfo, SessionStats, SessionView, Subscription, Summary,
};
