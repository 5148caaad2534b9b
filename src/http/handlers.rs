use super::state::AppState;
use crate::audio::{AudioSource, Signal};
use crate::error::SessionError;
use crate::modes::Mode;
use crate::session::{
    open_session, ChatMessage, InterviewSession, SessionStats, SessionView, Summary,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub mode: Mode,

    /// Mode-specific configuration, e.g. `{"topic": ..., "user_name": ...}`
    pub config: Value,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub mode: Mode,
    pub session_code: Option<String>,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StartRecordingRequest {
    /// WAV file to stream; silence when omitted
    pub file: Option<PathBuf>,

    /// Stream a tone at this frequency instead of silence
    pub tone_hz: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct SelectLanguageRequest {
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub view: SessionView,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct EndInterviewResponse {
    pub session_id: String,
    pub status: String,
    pub summary: Option<Summary>,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn session_error(err: SessionError) -> Response {
    let status = match &err {
        SessionError::Validation(_) | SessionError::Unsupported { .. } => StatusCode::BAD_REQUEST,
        SessionError::NotConnected => StatusCode::CONFLICT,
        SessionError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        SessionError::Connection(_) | SessionError::Remote(_) | SessionError::Protocol(_) => {
            StatusCode::BAD_GATEWAY
        }
        SessionError::Audio(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

fn not_found(session_id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Session {} not found", session_id),
    )
}

async fn lookup(state: &AppState, session_id: &str) -> Result<Arc<dyn InterviewSession>, Response> {
    state.get(session_id).await.ok_or_else(|| not_found(session_id))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Open a session for a mode and wait until the backend is ready
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    info!("Creating {} session", req.mode);

    let session = match open_session(req.mode, &state.config) {
        Ok(session) => session,
        Err(e) => return session_error(e),
    };

    let info = match session.configure_json(req.config).await {
        Ok(info) => info,
        Err(e) => {
            error!("Failed to configure {} session: {}", req.mode, e);
            session.disconnect().await;
            return session_error(e);
        }
    };

    state.insert(Arc::clone(&session)).await;

    info!("Session {} ready", info.session_id);

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: info.session_id,
            mode: info.mode,
            session_code: info.session_code,
            status: session.state().label().to_string(),
        }),
    )
        .into_response()
}

/// GET /sessions/:session_id/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(session) => (
            StatusCode::OK,
            Json(StatusResponse {
                view: session.view(),
                stats: session.stats(),
            }),
        )
            .into_response(),
        Err(response) => response,
    }
}

/// GET /sessions/:session_id/transcript
/// Merged transcript accumulated so far
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(session) => {
            let transcript: Vec<ChatMessage> = session.transcript();
            (StatusCode::OK, Json(transcript)).into_response()
        }
        Err(response) => response,
    }
}

/// POST /sessions/:session_id/recording/start
pub async fn start_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<StartRecordingRequest>,
) -> Response {
    let session = match lookup(&state, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    let source = match (req.file, req.tone_hz) {
        (Some(path), _) => AudioSource::File(path),
        (None, Some(frequency_hz)) => AudioSource::Synthetic(Signal::Tone {
            frequency_hz,
            amplitude: 0.2,
        }),
        (None, None) => AudioSource::Synthetic(Signal::Silence),
    };

    match session.start_recording(source).await {
        Ok(()) => (StatusCode::OK, Json(session.view())).into_response(),
        Err(e) => {
            error!("Failed to start recording for {}: {}", session_id, e);
            session_error(e)
        }
    }
}

/// POST /sessions/:session_id/recording/stop
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match lookup(&state, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match session.stop_recording().await {
        Ok(()) => (StatusCode::OK, Json(session.view())).into_response(),
        Err(e) => session_error(e),
    }
}

/// POST /sessions/:session_id/recording/pause
pub async fn pause_audio(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(session) => {
            session.pause_audio();
            (StatusCode::OK, Json(session.view())).into_response()
        }
        Err(response) => response,
    }
}

/// POST /sessions/:session_id/recording/resume
pub async fn resume_audio(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(session) => {
            session.resume_audio();
            (StatusCode::OK, Json(session.view())).into_response()
        }
        Err(response) => response,
    }
}

/// POST /sessions/:session_id/language
pub async fn select_language(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SelectLanguageRequest>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(session) => {
            session.select_language(&req.language);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(response) => response,
    }
}

/// POST /sessions/:session_id/answer
/// Typed answer, for modes that accept one
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Response {
    let session = match lookup(&state, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match session.submit_text_answer(&req.text) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => session_error(e),
    }
}

/// POST /sessions/:session_id/summary
/// The summary arrives asynchronously; poll the session or end it to collect
pub async fn request_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let session = match lookup(&state, &session_id).await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match session.request_summary() {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => session_error(e),
    }
}

/// POST /sessions/:session_id/end
/// End the interview, wait for the summary, and forget the session
pub async fn end_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    info!("Ending session: {}", session_id);

    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    let Some(session) = session else {
        return not_found(&session_id);
    };

    let summary = match session.end_interview().await {
        Ok(summary) => summary,
        Err(e) => {
            // The session is closed either way; report what arrived
            warn!("Session {} ended without a summary: {}", session_id, e);
            session.summary()
        }
    };

    (
        StatusCode::OK,
        Json(EndInterviewResponse {
            session_id,
            status: session.state().label().to_string(),
            summary,
            stats: session.stats(),
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
