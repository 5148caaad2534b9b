//! HTTP API server for driving interview sessions
//!
//! This module provides a REST API over the session client:
//! - POST /sessions - Open and configure a session for a mode
//! - GET /sessions/:id/status - Phase, UI flags, and statistics
//! - GET /sessions/:id/transcript - Merged transcript so far
//! - POST /sessions/:id/recording/{start,stop,pause,resume} - Audio control
//! - POST /sessions/:id/language - Answer a language prompt
//! - POST /sessions/:id/answer - Typed answer (UPSC main)
//! - POST /sessions/:id/summary - Request the summary
//! - POST /sessions/:id/end - End the interview and drop the session
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
