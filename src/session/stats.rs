use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modes::Mode;

/// Statistics about an interview session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    /// Locally generated identifier
    pub session_id: String,

    pub mode: Mode,

    /// Current phase label
    pub phase: String,

    /// When the client was created
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Audio frames that passed the gate and were queued for sending
    pub frames_sent: u64,

    /// Audio frames dropped while muted or before readiness
    pub frames_dropped: u64,

    pub bytes_sent: u64,

    /// Inbound frames decoded into events
    pub events_received: u64,

    /// Entries in the merged transcript
    pub transcript_entries: usize,

    pub active_participants: usize,
}

/// Returned once a session has been configured
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub mode: Mode,
    pub endpoint: String,
    /// Server-assigned session or discussion code
    pub session_code: Option<String>,
}
