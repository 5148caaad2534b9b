use serde_json::{Map, Value};

/// Outbound control vocabulary shared by every mode
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// Mode-specific configure fields
    Configure(Map<String, Value>),
    StartRecording,
    StopRecording,
    PauseAudio,
    ResumeAudio,
    SelectLanguage(String),
    SubmitTextAnswer(String),
    RequestSummary,
    EndInterview,
}

impl ControlMessage {
    pub fn configure<T: serde::Serialize>(config: &T) -> serde_json::Result<Self> {
        match serde_json::to_value(config)? {
            Value::Object(map) => Ok(ControlMessage::Configure(map)),
            other => {
                let mut map = Map::new();
                map.insert("config".to_string(), other);
                Ok(ControlMessage::Configure(map))
            }
        }
    }
}

/// A WebSocket payload independent of the transport crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    pub fn len(&self) -> usize {
        match self {
            Frame::Text(text) => text.len(),
            Frame::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
