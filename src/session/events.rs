use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::RemoteStatus;
use super::transcript::{ChatMessage, LocalizedText};

/// One decoded inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Status {
        status: RemoteStatus,
        /// Server-assigned session or discussion code
        session_code: Option<String>,
    },
    Message(ChatMessage),
    Question(Question),
    Participant(ParticipantEvent),
    LanguagePrompt(LanguagePrompt),
    Error(String),
    Summary(Summary),
    SetupInfo(SetupInfo),
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Status { .. } => "status",
            SessionEvent::Message(_) => "message",
            SessionEvent::Question(_) => "question",
            SessionEvent::Participant(_) => "participant",
            SessionEvent::LanguagePrompt(_) => "language prompt",
            SessionEvent::Error(_) => "error",
            SessionEvent::Summary(_) => "summary",
            SessionEvent::SetupInfo(_) => "setup info",
        }
    }
}

/// An interview question, possibly bilingual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: LocalizedText,
    /// Board member asking, when the backend names one
    pub asked_by: Option<String>,
    pub number: Option<u32>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ParticipantEvent {
    Joined {
        name: String,
        active_count: Option<usize>,
    },
    Left {
        name: String,
        active_count: Option<usize>,
    },
}

impl ParticipantEvent {
    pub fn name(&self) -> &str {
        match self {
            ParticipantEvent::Joined { name, .. } | ParticipantEvent::Left { name, .. } => name,
        }
    }
}

/// Backend asks the candidate to pick a language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePrompt {
    pub options: Vec<String>,
    pub prompt: Option<String>,
}

/// Final report over the whole conversation
///
/// The payload is free-form; the feedback and conversation fields are pulled
/// out when present and the rest stays in `raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub overall_feedback: Option<String>,
    pub conversation: Vec<Value>,
    pub raw: Value,
}

impl Summary {
    pub fn from_value(raw: Value) -> Self {
        let overall_feedback = ["overall_feedback", "feedback", "overall", "summary"]
            .iter()
            .find_map(|key| raw.get(key).and_then(Value::as_str))
            .map(str::to_string);

        let conversation = ["conversation", "transcript", "history"]
            .iter()
            .find_map(|key| raw.get(key).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default();

        Self {
            overall_feedback,
            conversation,
            raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMember {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
}

/// Interview panel description sent before the first question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupInfo {
    pub board: Vec<BoardMember>,
    pub num_questions: Option<u32>,
    pub raw: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_picks_known_fields() {
        let summary = Summary::from_value(json!({
            "overall_feedback": "Clear and structured",
            "conversation": [{"speaker": "Bot 1", "text": "Hello"}],
            "score": 7
        }));

        assert_eq!(summary.overall_feedback.as_deref(), Some("Clear and structured"));
        assert_eq!(summary.conversation.len(), 1);
        assert_eq!(summary.raw["score"], 7);
    }

    #[test]
    fn test_summary_alternate_field_names() {
        let summary = Summary::from_value(json!({
            "feedback": "Needs examples",
            "transcript": []
        }));
        assert_eq!(summary.overall_feedback.as_deref(), Some("Needs examples"));
        assert!(summary.conversation.is_empty());
    }
}
