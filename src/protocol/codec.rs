use base64::Engine;
use serde_json::{json, Map, Value};

use super::messages::{ControlMessage, Frame};
use crate::error::{SessionError, SessionResult};
use crate::modes::{AudioEncoding, ModeDescriptor};
use crate::session::{
    BoardMember, ChatMessage, LanguagePrompt, LocalizedText, ParticipantEvent, Question,
    RemoteStatus, SessionEvent, SetupInfo, Speaker, Summary,
};

const DEFAULT_SPEAKER: &str = "Interviewer";

/// Wire codec for one mode
///
/// Encodes control messages and audio chunks, and decodes inbound frames into
/// [`SessionEvent`]s by `type` discriminator or, failing that, by shape.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    descriptor: &'static ModeDescriptor,
}

impl Codec {
    pub fn new(descriptor: &'static ModeDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &'static ModeDescriptor {
        self.descriptor
    }

    pub fn encode_control(&self, message: &ControlMessage) -> Frame {
        let d = self.descriptor;
        let mut map = Map::new();

        let kind = match message {
            ControlMessage::Configure(fields) => {
                map.extend(fields.clone());
                "configure"
            }
            ControlMessage::StartRecording => "start_recording",
            ControlMessage::StopRecording => "stop_recording",
            ControlMessage::PauseAudio => "pause_audio",
            ControlMessage::ResumeAudio => "resume_audio",
            ControlMessage::SelectLanguage(language) => {
                map.insert("language".to_string(), json!(language));
                "select_language"
            }
            ControlMessage::SubmitTextAnswer(answer) => {
                map.insert("answer".to_string(), json!(answer));
                "submit_text_answer"
            }
            ControlMessage::RequestSummary => d.summary_request,
            ControlMessage::EndInterview => d.end_request,
        };

        map.insert(d.outbound_key.to_string(), json!(kind));
        Frame::Text(Value::Object(map).to_string())
    }

    pub fn encode_audio(&self, pcm: &[u8]) -> Frame {
        match self.descriptor.audio {
            AudioEncoding::Binary => Frame::Binary(pcm.to_vec()),
            AudioEncoding::Base64Json { type_value, field } => {
                let mut map = Map::new();
                map.insert(self.descriptor.outbound_key.to_string(), json!(type_value));
                map.insert(
                    field.to_string(),
                    json!(base64::engine::general_purpose::STANDARD.encode(pcm)),
                );
                Frame::Text(Value::Object(map).to_string())
            }
        }
    }

    /// Decode one inbound text frame
    pub fn decode(&self, text: &str) -> SessionResult<SessionEvent> {
        let value = match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Object(_)) => value,
            _ => return self.decode_bare(text),
        };

        let kind = value
            .get("type")
            .or_else(|| value.get(self.descriptor.outbound_key))
            .and_then(Value::as_str)
            .map(str::to_string);

        match kind {
            Some(kind) => self.decode_typed(&kind, &value),
            None => self.decode_shape(&value),
        }
    }

    fn decode_bare(&self, text: &str) -> SessionResult<SessionEvent> {
        let trimmed = text.trim();
        match self.descriptor.bare_text_speaker {
            Some(name) if !trimmed.is_empty() => Ok(SessionEvent::Message(ChatMessage::new(
                Speaker::Participant(name.to_string()),
                LocalizedText::plain(trimmed),
            ))),
            _ => Err(SessionError::Protocol(format!(
                "{} backend sent a non-JSON frame",
                self.descriptor.name
            ))),
        }
    }

    fn decode_typed(&self, kind: &str, value: &Value) -> SessionResult<SessionEvent> {
        match kind {
            "status" | "status_update" | "state" => {
                let status = str_field(value, &["status", "state"]).ok_or_else(|| {
                    SessionError::Protocol("status event without a status".to_string())
                })?;
                Ok(self.status(RemoteStatus::parse(status), value))
            }
            "session_created" => Ok(self.status(RemoteStatus::Created, value)),
            "message" | "response" | "bot_message" | "bot_response" => {
                Ok(SessionEvent::Message(self.message(value)))
            }
            "transcript" | "transcription" | "user_transcript" => Ok(SessionEvent::Message(
                ChatMessage::new(Speaker::Candidate, self.localized(value)),
            )),
            "question" | "next_question" => Ok(SessionEvent::Question(self.question(value))),
            "participant_joined" | "user_joined" | "join" => {
                Ok(SessionEvent::Participant(ParticipantEvent::Joined {
                    name: self.participant_name(value)?,
                    active_count: active_count(value),
                }))
            }
            "participant_left" | "user_left" | "leave" => {
                Ok(SessionEvent::Participant(ParticipantEvent::Left {
                    name: self.participant_name(value)?,
                    active_count: active_count(value),
                }))
            }
            "language_prompt" | "language_selection" | "select_language" => {
                Ok(SessionEvent::LanguagePrompt(language_prompt(value)))
            }
            "error" => Ok(SessionEvent::Error(
                str_field(value, &["message", "error", "detail"])
                    .unwrap_or("unknown backend error")
                    .to_string(),
            )),
            "summary" | "analysis" | "final_analysis" => Ok(SessionEvent::Summary(summary(value))),
            "setup_info" | "board_info" | "setup" => Ok(SessionEvent::SetupInfo(setup_info(value))),
            other => match RemoteStatus::parse(other) {
                RemoteStatus::Other(_) => Err(SessionError::Protocol(format!(
                    "unknown event type: {}",
                    other
                ))),
                status => Ok(self.status(status, value)),
            },
        }
    }

    fn decode_shape(&self, value: &Value) -> SessionResult<SessionEvent> {
        if value.get("english").is_some() || value.get("hindi").is_some() {
            return Ok(SessionEvent::Question(self.question(value)));
        }
        if let Some(status) = value.get("status").and_then(Value::as_str) {
            return Ok(self.status(RemoteStatus::parse(status), value));
        }
        if let Some(error) = value.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Ok(SessionEvent::Error(message));
        }
        if value.get("summary").map_or(false, Value::is_object)
            || value.get("analysis").map_or(false, Value::is_object)
        {
            return Ok(SessionEvent::Summary(summary(value)));
        }
        if value.get("options").map_or(false, Value::is_array) {
            return Ok(SessionEvent::LanguagePrompt(language_prompt(value)));
        }
        if value.get(self.descriptor.text_field).is_some() {
            return Ok(SessionEvent::Message(self.message(value)));
        }

        Err(SessionError::Protocol(format!(
            "unrecognised frame: {}",
            value
        )))
    }

    fn status(&self, status: RemoteStatus, value: &Value) -> SessionEvent {
        SessionEvent::Status {
            status,
            session_code: str_field(value, &[self.descriptor.code_field, "session_id", "code"])
                .map(str::to_string),
        }
    }

    fn speaker(&self, value: &Value) -> Speaker {
        match str_field(value, &[self.descriptor.speaker_field, "speaker", "name"]) {
            Some(name) => match name.to_ascii_lowercase().as_str() {
                "user" | "candidate" | "you" => Speaker::Candidate,
                "system" => Speaker::System,
                _ => Speaker::Participant(name.to_string()),
            },
            None => Speaker::Participant(DEFAULT_SPEAKER.to_string()),
        }
    }

    fn message(&self, value: &Value) -> ChatMessage {
        ChatMessage::new(self.speaker(value), self.localized(value))
    }

    fn question(&self, value: &Value) -> Question {
        Question {
            text: self.localized(value),
            asked_by: str_field(value, &[self.descriptor.speaker_field, "member", "asked_by"])
                .map(str::to_string),
            number: u32_field(value, &["question_number", "number", "index"]),
            total: u32_field(value, &["total_questions", "total"]),
        }
    }

    fn participant_name(&self, value: &Value) -> SessionResult<String> {
        str_field(value, &["name", self.descriptor.speaker_field, "participant"])
            .map(str::to_string)
            .ok_or_else(|| SessionError::Protocol("participant event without a name".to_string()))
    }

    /// Text in `{english, hindi}` form or under the mode's text field
    fn localized(&self, value: &Value) -> LocalizedText {
        let text = bilingual(value);
        if !text.is_empty() {
            return text;
        }

        for key in [
            self.descriptor.text_field,
            "text",
            "content",
            "question",
            "message",
        ] {
            match value.get(key) {
                Some(Value::String(s)) => return LocalizedText::plain(s.as_str()),
                Some(nested @ Value::Object(_)) => {
                    let text = bilingual(nested);
                    if !text.is_empty() {
                        return text;
                    }
                }
                _ => {}
            }
        }

        LocalizedText::new()
    }
}

fn bilingual(value: &Value) -> LocalizedText {
    let mut text = LocalizedText::new();
    if let Some(english) = value.get("english").and_then(Value::as_str) {
        text.insert(LocalizedText::ENGLISH, english);
    }
    if let Some(hindi) = value.get("hindi").and_then(Value::as_str) {
        text.insert(LocalizedText::HINDI, hindi);
    }
    text
}

fn str_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
}

fn u32_field(value: &Value, keys: &[&str]) -> Option<u32> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_u64))
        .and_then(|n| u32::try_from(n).ok())
}

fn active_count(value: &Value) -> Option<usize> {
    ["active_count", "active_participants", "participant_count"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_u64))
        .map(|n| n as usize)
}

fn language_prompt(value: &Value) -> LanguagePrompt {
    let options = ["options", "languages"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    LanguagePrompt {
        options,
        prompt: str_field(value, &["prompt", "message"]).map(str::to_string),
    }
}

fn summary(value: &Value) -> Summary {
    let body = ["summary", "analysis", "data"]
        .iter()
        .find_map(|key| value.get(*key).filter(|v| v.is_object()))
        .cloned()
        .unwrap_or_else(|| value.clone());
    Summary::from_value(body)
}

fn setup_info(value: &Value) -> SetupInfo {
    let board = ["board", "board_members", "panel"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<BoardMember>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    SetupInfo {
        board,
        num_questions: u32_field(value, &["num_questions", "total_questions"]),
        raw: value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::Mode;

    fn codec(mode: Mode) -> Codec {
        Codec::new(mode.descriptor())
    }

    fn text(frame: Frame) -> Value {
        match frame {
            Frame::Text(t) => serde_json::from_str(&t).unwrap(),
            Frame::Binary(_) => panic!("expected text frame"),
        }
    }

    #[test]
    fn test_configure_uses_mode_discriminator() {
        let mut fields = Map::new();
        fields.insert("candidate_info".into(), json!({"name": "Meera"}));

        let value = text(codec(Mode::Hcs).encode_control(&ControlMessage::Configure(fields)));
        assert_eq!(value["action"], "configure");
        assert_eq!(value["candidate_info"]["name"], "Meera");
        assert!(value.get("type").is_none());
    }

    #[test]
    fn test_summary_request_name_follows_mode() {
        let gd = text(codec(Mode::GroupDiscussion).encode_control(&ControlMessage::RequestSummary));
        assert_eq!(gd["type"], "request_summary");

        let upsc = text(codec(Mode::UpscMain).encode_control(&ControlMessage::RequestSummary));
        assert_eq!(upsc["type"], "request_analysis");
    }

    #[test]
    fn test_text_answer_payload() {
        let value = text(
            codec(Mode::UpscMain)
                .encode_control(&ControlMessage::SubmitTextAnswer("Federalism".into())),
        );
        assert_eq!(value["type"], "submit_text_answer");
        assert_eq!(value["answer"], "Federalism");
    }

    #[test]
    fn test_audio_encodings() {
        let pcm = [1u8, 0, 2, 0];
        assert_eq!(
            codec(Mode::Hcs).encode_audio(&pcm),
            Frame::Binary(pcm.to_vec())
        );

        let value = text(codec(Mode::GroupDiscussion).encode_audio(&pcm));
        assert_eq!(value["type"], "audio");
        assert_eq!(value["data"], "AQACAA==");
    }

    #[test]
    fn test_decode_status_with_discussion_code() {
        let event = codec(Mode::GroupDiscussion)
            .decode(r#"{"type":"status","status":"created","discussion_code":"GD-42"}"#)
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::Status {
                status: RemoteStatus::Created,
                session_code: Some("GD-42".into()),
            }
        );
    }

    #[test]
    fn test_decode_group_message() {
        let event = codec(Mode::GroupDiscussion)
            .decode(r#"{"type":"message","name":"Bot 1","content":"Hello"}"#)
            .unwrap();
        match event {
            SessionEvent::Message(msg) => {
                assert_eq!(msg.speaker, Speaker::Participant("Bot 1".into()));
                assert_eq!(msg.content(), "Hello");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_decode_bilingual_question_by_shape() {
        let event = codec(Mode::Csat)
            .decode(r#"{"english":"What is 2+2?","hindi":"2+2 क्या है?"}"#)
            .unwrap();
        match event {
            SessionEvent::Question(q) => {
                assert_eq!(q.text.get("en"), Some("What is 2+2?"));
                assert_eq!(q.text.get("hi"), Some("2+2 क्या है?"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_decode_upsc_question_with_member() {
        let event = codec(Mode::UpscMain)
            .decode(
                r#"{"type":"question","member":"Chairperson","question":"Introduce yourself","question_number":1,"total_questions":5}"#,
            )
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::Question(Question {
                text: LocalizedText::plain("Introduce yourself"),
                asked_by: Some("Chairperson".into()),
                number: Some(1),
                total: Some(5),
            })
        );
    }

    #[test]
    fn test_decode_participants() {
        let c = codec(Mode::GroupDiscussion);
        assert_eq!(
            c.decode(r#"{"type":"participant_joined","name":"Alice","active_count":3}"#)
                .unwrap(),
            SessionEvent::Participant(ParticipantEvent::Joined {
                name: "Alice".into(),
                active_count: Some(3),
            })
        );
        assert!(c.decode(r#"{"type":"participant_left"}"#).is_err());
    }

    #[test]
    fn test_decode_language_prompt() {
        let event = codec(Mode::Polity)
            .decode(r#"{"type":"language_prompt","options":["english","hindi"],"message":"Choose"}"#)
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::LanguagePrompt(LanguagePrompt {
                options: vec!["english".into(), "hindi".into()],
                prompt: Some("Choose".into()),
            })
        );
    }

    #[test]
    fn test_decode_summary_unwraps_body() {
        let event = codec(Mode::GroupDiscussion)
            .decode(r#"{"type":"summary","summary":{"overall_feedback":"Good","conversation":[]}}"#)
            .unwrap();
        match event {
            SessionEvent::Summary(s) => assert_eq!(s.overall_feedback.as_deref(), Some("Good")),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_decode_setup_info_skips_bad_members() {
        let event = codec(Mode::UpscMain)
            .decode(
                r#"{"type":"setup_info","board":[{"name":"Dr. Rao","role":"Chair"},{"role":"no name"}],"num_questions":8}"#,
            )
            .unwrap();
        match event {
            SessionEvent::SetupInfo(info) => {
                assert_eq!(info.board.len(), 1);
                assert_eq!(info.board[0].name, "Dr. Rao");
                assert_eq!(info.num_questions, Some(8));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_bare_text_only_where_allowed() {
        let event = codec(Mode::Practice).decode("Tell me about yourself").unwrap();
        match event {
            SessionEvent::Message(msg) => {
                assert_eq!(msg.speaker, Speaker::Participant("Interviewer".into()));
            }
            other => panic!("unexpected event {:?}", other),
        }

        assert!(matches!(
            codec(Mode::Hcs).decode("plain words"),
            Err(SessionError::Protocol(_))
        ));
    }

    #[test]
    fn test_status_word_as_type() {
        assert_eq!(
            codec(Mode::Pcs).decode(r#"{"type":"analyzing"}"#).unwrap(),
            SessionEvent::Status {
                status: RemoteStatus::Analyzing,
                session_code: None,
            }
        );
        assert!(codec(Mode::Pcs).decode(r#"{"type":"mystery"}"#).is_err());
    }

    #[test]
    fn test_error_event() {
        assert_eq!(
            codec(Mode::Hcs)
                .decode(r#"{"type":"error","message":"model overloaded"}"#)
                .unwrap(),
            SessionEvent::Error("model overloaded".into())
        );
    }
}
