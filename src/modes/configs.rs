use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Mode, ModeConfig};
use crate::error::{SessionError, SessionResult};

fn require(value: &str, field: &str) -> SessionResult<()> {
    if value.trim().is_empty() {
        return Err(SessionError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Multi-party group discussion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDiscussionConfig {
    pub topic: String,
    pub user_name: String,
}

impl ModeConfig for GroupDiscussionConfig {
    fn supports(mode: Mode) -> bool {
        mode == Mode::GroupDiscussion
    }

    fn validate(&self) -> SessionResult<()> {
        require(&self.topic, "topic")?;
        require(&self.user_name, "user_name")
    }
}

/// Candidate profile forwarded to civil-service boards
///
/// Only the name is required; anything else the form collected rides along.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CandidateInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: Map::new(),
        }
    }

    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// State civil-service interview (HCS or PCS)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateInterviewConfig {
    pub candidate_info: CandidateInfo,
}

impl ModeConfig for CandidateInterviewConfig {
    fn supports(mode: Mode) -> bool {
        matches!(mode, Mode::Hcs | Mode::Pcs)
    }

    fn validate(&self) -> SessionResult<()> {
        require(&self.candidate_info.name, "candidate_info.name")
    }
}

/// UPSC personality test with a board of panel members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpscMainConfig {
    pub user_info: CandidateInfo,
    pub num_questions: u32,
}

impl UpscMainConfig {
    pub const MAX_QUESTIONS: u32 = 50;
}

impl ModeConfig for UpscMainConfig {
    fn supports(mode: Mode) -> bool {
        mode == Mode::UpscMain
    }

    fn validate(&self) -> SessionResult<()> {
        require(&self.user_info.name, "user_info.name")?;
        if self.num_questions == 0 || self.num_questions > Self::MAX_QUESTIONS {
            return Err(SessionError::Validation(format!(
                "num_questions must be between 1 and {}",
                Self::MAX_QUESTIONS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Subject interviews (CSAT, Polity)
///
/// `language` may be left out; the backend then sends a language prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectInterviewConfig {
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ModeConfig for SubjectInterviewConfig {
    fn supports(mode: Mode) -> bool {
        matches!(mode, Mode::Csat | Mode::Polity)
    }

    fn validate(&self) -> SessionResult<()> {
        if let Some(language) = &self.language {
            require(language, "language")?;
        }
        Ok(())
    }
}

/// Generic practice interview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeConfig {
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ModeConfig for PracticeConfig {
    fn supports(mode: Mode) -> bool {
        mode == Mode::Practice
    }

    fn validate(&self) -> SessionResult<()> {
        require(&self.user_name, "user_name")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_discussion_requires_topic_and_name() {
        let config = GroupDiscussionConfig {
            topic: "  ".into(),
            user_name: "Asha".into(),
        };
        assert_eq!(
            config.validate(),
            Err(SessionError::Validation("topic is required".into()))
        );

        let config = GroupDiscussionConfig {
            topic: "Remote work".into(),
            user_name: "Asha".into(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upsc_question_bounds() {
        let mut config = UpscMainConfig {
            user_info: CandidateInfo::new("Ravi"),
            num_questions: 0,
        };
        assert!(config.validate().is_err());
        config.num_questions = 10;
        assert!(config.validate().is_ok());
        config.num_questions = UpscMainConfig::MAX_QUESTIONS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_candidate_info_flattens_details() {
        let info = CandidateInfo::new("Meera")
            .detail("home_state", "Haryana")
            .detail("age", 27);
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["name"], "Meera");
        assert_eq!(value["home_state"], "Haryana");
        assert_eq!(value["age"], 27);
    }

    #[test]
    fn test_config_shapes_match_modes() {
        assert!(CandidateInterviewConfig::supports(Mode::Hcs));
        assert!(CandidateInterviewConfig::supports(Mode::Pcs));
        assert!(!CandidateInterviewConfig::supports(Mode::UpscMain));
        assert!(SubjectInterviewConfig::supports(Mode::Polity));
        assert!(!GroupDiscussionConfig::supports(Mode::Practice));
    }

    #[test]
    fn test_subject_language_is_optional() {
        let config: SubjectInterviewConfig =
            serde_json::from_str(r#"{"difficulty": "hard"}"#).unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert!(config.language.is_none());
        assert!(config.validate().is_ok());
        assert!(!serde_json::to_string(&config).unwrap().contains("language"));
    }
}
