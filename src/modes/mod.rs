//! Interview modes
//!
//! Each backend is described by a static [`ModeDescriptor`] and accepts one
//! configuration type implementing [`ModeConfig`]. The session client is
//! generic over the configuration type and reads everything else from the
//! descriptor.

mod configs;
mod descriptor;

pub use configs::{
    CandidateInfo, CandidateInterviewConfig, Difficulty, GroupDiscussionConfig, PracticeConfig,
    SubjectInterviewConfig, UpscMainConfig,
};
pub use descriptor::{AudioEncoding, Capabilities, ModeDescriptor};

use crate::error::SessionResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every interview backend this client can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    GroupDiscussion,
    Hcs,
    Pcs,
    UpscMain,
    Csat,
    Polity,
    Practice,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::GroupDiscussion,
        Mode::Hcs,
        Mode::Pcs,
        Mode::UpscMain,
        Mode::Csat,
        Mode::Polity,
        Mode::Practice,
    ];

    pub fn descriptor(self) -> &'static ModeDescriptor {
        match self {
            Mode::GroupDiscussion => &descriptor::GROUP_DISCUSSION,
            Mode::Hcs => &descriptor::HCS,
            Mode::Pcs => &descriptor::PCS,
            Mode::UpscMain => &descriptor::UPSC_MAIN,
            Mode::Csat => &descriptor::CSAT,
            Mode::Polity => &descriptor::POLITY,
            Mode::Practice => &descriptor::PRACTICE,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        match wanted.as_str() {
            "gd" | "group-discussion" => Ok(Mode::GroupDiscussion),
            "hcs" => Ok(Mode::Hcs),
            "pcs" => Ok(Mode::Pcs),
            "upsc" | "upsc-main" => Ok(Mode::UpscMain),
            "csat" | "upsc-csat" => Ok(Mode::Csat),
            "polity" | "upsc-polity" => Ok(Mode::Polity),
            "practice" => Ok(Mode::Practice),
            other => Err(format!("unknown interview mode: {}", other)),
        }
    }
}

/// Mode-specific configure payload
///
/// Serialized fields are merged into the configure control message as-is.
pub trait ModeConfig: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Whether this configuration shape is what `mode` expects
    fn supports(mode: Mode) -> bool;

    /// Client-side checks run before any network traffic
    fn validate(&self) -> SessionResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_aliases() {
        assert_eq!("gd".parse::<Mode>(), Ok(Mode::GroupDiscussion));
        assert_eq!("UPSC_MAIN".parse::<Mode>(), Ok(Mode::UpscMain));
        assert_eq!("upsc-polity".parse::<Mode>(), Ok(Mode::Polity));
        assert!("bogus".parse::<Mode>().is_err());
    }

    #[test]
    fn test_endpoints_join_base_url() {
        assert_eq!(
            Mode::GroupDiscussion
                .descriptor()
                .endpoint("wss://api.example.com/"),
            "wss://api.example.com/gd-multi"
        );
        assert_eq!(
            Mode::UpscMain.descriptor().endpoint("wss://api.example.com"),
            "wss://api.example.com/upsc-main/"
        );
    }

    #[test]
    fn test_paths_are_distinct() {
        let mut paths: Vec<_> = Mode::ALL.iter().map(|m| m.descriptor().path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), Mode::ALL.len());
    }

    #[test]
    fn test_only_upsc_main_takes_text_answers() {
        for mode in Mode::ALL {
            assert_eq!(
                mode.descriptor().capabilities.text_answers,
                mode == Mode::UpscMain,
                "{}",
                mode
            );
        }
    }
}
