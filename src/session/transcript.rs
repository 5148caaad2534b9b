use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text carried in one or more locales, keyed by locale code ("en", "hi", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub const ENGLISH: &'static str = "en";
    pub const HINDI: &'static str = "hi";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new().with(Self::ENGLISH, text)
    }

    pub fn with(mut self, locale: &str, text: impl Into<String>) -> Self {
        self.insert(locale, text);
        self
    }

    /// Empty strings are not stored
    pub fn insert(&mut self, locale: &str, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.0.insert(locale.to_string(), text);
        }
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// English when present, otherwise the first locale
    pub fn primary(&self) -> &str {
        self.get(Self::ENGLISH)
            .or_else(|| self.0.values().next().map(String::as_str))
            .unwrap_or("")
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenate `other` onto `self` locale by locale, separated by one space
    pub fn append(&mut self, other: &LocalizedText) {
        for (locale, text) in &other.0 {
            match self.0.get_mut(locale) {
                Some(existing) if !existing.is_empty() => {
                    existing.push(' ');
                    existing.push_str(text);
                }
                _ => {
                    self.0.insert(locale.clone(), text.clone());
                }
            }
        }
    }
}

/// Who produced a transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Speaker {
    /// A named bot, board member, or other human in the room
    Participant(String),
    /// The local user
    Candidate,
    /// Client or backend notices, including surfaced errors
    System,
}

impl Speaker {
    pub fn display_name(&self) -> &str {
        match self {
            Speaker::Participant(name) => name,
            Speaker::Candidate => "You",
            Speaker::System => "System",
        }
    }
}

/// One turn of dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: LocalizedText,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(speaker: Speaker, text: LocalizedText) -> Self {
        Self {
            speaker,
            text,
            timestamp: Utc::now(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Speaker::System, LocalizedText::plain(text))
    }

    pub fn content(&self) -> &str {
        self.text.primary()
    }
}

/// Conversation in receipt order with same-speaker coalescing
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, merging it into the last entry when the speaker repeats
    ///
    /// Returns true when a new entry was started.
    pub fn push(&mut self, message: ChatMessage) -> bool {
        if let Some(last) = self.entries.last_mut() {
            if last.speaker == message.speaker {
                last.text.append(&message.text);
                last.timestamp = message.timestamp;
                return false;
            }
        }

        self.entries.push(message);
        true
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A named entity in a multi-party session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub active: bool,
}

/// Participant roster, unique by name
#[derive(Debug, Clone, Default, Serialize)]
pub struct Participants {
    members: Vec<Participant>,
    active_count: usize,
}

impl Participants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the name was already present
    pub fn join(&mut self, name: &str, reported_count: Option<usize>) -> bool {
        let added = if self.members.iter().any(|p| p.name == name) {
            false
        } else {
            self.members.push(Participant {
                name: name.to_string(),
                active: true,
            });
            self.active_count += 1;
            true
        };

        if let Some(count) = reported_count {
            self.active_count = count;
        }
        added
    }

    /// Returns false if the name was unknown
    pub fn leave(&mut self, name: &str, reported_count: Option<usize>) -> bool {
        let before = self.members.len();
        self.members.retain(|p| p.name != name);
        let removed = self.members.len() != before;
        if removed {
            self.active_count = self.active_count.saturating_sub(1);
        }

        if let Some(count) = reported_count {
            self.active_count = count;
        }
        removed
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|p| p.name == name)
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.active_count = 0;
    }
}
