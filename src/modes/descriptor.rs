/// How captured audio goes over the socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// JSON text frame `{<key>: type_value, <field>: base64(pcm)}`
    Base64Json {
        type_value: &'static str,
        field: &'static str,
    },
    /// Raw little-endian PCM in a binary frame
    Binary,
}

/// Optional parts of the control/event vocabulary a backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub participants: bool,
    pub language_prompt: bool,
    pub text_answers: bool,
    pub setup_info: bool,
    /// Backend expects explicit start/stop recording messages
    pub recording_controls: bool,
    /// Backend expects pause/resume messages on mute
    pub mute_controls: bool,
}

/// Everything that differs between interview backends
///
/// The session client and codec are written once against this; each mode
/// only supplies its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDescriptor {
    pub name: &'static str,
    /// Path appended to the configured base URL
    pub path: &'static str,
    /// Key naming the control message kind in outbound frames
    pub outbound_key: &'static str,
    pub audio: AudioEncoding,
    pub speaker_field: &'static str,
    pub text_field: &'static str,
    /// Key carrying the server-assigned session code
    pub code_field: &'static str,
    pub summary_request: &'static str,
    pub end_request: &'static str,
    /// Speaker assigned to non-JSON text frames; None rejects them
    pub bare_text_speaker: Option<&'static str>,
    pub capabilities: Capabilities,
}

impl ModeDescriptor {
    pub fn endpoint(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}

pub static GROUP_DISCUSSION: ModeDescriptor = ModeDescriptor {
    name: "group-discussion",
    path: "/gd-multi",
    outbound_key: "type",
    audio: AudioEncoding::Base64Json {
        type_value: "audio",
        field: "data",
    },
    speaker_field: "name",
    text_field: "content",
    code_field: "discussion_code",
    summary_request: "request_summary",
    end_request: "end_discussion",
    bare_text_speaker: None,
    capabilities: Capabilities {
        participants: true,
        language_prompt: false,
        text_answers: false,
        setup_info: false,
        recording_controls: true,
        mute_controls: true,
    },
};

const CANDIDATE_CAPABILITIES: Capabilities = Capabilities {
    participants: false,
    language_prompt: false,
    text_answers: false,
    setup_info: false,
    recording_controls: true,
    mute_controls: false,
};

pub static HCS: ModeDescriptor = ModeDescriptor {
    name: "hcs",
    path: "/hcs",
    outbound_key: "action",
    audio: AudioEncoding::Binary,
    speaker_field: "speaker",
    text_field: "text",
    code_field: "session_id",
    summary_request: "request_analysis",
    end_request: "end_interview",
    bare_text_speaker: None,
    capabilities: CANDIDATE_CAPABILITIES,
};

pub static PCS: ModeDescriptor = ModeDescriptor {
    name: "pcs",
    path: "/pcs",
    outbound_key: "action",
    audio: AudioEncoding::Binary,
    speaker_field: "speaker",
    text_field: "text",
    code_field: "session_id",
    summary_request: "request_analysis",
    end_request: "end_interview",
    bare_text_speaker: None,
    capabilities: CANDIDATE_CAPABILITIES,
};

pub static UPSC_MAIN: ModeDescriptor = ModeDescriptor {
    name: "upsc-main",
    path: "/upsc-main/",
    outbound_key: "type",
    audio: AudioEncoding::Base64Json {
        type_value: "audio_chunk",
        field: "audio",
    },
    speaker_field: "member",
    text_field: "question",
    code_field: "session_id",
    summary_request: "request_analysis",
    end_request: "end_interview",
    bare_text_speaker: None,
    capabilities: Capabilities {
        participants: false,
        language_prompt: false,
        text_answers: true,
        setup_info: true,
        recording_controls: true,
        mute_controls: false,
    },
};

const SUBJECT_CAPABILITIES: Capabilities = Capabilities {
    participants: false,
    language_prompt: true,
    text_answers: false,
    setup_info: false,
    recording_controls: true,
    mute_controls: true,
};

pub static CSAT: ModeDescriptor = ModeDescriptor {
    name: "csat",
    path: "/upsc-csat",
    outbound_key: "type",
    audio: AudioEncoding::Base64Json {
        type_value: "audio",
        field: "data",
    },
    speaker_field: "speaker",
    text_field: "text",
    code_field: "session_id",
    summary_request: "request_summary",
    end_request: "end_interview",
    bare_text_speaker: None,
    capabilities: SUBJECT_CAPABILITIES,
};

pub static POLITY: ModeDescriptor = ModeDescriptor {
    name: "polity",
    path: "/upsc-polity",
    outbound_key: "type",
    audio: AudioEncoding::Base64Json {
        type_value: "audio",
        field: "data",
    },
    speaker_field: "speaker",
    text_field: "text",
    code_field: "session_id",
    summary_request: "request_summary",
    end_request: "end_interview",
    bare_text_speaker: None,
    capabilities: SUBJECT_CAPABILITIES,
};

pub static PRACTICE: ModeDescriptor = ModeDescriptor {
    name: "practice",
    path: "/practice",
    outbound_key: "type",
    audio: AudioEncoding::Binary,
    speaker_field: "speaker",
    text_field: "text",
    code_field: "session_id",
    summary_request: "request_summary",
    end_request: "end_interview",
    bare_text_speaker: Some("Interviewer"),
    capabilities: Capabilities {
        participants: false,
        language_prompt: false,
        text_answers: false,
        setup_info: false,
        recording_controls: false,
        mute_controls: false,
    },
};
