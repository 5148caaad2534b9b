use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::connection::{self, Outbound};
use super::events::{
    LanguagePrompt, ParticipantEvent, Question, SessionEvent, SetupInfo, Summary,
};
use super::listeners::{Listeners, Subscription};
use super::state::{ConnectionState, SessionView};
use super::stats::{SessionInfo, SessionStats};
use super::transcript::{ChatMessage, LocalizedText, Participants, Speaker, Transcript};
use crate::audio::{
    AudioBackendFactory, AudioCapture, AudioGate, AudioLevel, AudioSource, CaptureCounters,
    LevelMeter,
};
use crate::error::{SessionError, SessionResult};
use crate::modes::{Capabilities, Mode, ModeConfig, ModeDescriptor};
use crate::protocol::{Codec, ControlMessage, Frame};

const CLOSE_GRACE: Duration = Duration::from_secs(2);
const QUESTION_SPEAKER: &str = "Interviewer";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Whether a mode's backend ever sends this kind of event
fn speaks(capabilities: &Capabilities, event: &SessionEvent) -> bool {
    match event {
        SessionEvent::Participant(_) => capabilities.participants,
        SessionEvent::LanguagePrompt(_) => capabilities.language_prompt,
        SessionEvent::SetupInfo(_) => capabilities.setup_info,
        _ => true,
    }
}

/// State shared between the client handle, the connection task, and the
/// capture sink
pub(crate) struct Shared {
    pub(crate) session_id: String,
    pub(crate) mode: Mode,
    pub(crate) endpoint: String,
    pub(crate) config: SessionConfig,
    codec: Codec,
    started_at: DateTime<Utc>,

    state_tx: watch::Sender<ConnectionState>,
    /// Bumped on every summary event
    summary_seq: watch::Sender<u64>,
    pub(crate) listeners: Listeners,

    transcript: Mutex<Transcript>,
    participants: Mutex<Participants>,
    session_code: Mutex<Option<String>>,
    last_summary: Mutex<Option<Summary>>,
    last_configure: Mutex<Option<Frame>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Outbound>>>,

    muted: Arc<AtomicBool>,
    /// Backend reported a muted or paused microphone; shown, never gates
    remote_muted: AtomicBool,
    /// The user asked to record; capture may still be gated
    recording_requested: AtomicBool,
    /// Set by disconnect/end so a socket drop is not reported or retried
    pub(crate) closing: AtomicBool,
    events_received: AtomicU64,
    counters: Arc<CaptureCounters>,
    meter: LevelMeter,
}

impl Shared {
    fn descriptor(&self) -> &'static ModeDescriptor {
        self.codec.descriptor()
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Publish a new phase; listeners only hear about actual changes
    pub(crate) fn set_state(&self, next: ConnectionState) {
        self.update_state(|_| next);
    }

    fn update_state(&self, f: impl FnOnce(&ConnectionState) -> ConnectionState) {
        let mut changed: Option<ConnectionState> = None;
        self.state_tx.send_if_modified(|current| {
            let next = f(current);
            if *current == next {
                return false;
            }
            debug!("Session {}: {} -> {}", self.session_id, current, next);
            *current = next.clone();
            changed = Some(next);
            true
        });

        if let Some(state) = changed {
            self.listeners.status.emit(&state);
        }
    }

    pub(crate) fn last_configure(&self) -> Option<Frame> {
        lock(&self.last_configure).clone()
    }

    pub(crate) fn clear_outbound(&self) {
        lock(&self.outbound).take();
    }

    fn send(&self, frame: Frame) -> SessionResult<()> {
        match lock(&self.outbound).as_ref() {
            Some(tx) => tx
                .send(Outbound::Frame(frame))
                .map_err(|_| SessionError::NotConnected),
            None => Err(SessionError::NotConnected),
        }
    }

    fn send_control(&self, message: &ControlMessage) -> SessionResult<()> {
        self.send(self.codec.encode_control(message))
    }

    /// Log, record inline when it belongs in the conversation, and notify
    pub(crate) fn report_error(&self, err: SessionError) {
        error!("Session {}: {}", self.session_id, err);

        if matches!(err, SessionError::Remote(_) | SessionError::Connection(_)) {
            lock(&self.transcript).push(ChatMessage::system(err.to_string()));
        }
        self.listeners.error.emit(&err);
    }

    pub(crate) fn handle_frame(&self, text: &str) {
        match self.codec.decode(text) {
            Ok(event) => {
                self.events_received.fetch_add(1, Ordering::SeqCst);
                self.handle_event(event);
            }
            Err(e) => warn!("Session {}: ignoring frame: {}", self.session_id, e),
        }
    }

    fn handle_event(&self, event: SessionEvent) {
        if !speaks(&self.descriptor().capabilities, &event) {
            debug!(
                "Session {}: {} sessions do not use {} events; ignored",
                self.session_id,
                self.mode,
                event.kind()
            );
            return;
        }

        match event {
            SessionEvent::Status {
                status,
                session_code,
            } => {
                if let Some(code) = session_code {
                    info!("Session {} assigned code {}", self.session_id, code);
                    *lock(&self.session_code) = Some(code);
                }
                if status.is_mute() {
                    self.remote_muted.store(true, Ordering::SeqCst);
                } else if status.resumes_audio() {
                    self.remote_muted.store(false, Ordering::SeqCst);
                }

                let recording = self.recording_requested.load(Ordering::SeqCst);
                self.update_state(|current| {
                    let next = current.on_remote_status(&status);
                    if recording {
                        next.on_recording_started()
                    } else {
                        next
                    }
                });
            }
            SessionEvent::Message(message) => {
                lock(&self.transcript).push(message.clone());
                self.update_state(ConnectionState::on_turn);
                self.listeners.message.emit(&message);
            }
            SessionEvent::Question(question) => {
                let speaker = question
                    .asked_by
                    .clone()
                    .unwrap_or_else(|| QUESTION_SPEAKER.to_string());
                lock(&self.transcript).push(ChatMessage::new(
                    Speaker::Participant(speaker),
                    question.text.clone(),
                ));
                self.update_state(ConnectionState::on_turn);
                self.listeners.question.emit(&question);
            }
            SessionEvent::Participant(event) => {
                {
                    let mut roster = lock(&self.participants);
                    match &event {
                        ParticipantEvent::Joined { name, active_count } => {
                            roster.join(name, *active_count);
                        }
                        ParticipantEvent::Left { name, active_count } => {
                            roster.leave(name, *active_count);
                        }
                    }
                }
                self.listeners.participant.emit(&event);
            }
            SessionEvent::LanguagePrompt(prompt) => {
                info!(
                    "Session {}: backend asks for a language ({})",
                    self.session_id,
                    prompt.options.join(", ")
                );
                self.listeners.language_prompt.emit(&prompt);
            }
            SessionEvent::Error(message) => {
                // A rejection before readiness fails the pending configure
                self.update_state(|current| match current {
                    ConnectionState::Connecting | ConnectionState::Connected => {
                        ConnectionState::Error(message.clone())
                    }
                    other => other.clone(),
                });
                self.report_error(SessionError::Remote(message));
            }
            SessionEvent::Summary(summary) => {
                *lock(&self.last_summary) = Some(summary.clone());
                self.summary_seq.send_modify(|seq| *seq += 1);
                self.listeners.summary.emit(&summary);
            }
            SessionEvent::SetupInfo(info) => {
                self.listeners.setup_info.emit(&info);
            }
        }
    }
}

/// Client for one interview session against one backend endpoint
///
/// `C` is the configuration shape the mode accepts. All operations take
/// `&self`, so the client can be shared behind an `Arc`.
pub struct SessionClient<C: ModeConfig> {
    shared: Arc<Shared>,
    capture: tokio::sync::Mutex<Option<AudioCapture>>,
    connection: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    ended: AtomicBool,
    _config: PhantomData<fn(C)>,
}

impl<C: ModeConfig> SessionClient<C> {
    /// Create a client; nothing is opened until `configure`
    pub fn new(mode: Mode, endpoint: impl Into<String>, config: SessionConfig) -> SessionResult<Self> {
        if !C::supports(mode) {
            return Err(SessionError::Validation(format!(
                "{} does not configure {} sessions",
                std::any::type_name::<C>(),
                mode
            )));
        }

        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (summary_seq, _) = watch::channel(0u64);
        let session_id = format!("{}-{}", mode.name(), uuid::Uuid::new_v4());

        let shared = Shared {
            session_id,
            mode,
            endpoint: endpoint.into(),
            config,
            codec: Codec::new(mode.descriptor()),
            started_at: Utc::now(),
            state_tx,
            summary_seq,
            listeners: Listeners::default(),
            transcript: Mutex::new(Transcript::new()),
            participants: Mutex::new(Participants::new()),
            session_code: Mutex::new(None),
            last_summary: Mutex::new(None),
            last_configure: Mutex::new(None),
            outbound: Mutex::new(None),
            muted: Arc::new(AtomicBool::new(false)),
            remote_muted: AtomicBool::new(false),
            recording_requested: AtomicBool::new(false),
            closing: AtomicBool::new(false),
            events_received: AtomicU64::new(0),
            counters: Arc::new(CaptureCounters::default()),
            meter: LevelMeter::new(),
        };

        info!("Created {} session {}", mode, shared.session_id);

        Ok(Self {
            shared: Arc::new(shared),
            capture: tokio::sync::Mutex::new(None),
            connection: tokio::sync::Mutex::new(None),
            ended: AtomicBool::new(false),
            _config: PhantomData,
        })
    }

    /// Client pointed at the endpoint configured for `mode`
    pub fn for_mode(mode: Mode, app: &crate::config::Config) -> SessionResult<Self> {
        Self::new(mode, app.endpoint_for(mode), app.session_config())
    }

    pub fn session_id(&self) -> &str {
        &self.shared.session_id
    }

    pub fn mode(&self) -> Mode {
        self.shared.mode
    }

    pub fn endpoint(&self) -> &str {
        &self.shared.endpoint
    }

    /// Validate, connect if needed, send the configuration, and wait for the
    /// backend to report readiness
    pub async fn configure(&self, config: &C) -> SessionResult<SessionInfo> {
        config.validate()?;

        let message = ControlMessage::configure(config)
            .map_err(|e| SessionError::Validation(e.to_string()))?;
        let frame = self.shared.codec.encode_control(&message);

        self.ended.store(false, Ordering::SeqCst);
        self.shared.closing.store(false, Ordering::SeqCst);
        *lock(&self.shared.last_configure) = Some(frame.clone());

        self.ensure_connected().await?;

        // Reconfiguring restarts the handshake from the socket-open phase
        self.shared.set_state(ConnectionState::Connected);
        let mut state_rx = self.shared.state_tx.subscribe();
        self.shared.send(frame)?;
        info!("Sent configuration for session {}", self.shared.session_id);

        let wait = async {
            loop {
                {
                    let state = state_rx.borrow_and_update();
                    if state.is_configured() {
                        return Ok(());
                    }
                    match &*state {
                        ConnectionState::Error(message) => {
                            return Err(SessionError::Remote(message.clone()))
                        }
                        ConnectionState::Disconnected => {
                            return Err(SessionError::Connection(
                                "connection closed during configuration".to_string(),
                            ))
                        }
                        _ => {}
                    }
                }
                if state_rx.changed().await.is_err() {
                    return Err(SessionError::NotConnected);
                }
            }
        };

        let window = self.shared.config.configure_timeout;
        match tokio::time::timeout(window, wait).await {
            Ok(result) => result?,
            Err(_) => {
                let err = SessionError::Timeout {
                    what: "configuration acknowledgement",
                    after: window,
                };
                self.shared.report_error(err.clone());
                return Err(err);
            }
        }

        info!(
            "Session {} ready ({})",
            self.shared.session_id,
            self.shared.state()
        );

        Ok(SessionInfo {
            session_id: self.shared.session_id.clone(),
            mode: self.shared.mode,
            endpoint: self.shared.endpoint.clone(),
            session_code: self.session_code(),
        })
    }

    async fn ensure_connected(&self) -> SessionResult<()> {
        let mut connection = self.connection.lock().await;
        if let Some(handle) = connection.as_ref() {
            if !handle.is_finished() && lock(&self.shared.outbound).is_some() {
                return Ok(());
            }
        }

        self.shared.set_state(ConnectionState::Connecting);
        info!("Connecting to {}", self.shared.endpoint);

        let ws = match connection::open_socket(
            &self.shared.endpoint,
            self.shared.config.connect_timeout,
        )
        .await
        {
            Ok(ws) => ws,
            Err(e) => {
                self.shared.report_error(e.clone());
                self.shared.set_state(ConnectionState::Disconnected);
                return Err(e);
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&self.shared.outbound) = Some(tx);
        self.shared.set_state(ConnectionState::Connected);
        info!("Connected to {}", self.shared.endpoint);

        *connection = Some(tokio::spawn(connection::supervise(
            Arc::clone(&self.shared),
            ws,
            rx,
        )));
        Ok(())
    }

    /// Acquire `source` and stream it while the gate is open
    ///
    /// Frames captured before the backend reports readiness, or while
    /// muted, are dropped rather than sent.
    pub async fn start_recording(&self, source: AudioSource) -> SessionResult<()> {
        if !self.shared.state().is_open() || lock(&self.shared.outbound).is_none() {
            return Err(SessionError::NotConnected);
        }

        let mut capture = self.capture.lock().await;
        if capture.is_some() {
            warn!("Recording already started");
            return Ok(());
        }

        let backend = AudioBackendFactory::create(source, self.shared.config.audio.clone())
            .map_err(|e| SessionError::Audio(format!("{:#}", e)))?;

        self.shared.recording_requested.store(true, Ordering::SeqCst);

        let sink_shared = Arc::clone(&self.shared);
        let gate = AudioGate::new(
            Arc::clone(&self.shared.muted),
            self.shared.state_tx.subscribe(),
        );

        let started = AudioCapture::start(
            backend,
            self.shared.config.audio.clone(),
            gate,
            self.shared.meter.clone(),
            Arc::clone(&self.shared.counters),
            Box::new(move |pcm: Vec<u8>| {
                sink_shared
                    .send(sink_shared.codec.encode_audio(&pcm))
                    .is_ok()
            }),
        )
        .await;

        match started {
            Ok(started) => *capture = Some(started),
            Err(e) => {
                self.shared.recording_requested.store(false, Ordering::SeqCst);
                let err = SessionError::Audio(format!("{:#}", e));
                self.shared.report_error(err.clone());
                return Err(err);
            }
        }

        if self.shared.descriptor().capabilities.recording_controls {
            self.shared.send_control(&ControlMessage::StartRecording)?;
        }
        self.shared.update_state(ConnectionState::on_recording_started);
        info!("Recording started for session {}", self.shared.session_id);
        Ok(())
    }

    /// Release the audio source; a no-op when not recording
    pub async fn stop_recording(&self) -> SessionResult<()> {
        self.shared.recording_requested.store(false, Ordering::SeqCst);
        self.shared.muted.store(false, Ordering::SeqCst);

        let Some(capture) = self.capture.lock().await.take() else {
            return Ok(());
        };
        capture.stop().await;

        if self.shared.descriptor().capabilities.recording_controls {
            if let Err(e) = self.shared.send_control(&ControlMessage::StopRecording) {
                debug!("Stop-recording message not sent: {}", e);
            }
        }
        self.shared.update_state(ConnectionState::on_recording_stopped);
        info!("Recording stopped for session {}", self.shared.session_id);
        Ok(())
    }

    /// Mute: keep capturing but stop forwarding
    pub fn pause_audio(&self) {
        if self.shared.muted.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Session {} muted", self.shared.session_id);
        if self.shared.descriptor().capabilities.mute_controls {
            if let Err(e) = self.shared.send_control(&ControlMessage::PauseAudio) {
                debug!("Pause message not sent: {}", e);
            }
        }
    }

    pub fn resume_audio(&self) {
        if !self.shared.muted.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Session {} unmuted", self.shared.session_id);
        if self.shared.descriptor().capabilities.mute_controls {
            if let Err(e) = self.shared.send_control(&ControlMessage::ResumeAudio) {
                debug!("Resume message not sent: {}", e);
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        self.shared.muted.load(Ordering::SeqCst)
    }

    /// Answer a language prompt; only logs if the socket is gone
    pub fn select_language(&self, language: &str) {
        let message = ControlMessage::SelectLanguage(language.to_string());
        match self.shared.send_control(&message) {
            Ok(()) => info!(
                "Session {}: selected language {}",
                self.shared.session_id, language
            ),
            Err(e) => warn!(
                "Session {}: cannot select language {}: {}",
                self.shared.session_id, language, e
            ),
        }
    }

    /// Typed answer instead of speech
    pub fn submit_text_answer(&self, text: &str) -> SessionResult<()> {
        let descriptor = self.shared.descriptor();
        if !descriptor.capabilities.text_answers {
            return Err(SessionError::Unsupported {
                mode: descriptor.name,
                operation: "text answers",
            });
        }

        let answer = text.trim();
        if answer.is_empty() {
            return Err(SessionError::Validation("answer is empty".to_string()));
        }

        self.shared
            .send_control(&ControlMessage::SubmitTextAnswer(answer.to_string()))?;
        lock(&self.shared.transcript).push(ChatMessage::new(
            Speaker::Candidate,
            LocalizedText::plain(answer),
        ));
        Ok(())
    }

    /// Ask for the final analysis; it arrives through the summary listeners
    ///
    /// If nothing arrives within the summary window a single timeout error
    /// is reported. The request itself stays outstanding.
    pub fn request_summary(&self) -> SessionResult<()> {
        let mut summary_rx = self.shared.summary_seq.subscribe();
        summary_rx.borrow_and_update();

        self.shared.send_control(&ControlMessage::RequestSummary)?;
        info!("Summary requested for session {}", self.shared.session_id);

        let shared = Arc::clone(&self.shared);
        let window = shared.config.summary_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(window, summary_rx.changed()).await {
                Ok(_) => debug!("Summary arrived for session {}", shared.session_id),
                Err(_) => {
                    if !shared.closing.load(Ordering::SeqCst) {
                        shared.report_error(SessionError::Timeout {
                            what: "summary",
                            after: window,
                        });
                    }
                }
            }
        });

        Ok(())
    }

    /// Finish the interview: stop audio, ask the backend to wrap up, wait for
    /// its summary, then close
    ///
    /// Later calls return `Ok(None)` without touching the session.
    pub async fn end_interview(&self) -> SessionResult<Option<Summary>> {
        if self.ended.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }

        info!("Ending session {}", self.shared.session_id);
        self.shared.closing.store(true, Ordering::SeqCst);
        self.stop_recording().await?;

        let mut summary_rx = self.shared.summary_seq.subscribe();
        summary_rx.borrow_and_update();

        let result = match self.shared.send_control(&ControlMessage::EndInterview) {
            Err(e) => {
                debug!("End message not sent: {}", e);
                Ok(None)
            }
            Ok(()) => {
                let window = self.shared.config.end_summary_timeout;
                match tokio::time::timeout(window, summary_rx.changed()).await {
                    Ok(_) => Ok(self.summary()),
                    Err(_) => {
                        let err = SessionError::Timeout {
                            what: "summary",
                            after: window,
                        };
                        self.shared.report_error(err.clone());
                        Err(err)
                    }
                }
            }
        };

        self.disconnect().await;
        result
    }

    /// Stop audio and close the socket; safe to call repeatedly
    pub async fn disconnect(&self) {
        self.shared.closing.store(true, Ordering::SeqCst);
        self.shared.recording_requested.store(false, Ordering::SeqCst);
        self.shared.muted.store(false, Ordering::SeqCst);

        if let Some(capture) = self.capture.lock().await.take() {
            capture.stop().await;
        }

        let Some(mut handle) = self.connection.lock().await.take() else {
            return;
        };

        if let Some(tx) = lock(&self.shared.outbound).take() {
            let _ = tx.send(Outbound::Close);
        }
        if tokio::time::timeout(CLOSE_GRACE, &mut handle).await.is_err() {
            warn!("Connection task did not finish in time; aborting");
            handle.abort();
        }

        self.shared.set_state(ConnectionState::Disconnected);
        info!("Session {} disconnected", self.shared.session_id);
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    pub fn view(&self) -> SessionView {
        SessionView::project(
            &self.shared.state(),
            self.is_muted() || self.shared.remote_muted.load(Ordering::SeqCst),
            self.shared.recording_requested.load(Ordering::SeqCst),
        )
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        lock(&self.shared.transcript).entries().to_vec()
    }

    pub fn participants(&self) -> Participants {
        lock(&self.shared.participants).clone()
    }

    pub fn session_code(&self) -> Option<String> {
        lock(&self.shared.session_code).clone()
    }

    /// Most recent summary, if one has arrived
    pub fn summary(&self) -> Option<Summary> {
        lock(&self.shared.last_summary).clone()
    }

    /// Live input level for a waveform display
    pub fn level(&self) -> watch::Receiver<AudioLevel> {
        self.shared.meter.subscribe()
    }

    pub fn stats(&self) -> SessionStats {
        let counts = self.shared.counters.snapshot();
        let duration = Utc::now().signed_duration_since(self.shared.started_at);

        SessionStats {
            session_id: self.shared.session_id.clone(),
            mode: self.shared.mode,
            phase: self.shared.state().label().to_string(),
            started_at: self.shared.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            frames_sent: counts.frames_sent,
            frames_dropped: counts.frames_dropped,
            bytes_sent: counts.bytes_sent,
            events_received: self.shared.events_received.load(Ordering::SeqCst),
            transcript_entries: lock(&self.shared.transcript).len(),
            active_participants: lock(&self.shared.participants).active_count(),
        }
    }

    pub fn on_message<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        self.shared.listeners.message.subscribe(callback)
    }

    pub fn on_status_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConnectionState) + Send + Sync + 'static,
    {
        self.shared.listeners.status.subscribe(callback)
    }

    pub fn on_error<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SessionError) + Send + Sync + 'static,
    {
        self.shared.listeners.error.subscribe(callback)
    }

    pub fn on_participant<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ParticipantEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.participant.subscribe(callback)
    }

    pub fn on_language_prompt<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LanguagePrompt) + Send + Sync + 'static,
    {
        self.shared.listeners.language_prompt.subscribe(callback)
    }

    /// Summary or analysis, depending on what the mode calls it
    pub fn on_summary<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Summary) + Send + Sync + 'static,
    {
        self.shared.listeners.summary.subscribe(callback)
    }

    pub fn on_question<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Question) + Send + Sync + 'static,
    {
        self.shared.listeners.question.subscribe(callback)
    }

    pub fn on_setup_info<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SetupInfo) + Send + Sync + 'static,
    {
        self.shared.listeners.setup_info.subscribe(callback)
    }
}

impl<C: ModeConfig> Drop for SessionClient<C> {
    fn drop(&mut self) {
        self.shared.closing.store(true, Ordering::SeqCst);
        if let Some(tx) = lock(&self.shared.outbound).take() {
            let _ = tx.send(Outbound::Close);
        }
    }
}
