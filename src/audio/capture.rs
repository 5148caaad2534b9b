use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig};
use super::convert;
use super::level::LevelMeter;
use crate::session::ConnectionState;

/// Decides whether a captured frame may leave the client
///
/// Closed while muted or while the session phase does not accept audio.
#[derive(Clone)]
pub struct AudioGate {
    muted: Arc<AtomicBool>,
    state: watch::Receiver<ConnectionState>,
}

impl AudioGate {
    pub fn new(muted: Arc<AtomicBool>, state: watch::Receiver<ConnectionState>) -> Self {
        Self { muted, state }
    }

    pub fn is_open(&self) -> bool {
        !self.muted.load(Ordering::SeqCst) && self.state.borrow().accepts_audio()
    }
}

/// Forwarded/dropped frame counters shared with the session
#[derive(Debug, Default)]
pub struct CaptureCounters {
    pub frames_sent: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub bytes_sent: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaptureCounts {
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub bytes_sent: u64,
}

impl CaptureCounters {
    pub fn snapshot(&self) -> CaptureCounts {
        CaptureCounts {
            frames_sent: self.frames_sent.load(Ordering::SeqCst),
            frames_dropped: self.frames_dropped.load(Ordering::SeqCst),
            bytes_sent: self.bytes_sent.load(Ordering::SeqCst),
        }
    }
}

/// Receives PCM bytes that passed the gate; returns false once the sink is gone
pub type PcmSink = Box<dyn Fn(Vec<u8>) -> bool + Send + Sync>;

/// A running capture pipeline
///
/// The forwarding task owns the backend and always stops it on exit, whether
/// the capture was stopped explicitly, dropped, or the sink went away.
pub struct AudioCapture {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    backend_name: String,
}

impl AudioCapture {
    pub async fn start(
        mut backend: Box<dyn AudioBackend>,
        target: AudioBackendConfig,
        gate: AudioGate,
        meter: LevelMeter,
        counters: Arc<CaptureCounters>,
        sink: PcmSink,
    ) -> Result<Self> {
        let backend_name = backend.name().to_string();
        let mut audio_rx = backend
            .start()
            .await
            .with_context(|| format!("Failed to start {} capture", backend_name))?;

        info!("Audio capture started ({})", backend_name);

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let task_name = backend_name.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    frame = audio_rx.recv() => {
                        let Some(frame) = frame else {
                            debug!("{} source ended", task_name);
                            break;
                        };

                        let frame = convert::to_target(frame, &target);
                        meter.publish(&frame);

                        if !gate.is_open() {
                            counters.frames_dropped.fetch_add(1, Ordering::SeqCst);
                            continue;
                        }

                        let pcm = frame.pcm_bytes();
                        let len = pcm.len() as u64;
                        if !sink(pcm) {
                            warn!("Audio sink closed; stopping capture");
                            break;
                        }
                        counters.frames_sent.fetch_add(1, Ordering::SeqCst);
                        counters.bytes_sent.fetch_add(len, Ordering::SeqCst);
                    }
                }
            }

            meter.reset();
            if let Err(e) = backend.stop().await {
                error!("Failed to stop {} backend: {}", task_name, e);
            }
            info!("Audio capture stopped ({})", task_name);
        });

        Ok(Self {
            stop_tx: Some(stop_tx),
            task: Some(task),
            backend_name,
        })
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Whether the forwarding task is still running
    pub fn is_active(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Stop forwarding and wait until the backend has been released
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Audio capture task panicked: {}", e);
            }
        }
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}
