use anyhow::{bail, Result};
use tokio::sync::mpsc;

use super::backend::{AudioBackend, AudioFrame};

/// Frames supplied by the embedding application's own capture pipeline
pub struct ChannelBackend {
    rx: Option<mpsc::Receiver<AudioFrame>>,
    capturing: bool,
}

impl ChannelBackend {
    pub fn new(rx: mpsc::Receiver<AudioFrame>) -> Self {
        Self {
            rx: Some(rx),
            capturing: false,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for ChannelBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        match self.rx.take() {
            Some(rx) => {
                self.capturing = true;
                Ok(rx)
            }
            None => bail!("Channel source can only be started once"),
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "channel"
    }
}
