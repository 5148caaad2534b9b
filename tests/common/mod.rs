// In-process WebSocket backend for session tests
//
// Every accepted connection is handed to the test as a `Peer`, which can read
// what the client sent and push frames back.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

pub struct MockBackend {
    pub base_url: String,
    peers: mpsc::UnboundedReceiver<Peer>,
}

pub struct Peer {
    inbound: mpsc::UnboundedReceiver<Message>,
    outbound: mpsc::UnboundedSender<Option<Message>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (peer_tx, peers) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };
                let (mut ws_tx, mut ws_rx) = ws.split();
                let (in_tx, inbound) = mpsc::unbounded_channel();
                let (outbound, mut out_rx) = mpsc::unbounded_channel::<Option<Message>>();

                tokio::spawn(async move {
                    while let Some(Ok(message)) = ws_rx.next().await {
                        if in_tx.send(message).is_err() {
                            break;
                        }
                    }
                });
                tokio::spawn(async move {
                    while let Some(next) = out_rx.recv().await {
                        match next {
                            Some(message) => {
                                if ws_tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                            None => {
                                let _ = ws_tx.close().await;
                                break;
                            }
                        }
                    }
                });

                if peer_tx.send(Peer { inbound, outbound }).is_err() {
                    break;
                }
            }
        });

        Self {
            base_url: format!("ws://{}", addr),
            peers,
        }
    }

    /// Endpoint for a mode path, e.g. `/gd-multi`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn accept(&mut self) -> Peer {
        tokio::time::timeout(WAIT, self.peers.recv())
            .await
            .expect("no client connected")
            .expect("backend stopped")
    }

    /// Whether a connection arrives within `within`
    pub async fn try_accept(&mut self, within: Duration) -> Option<Peer> {
        tokio::time::timeout(within, self.peers.recv()).await.ok().flatten()
    }
}

impl Peer {
    pub fn send_json(&self, value: Value) {
        self.outbound
            .send(Some(Message::Text(value.to_string().into())))
            .unwrap();
    }

    pub fn send_text(&self, text: &str) {
        self.outbound
            .send(Some(Message::Text(text.to_string().into())))
            .unwrap();
    }

    /// Close the socket from the server side
    pub fn close(&self) {
        let _ = self.outbound.send(None);
    }

    pub async fn recv(&mut self) -> Option<Message> {
        tokio::time::timeout(WAIT, self.inbound.recv())
            .await
            .ok()
            .flatten()
    }

    /// Next text frame parsed as JSON, skipping binary audio
    pub async fn recv_json(&mut self) -> Value {
        loop {
            match self.recv().await.expect("no frame from client") {
                Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
                Message::Close(_) => panic!("client closed the socket"),
                _ => continue,
            }
        }
    }

    /// Next JSON control frame whose discriminator is `kind`, skipping others
    pub async fn expect_control(&mut self, key: &str, kind: &str) -> Value {
        loop {
            let value = self.recv_json().await;
            if value[key] == kind {
                return value;
            }
        }
    }

    /// Everything already received, without waiting
    pub fn drain(&mut self) -> Vec<Message> {
        let mut frames = Vec::new();
        while let Ok(message) = self.inbound.try_recv() {
            frames.push(message);
        }
        frames
    }

    /// Wait until the client closes the socket
    pub async fn closed(&mut self) -> bool {
        loop {
            match tokio::time::timeout(WAIT, self.inbound.recv()).await {
                Ok(Some(Message::Close(_))) | Ok(None) => return true,
                Ok(Some(_)) => continue,
                Err(_) => return false,
            }
        }
    }
}

/// Poll `check` until it holds or the wait runs out
pub async fn eventually<F: FnMut() -> bool>(mut check: F) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
