//! Socket ownership for a session
//!
//! A supervisor task owns the WebSocket. It pumps queued outbound frames to
//! the socket and inbound frames to the session, and decides what happens
//! when the socket drops.

use futures::{SinkExt, StreamExt};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::client::Shared;
use super::state::ConnectionState;
use crate::error::{SessionError, SessionResult};
use crate::protocol::Frame;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Work queued for the socket
#[derive(Debug)]
pub(crate) enum Outbound {
    Frame(Frame),
    Close,
}

enum Ended {
    ByClient,
    Dropped(String),
}

fn to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(bytes) => Message::Binary(bytes.into()),
    }
}

pub(crate) async fn open_socket(endpoint: &str, timeout: Duration) -> SessionResult<WsStream> {
    match tokio::time::timeout(timeout, connect_async(endpoint)).await {
        Ok(Ok((stream, _response))) => Ok(stream),
        Ok(Err(e)) => Err(SessionError::Connection(format!(
            "failed to connect to {}: {}",
            endpoint, e
        ))),
        Err(_) => Err(SessionError::Connection(format!(
            "connecting to {} took longer than {}s",
            endpoint,
            timeout.as_secs_f32()
        ))),
    }
}

/// Run until the client closes the session or the socket is lost for good
pub(crate) async fn supervise(
    shared: Arc<Shared>,
    ws: WsStream,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
) {
    let mut ws = ws;

    loop {
        let reason = match pump(&shared, ws, &mut outbound_rx).await {
            Ended::ByClient => break,
            Ended::Dropped(reason) => reason,
        };

        if shared.closing.load(Ordering::SeqCst) {
            debug!("Socket closed during shutdown: {}", reason);
            break;
        }

        warn!("Connection to {} lost: {}", shared.endpoint, reason);
        match reconnect(&shared, reason).await {
            Some(next) => ws = next,
            None => break,
        }
    }

    shared.clear_outbound();
    shared.set_state(ConnectionState::Disconnected);
    info!("Connection task for session {} finished", shared.session_id);
}

async fn pump(
    shared: &Shared,
    ws: WsStream,
    outbound_rx: &mut mpsc::UnboundedReceiver<Outbound>,
) -> Ended {
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(Outbound::Frame(frame)) => {
                    if let Err(e) = ws_tx.send(to_message(frame)).await {
                        return Ended::Dropped(e.to_string());
                    }
                }
                Some(Outbound::Close) | None => {
                    debug!("Closing websocket to {}", shared.endpoint);
                    let _ = ws_tx.send(Message::Close(None)).await;
                    let _ = ws_tx.close().await;
                    return Ended::ByClient;
                }
            },
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Text(text))) => shared.handle_frame(text.as_str()),
                Some(Ok(Message::Binary(bytes))) => {
                    debug!("Ignoring {} byte binary frame", bytes.len());
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = match frame {
                        Some(frame) => format!("closed by server: {} {}", frame.code, frame.reason),
                        None => "closed by server".to_string(),
                    };
                    return Ended::Dropped(reason);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Ended::Dropped(e.to_string()),
                None => return Ended::Dropped("connection closed".to_string()),
            },
        }
    }
}

async fn reconnect(shared: &Shared, reason: String) -> Option<WsStream> {
    let mut last_error = reason;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let Some(delay) = shared.config.reconnect.delay(attempt) else {
            shared.report_error(SessionError::Connection(last_error));
            return None;
        };

        shared.set_state(ConnectionState::Connecting);
        info!(
            "Reconnecting to {} in {}ms (attempt {})",
            shared.endpoint,
            delay.as_millis(),
            attempt
        );
        tokio::time::sleep(delay).await;

        if shared.closing.load(Ordering::SeqCst) {
            return None;
        }

        let mut ws = match open_socket(&shared.endpoint, shared.config.connect_timeout).await {
            Ok(ws) => ws,
            Err(e) => {
                last_error = e.to_string();
                continue;
            }
        };

        // Replay configuration so the backend rebuilds the session
        if let Some(configure) = shared.last_configure() {
            if let Err(e) = ws.send(to_message(configure)).await {
                last_error = e.to_string();
                continue;
            }
        }

        shared.set_state(ConnectionState::Connected);
        info!("Reconnected to {}", shared.endpoint);
        return Some(ws);
    }
}
