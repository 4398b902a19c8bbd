//! Owned handle to one open WebSocket connection.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::config::TransportConfig;
use super::io::{io_loop, Heartbeat};
use super::FrameHandler;
use crate::error::TransportError;
use crate::protocol::OutboundFrame;

/// A completed WebSocket handshake whose I/O task has not started yet.
///
/// Nothing is read from the socket until [`Handshake::start`], so the caller
/// can install the resulting [`Connection`] before any frame is dispatched.
pub struct Handshake {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    heartbeat: Heartbeat,
    close_timeout: Duration,
}

impl Handshake {
    /// Hand the socket to a new I/O task that pushes frames to `handler`.
    pub fn start(self, handler: Arc<dyn FrameHandler>) -> Connection {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(io_loop(self.ws, outbound_rx, shutdown_rx, handler, self.heartbeat));

        Connection {
            outbound: outbound_tx,
            shutdown: Some(shutdown_tx),
            task,
            close_timeout: self.close_timeout,
        }
    }
}

/// One open channel to the backend.
///
/// Inbound frames are pushed to the [`FrameHandler`] given to [`Handshake::start`];
/// the handler is owned by this connection alone and released with it.
pub struct Connection {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    close_timeout: Duration,
}

impl Connection {
    /// Perform the WebSocket handshake. The I/O task is started separately.
    pub async fn open(config: &TransportConfig, credential: &str) -> Result<Handshake, TransportError> {
        let url = config.ws_url(credential);
        info!(url = %config.endpoint(), "Opening chat connection");

        let ws = match tokio::time::timeout(
            config.connect_timeout,
            tokio_tungstenite::connect_async(url.as_str()),
        )
        .await
        {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                let err = classify_handshake_error(e);
                warn!(error = %err, "Chat handshake failed");
                return Err(err);
            }
            Err(_elapsed) => {
                warn!(timeout = ?config.connect_timeout, "Chat handshake timed out");
                return Err(TransportError::NetworkUnavailable(format!(
                    "handshake timed out after {:?}",
                    config.connect_timeout
                )));
            }
        };

        Ok(Handshake {
            ws,
            heartbeat: Heartbeat {
                interval: config.heartbeat_interval,
                timeout: config.heartbeat_timeout,
            },
            close_timeout: config.close_timeout,
        })
    }

    /// Queue a frame for sending. Fails once the I/O task has stopped.
    pub fn send(&self, frame: OutboundFrame) -> Result<(), TransportError> {
        self.outbound
            .send(frame)
            .map_err(|_| TransportError::NotConnected)
    }

    /// Close the socket and wait for the I/O task to release it.
    ///
    /// The task is aborted if it does not finish within the close timeout.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match tokio::time::timeout(self.close_timeout, &mut self.task).await {
            Ok(_) => debug!("Chat connection closed"),
            Err(_elapsed) => {
                warn!(timeout = ?self.close_timeout, "Chat connection did not close in time; aborting");
                self.task.abort();
                let _ = (&mut self.task).await;
            }
        }
    }

    /// Tear the I/O task down immediately, without a close handshake.
    pub fn abort(&self) {
        self.task.abort();
    }
}

fn classify_handshake_error(err: WsError) -> TransportError {
    match err {
        WsError::Http(response) => {
            let status = response.status();
            match status.as_u16() {
                401 | 403 => TransportError::AuthRejected(format!("HTTP {status}")),
                _ => TransportError::NetworkUnavailable(format!("HTTP {status}")),
            }
        }
        other => TransportError::NetworkUnavailable(other.to_string()),
    }
}
