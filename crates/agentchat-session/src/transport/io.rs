//! Background I/O task: outbound queue, inbound dispatch and heartbeat.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};

use super::{CloseReason, FrameHandler};
use crate::error::TransportError;
use crate::protocol::{self, InboundFrame, OutboundFrame};

/// Close codes a backend uses to refuse a credential after the upgrade.
const AUTH_CLOSE_CODES: [u16; 3] = [1008, 4001, 4003];

#[derive(Debug, Clone, Copy)]
pub(crate) struct Heartbeat {
    pub(crate) interval: Duration,
    pub(crate) timeout: Duration,
}

pub(crate) async fn io_loop(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outbound: mpsc::UnboundedReceiver<OutboundFrame>,
    mut shutdown: oneshot::Receiver<()>,
    handler: Arc<dyn FrameHandler>,
    heartbeat: Heartbeat,
) {
    let (mut sink, mut stream) = ws.split();

    let mut ping = tokio::time::interval_at(Instant::now() + heartbeat.interval, heartbeat.interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();
    // Whether the server has acknowledged the session yet.
    let mut acknowledged = false;

    let reason = loop {
        let deadline = last_seen + heartbeat.timeout;

        tokio::select! {
            // Resolves on an explicit close and when the owning handle is dropped.
            _ = &mut shutdown => {
                let _ = sink.send(WsMessage::Close(None)).await;
                break CloseReason::Requested;
            }

            Some(frame) = outbound.recv() => {
                if let Err(e) = write_frame(&mut sink, &frame).await {
                    warn!(error = %e, "Failed to write frame");
                    break CloseReason::Lost(e);
                }
            }

            _ = ping.tick() => {
                if let Err(e) = write_frame(&mut sink, &OutboundFrame::Ping).await {
                    warn!(error = %e, "Failed to write heartbeat");
                    break CloseReason::Lost(e);
                }
            }

            _ = tokio::time::sleep_until(deadline) => {
                warn!(timeout = ?heartbeat.timeout, "No traffic from server; dropping connection");
                break CloseReason::Lost(TransportError::HeartbeatTimeout(heartbeat.timeout));
            }

            msg = stream.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => {
                    last_seen = Instant::now();
                    match protocol::decode(&text) {
                        Ok(InboundFrame::Unknown) => {
                            debug!(frame = %text.as_str(), "Dropping frame with unknown type");
                        }
                        Ok(frame) => {
                            trace!(kind = frame.kind(), "Inbound frame");
                            if frame == InboundFrame::Connected {
                                acknowledged = true;
                            }
                            handler.on_frame(frame);
                        }
                        Err(e) => {
                            warn!(error = %e, "Dropping malformed frame");
                        }
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let err = classify_close(frame, acknowledged);
                    info!(reason = %err, "Server closed chat connection");
                    break CloseReason::Lost(err);
                }
                Some(Ok(_)) => {
                    // Binary and control frames only prove liveness.
                    last_seen = Instant::now();
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error");
                    break CloseReason::Lost(TransportError::Io(e.to_string()));
                }
                None => {
                    break CloseReason::Lost(TransportError::ClosedByServer("stream ended".into()));
                }
            },
        }
    };

    // Release the socket before anyone hears about the close.
    drop(sink);
    drop(stream);
    handler.on_closed(reason);
}

async fn write_frame<S>(sink: &mut S, frame: &OutboundFrame) -> Result<(), TransportError>
where
    S: futures_util::Sink<WsMessage, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let json = protocol::encode(frame).map_err(|e| TransportError::Io(e.to_string()))?;
    sink.send(WsMessage::Text(json.into()))
        .await
        .map_err(|e| TransportError::Io(e.to_string()))
}

/// Map a server close frame onto the error reported to the session.
pub(crate) fn classify_close(frame: Option<CloseFrame>, acknowledged: bool) -> TransportError {
    let (code, reason) = match frame {
        Some(frame) => (u16::from(frame.code), frame.reason.to_string()),
        None => (1005, String::new()),
    };
    let detail = if reason.is_empty() {
        format!("code {code}")
    } else {
        format!("code {code}: {reason}")
    };

    if !acknowledged && AUTH_CLOSE_CODES.contains(&code) {
        TransportError::AuthRejected(detail)
    } else {
        TransportError::ClosedByServer(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    fn frame(code: u16, reason: &str) -> Option<CloseFrame> {
        Some(CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        })
    }

    #[test]
    fn auth_close_before_ack_is_rejection() {
        assert_eq!(
            classify_close(frame(4001, "invalid token"), false),
            TransportError::AuthRejected("code 4001: invalid token".into())
        );
        assert!(matches!(
            classify_close(frame(1008, ""), false),
            TransportError::AuthRejected(_)
        ));
    }

    #[test]
    fn auth_close_after_ack_is_plain_close() {
        assert_eq!(
            classify_close(frame(4001, "expired"), true),
            TransportError::ClosedByServer("code 4001: expired".into())
        );
    }

    #[test]
    fn normal_close_and_missing_frame() {
        assert_eq!(
            classify_close(frame(1000, ""), false),
            TransportError::ClosedByServer("code 1000".into())
        );
        assert_eq!(
            classify_close(None, true),
            TransportError::ClosedByServer("code 1005".into())
        );
    }
}
