//! Phoenix channels websocket transport (serializer v2).

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use shared::protocol::{PhoenixFrame, HEARTBEAT_TOPIC, PHX_CLOSE, PHX_ERROR, PHX_REPLY};
use tokio::{sync::mpsc, time::Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::channel::{ChannelError, ChannelTransport, TransportEvent};

const SOCKET_PATH: &str = "/socket/websocket?vsn=2.0.0";
const MIN_HEARTBEAT: Duration = Duration::from_secs(1);

/// Derives the Phoenix socket endpoint from the explorer base URL.
pub fn websocket_url(explorer_url: &str) -> Result<String, ChannelError> {
    let explorer_url = explorer_url.trim().trim_end_matches('/');
    let base = if explorer_url.starts_with("https://") {
        explorer_url.replacen("https://", "wss://", 1)
    } else if explorer_url.starts_with("http://") {
        explorer_url.replacen("http://", "ws://", 1)
    } else if explorer_url.starts_with("ws://") || explorer_url.starts_with("wss://") {
        explorer_url.to_string()
    } else {
        return Err(ChannelError::InvalidUrl(explorer_url.to_string()));
    };
    Ok(format!("{base}{SOCKET_PATH}"))
}

pub struct PhoenixSocket {
    outbound: mpsc::UnboundedSender<String>,
    next_ref: Arc<AtomicU64>,
}

impl PhoenixSocket {
    /// Opens the socket and starts its reader and writer tasks.
    ///
    /// Inbound events arrive on the returned receiver. The reader reports
    /// exactly one terminal [`TransportEvent::Error`] when the socket ends.
    pub async fn connect(
        socket_url: &str,
        heartbeat: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TransportEvent>), ChannelError> {
        let (ws_stream, _) =
            connect_async(socket_url)
                .await
                .map_err(|source| ChannelError::Connect {
                    url: socket_url.to_string(),
                    source,
                })?;
        info!(url = socket_url, "phoenix: socket connected");
        let (mut writer, mut reader) = ws_stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let next_ref = Arc::new(AtomicU64::new(1));

        let heartbeat = heartbeat.max(MIN_HEARTBEAT);
        let heartbeat_ref = Arc::clone(&next_ref);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + heartbeat, heartbeat);
            loop {
                let text = tokio::select! {
                    outbound = outbound_rx.recv() => match outbound {
                        Some(text) => text,
                        None => break,
                    },
                    _ = ticker.tick() => {
                        let frame = PhoenixFrame::heartbeat(heartbeat_ref.fetch_add(1, Ordering::Relaxed));
                        match frame.encode() {
                            Ok(text) => text,
                            Err(err) => {
                                warn!("phoenix: failed to encode heartbeat: {err}");
                                continue;
                            }
                        }
                    }
                };
                if let Err(err) = writer.send(Message::Text(text)).await {
                    warn!("phoenix: websocket send failed: {err}");
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let reason = loop {
                match reader.next().await {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(event) = classify_frame(&text) {
                            if events_tx.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break "socket closed".to_string(),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => break format!("websocket receive failed: {err}"),
                }
            };
            let _ = events_tx.send(TransportEvent::Error(reason));
        });

        Ok((
            Self {
                outbound: outbound_tx,
                next_ref,
            },
            events_rx,
        ))
    }

    fn send_frame(&self, frame: &PhoenixFrame) -> Result<(), ChannelError> {
        let text = frame.encode()?;
        self.outbound.send(text).map_err(|_| ChannelError::Closed)
    }
}

#[async_trait]
impl ChannelTransport for PhoenixSocket {
    async fn join(&self, topic: &str) -> Result<(), ChannelError> {
        let frame = PhoenixFrame::join(topic, self.next_ref.fetch_add(1, Ordering::Relaxed));
        self.send_frame(&frame)
    }
}

pub(crate) fn classify_frame(text: &str) -> Option<TransportEvent> {
    let frame = match PhoenixFrame::decode(text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!("phoenix: dropping undecodable frame: {err}");
            return None;
        }
    };

    if frame.topic == HEARTBEAT_TOPIC {
        return None;
    }
    if frame.is_error_reply() {
        return Some(TransportEvent::Error(format!(
            "join rejected for topic {}",
            frame.topic
        )));
    }
    match frame.event.as_str() {
        PHX_REPLY => {
            debug!(topic = %frame.topic, "phoenix: reply acknowledged");
            None
        }
        PHX_ERROR => Some(TransportEvent::Error(format!(
            "channel error on topic {}",
            frame.topic
        ))),
        PHX_CLOSE => Some(TransportEvent::Error(format!(
            "channel closed on topic {}",
            frame.topic
        ))),
        _ => Some(TransportEvent::Message {
            topic: frame.topic,
            event: frame.event,
            payload: frame.payload,
        }),
    }
}
