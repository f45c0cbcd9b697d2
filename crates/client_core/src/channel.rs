//! Per-subject subscriptions on the explorer's real-time channel.
//!
//! The transport (socket lifetime, heartbeats, reconnects) lives behind
//! [`ChannelTransport`]; a [`ChannelSubscription`] only turns the two
//! inbound event classes it cares about into caller-defined actions.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use shared::{error::ProtocolError, protocol::camelize_keys};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid socket url '{0}': must start with http://, https://, ws:// or wss://")]
    InvalidUrl(String),
    #[error("failed to connect websocket {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("channel transport is closed")]
    Closed,
}

/// Inbound event as reported by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The transport failed or the socket went away.
    Error(String),
    Message {
        topic: String,
        event: String,
        payload: Value,
    },
}

#[async_trait]
pub trait ChannelTransport: Send + Sync {
    async fn join(&self, topic: &str) -> Result<(), ChannelError>;
}

pub struct ChannelClient<T: ChannelTransport> {
    transport: T,
}

impl<T: ChannelTransport> ChannelClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn subscribe<A>(&self, topic: &str) -> Result<ChannelSubscription<A>, ChannelError> {
        self.transport.join(topic).await?;
        info!(topic, "channel: subscribed");
        Ok(ChannelSubscription::new(topic))
    }
}

type ErrorHook<A> = Box<dyn Fn() -> A>;
type MessageHook<A> = Box<dyn Fn(Value) -> Option<A>>;

/// Handle returned by [`ChannelClient::subscribe`].
pub struct ChannelSubscription<A> {
    topic: String,
    on_error: Option<ErrorHook<A>>,
    on_message: HashMap<String, MessageHook<A>>,
}

impl<A> ChannelSubscription<A> {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            on_error: None,
            on_message: HashMap::new(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn on_transport_error(&mut self, hook: impl Fn() -> A + 'static) {
        self.on_error = Some(Box::new(hook));
    }

    /// Registers the hook for `event`. Payload keys are camelized before the
    /// hook sees them; a hook returns `None` for a payload it cannot use.
    pub fn on_message(&mut self, event: &str, hook: impl Fn(Value) -> Option<A> + 'static) {
        self.on_message.insert(event.to_string(), Box::new(hook));
    }

    pub fn route(&self, event: TransportEvent) -> Option<A> {
        match event {
            TransportEvent::Error(reason) => {
                warn!(topic = %self.topic, %reason, "channel: transport error");
                self.on_error.as_ref().map(|hook| hook())
            }
            TransportEvent::Message {
                topic,
                event,
                payload,
            } => {
                if topic != self.topic {
                    debug!(%topic, %event, "channel: ignoring message for another topic");
                    return None;
                }
                let Some(hook) = self.on_message.get(&event) else {
                    debug!(%topic, %event, "channel: ignoring unhandled event");
                    return None;
                };
                hook(camelize_keys(payload))
            }
        }
    }
}
