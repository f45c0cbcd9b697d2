use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::channel::{ChannelClient, ChannelError, ChannelSubscription, ChannelTransport, TransportEvent};

#[derive(Default)]
struct RecordingTransport {
    joined: Mutex<Vec<String>>,
    closed: bool,
}

#[async_trait]
impl ChannelTransport for RecordingTransport {
    async fn join(&self, topic: &str) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.joined.lock().expect("joined").push(topic.to_string());
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum TestAction {
    Disconnected,
    Payload(Value),
}

fn message(topic: &str, event: &str, payload: Value) -> TransportEvent {
    TransportEvent::Message {
        topic: topic.to_string(),
        event: event.to_string(),
        payload,
    }
}

fn subscription() -> ChannelSubscription<TestAction> {
    let mut subscription = ChannelSubscription::new("addresses:0xabc");
    subscription.on_transport_error(|| TestAction::Disconnected);
    subscription.on_message("verification", |payload| Some(TestAction::Payload(payload)));
    subscription
}

#[tokio::test]
async fn subscribe_joins_topic() {
    let client = ChannelClient::new(RecordingTransport::default());
    let subscription = client
        .subscribe::<TestAction>("addresses:0xabc")
        .await
        .expect("subscribe");
    assert_eq!(subscription.topic(), "addresses:0xabc");
    assert_eq!(
        *client.transport().joined.lock().expect("joined"),
        vec!["addresses:0xabc".to_string()]
    );
}

#[tokio::test]
async fn subscribe_fails_on_closed_transport() {
    let client = ChannelClient::new(RecordingTransport {
        closed: true,
        ..RecordingTransport::default()
    });
    let err = client
        .subscribe::<TestAction>("addresses:0xabc")
        .await
        .err()
        .expect("closed transport");
    assert!(matches!(err, ChannelError::Closed));
}

#[test]
fn transport_error_maps_to_error_hook() {
    let routed = subscription().route(TransportEvent::Error("socket closed".into()));
    assert_eq!(routed, Some(TestAction::Disconnected));
}

#[test]
fn transport_error_without_hook_is_ignored() {
    let subscription = ChannelSubscription::<TestAction>::new("addresses:0xabc");
    assert_eq!(subscription.route(TransportEvent::Error("x".into())), None);
}

#[test]
fn message_payload_keys_are_camelized_before_hook() {
    let routed = subscription().route(message(
        "addresses:0xabc",
        "verification",
        json!({"verification_result": "ok"}),
    ));
    assert_eq!(
        routed,
        Some(TestAction::Payload(json!({"verificationResult": "ok"})))
    );
}

#[test]
fn messages_for_other_topics_are_ignored() {
    let routed = subscription().route(message(
        "addresses:0xdef",
        "verification",
        json!({"verification_result": "ok"}),
    ));
    assert_eq!(routed, None);
}

#[test]
fn unhandled_events_are_ignored() {
    let routed = subscription().route(message("addresses:0xabc", "balance", json!({})));
    assert_eq!(routed, None);
}

#[test]
fn hook_may_decline_payload() {
    let mut subscription = ChannelSubscription::<TestAction>::new("addresses:0xabc");
    subscription.on_message("verification", |_| None);
    assert_eq!(
        subscription.route(message("addresses:0xabc", "verification", json!({}))),
        None
    );
}
