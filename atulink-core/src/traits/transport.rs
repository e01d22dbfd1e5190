//! Publish/subscribe transport

use core::future::Future;

use heapless::{String, Vec};

/// Longest topic name kept, inbound or configured
pub const MAX_TOPIC_LEN: usize = 64;

/// Longest inbound payload kept
pub const MAX_PAYLOAD_LEN: usize = 128;

/// MQTT delivery guarantee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

/// Message the broker publishes on our behalf after an unclean disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastWill<'a> {
    pub topic: &'a str,
    pub payload: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

/// Session parameters for [`Transport::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions<'a> {
    pub client_id: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub keep_alive_s: u16,
    pub will: LastWill<'a>,
}

/// A message received on a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InboundMessage {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// Copy a received message, cutting the topic and payload to size
    pub fn truncated(topic: &str, payload: &[u8]) -> Self {
        let mut message = Self::default();
        for c in topic.chars() {
            if message.topic.push(c).is_err() {
                break;
            }
        }
        let keep = payload.len().min(MAX_PAYLOAD_LEN);
        // `keep` never exceeds the capacity
        let _ = message.payload.extend_from_slice(&payload[..keep]);
        message
    }
}

/// Broker connection
///
/// A failed `publish`, `subscribe` or `poll` leaves `is_connected` false
/// until the next successful `connect`. `'c` is the lifetime of the
/// connect options, which a client may keep between sessions.
pub trait Transport<'c> {
    type Error;

    /// Remember the broker endpoint for the next connect
    fn set_server(&mut self, host: &str, port: u16);

    fn connect(&mut self, options: &ConnectOptions<'c>)
        -> impl Future<Output = Result<(), Self::Error>>;

    fn is_connected(&self) -> bool;

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    fn subscribe(&mut self, topic: &str) -> impl Future<Output = Result<(), Self::Error>>;

    /// Service the connection (keep-alive, acks)
    ///
    /// Returns at most one inbound message and does not wait for one.
    fn poll(&mut self) -> impl Future<Output = Result<Option<InboundMessage>, Self::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_copied() {
        let message = InboundMessage::truncated("hamradio/atu100/cmd", b"7");
        assert_eq!(message.topic.as_str(), "hamradio/atu100/cmd");
        assert_eq!(message.payload.as_slice(), b"7");
    }

    #[test]
    fn test_oversized_payload_truncated() {
        let mut payload = [b'x'; 150];
        payload[0] = b'6';
        let message = InboundMessage::truncated("hamradio/atu100/cmd", &payload);
        assert_eq!(message.payload.len(), MAX_PAYLOAD_LEN);
        assert_eq!(message.payload[0], b'6');
    }

    #[test]
    fn test_oversized_topic_truncated() {
        let topic = "t/".repeat(40);
        let message = InboundMessage::truncated(&topic, b"1");
        assert_eq!(message.topic.len(), MAX_TOPIC_LEN);
        assert!(topic.starts_with(message.topic.as_str()));
    }
}
