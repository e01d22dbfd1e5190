//! Collaborator traits
//!
//! The uplink logic talks to the network only through these traits, so
//! the state machine runs unchanged on target and against test fakes.

pub mod link;
pub mod transport;

pub use link::Link;
pub use transport::{
    ConnectOptions, InboundMessage, LastWill, QoS, Transport, MAX_PAYLOAD_LEN, MAX_TOPIC_LEN,
};
