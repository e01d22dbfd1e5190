//! Events that drive the connection state machine

/// Uplink events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UplinkEvent {
    /// Network link is associated and addressed
    LinkEstablished,
    /// Broker session is open, presence published and commands subscribed
    TransportConnected,
    /// Network link went away
    LinkLost,
    /// Broker session dropped or failed
    TransportLost,
}
