//! Connection state machine
//!
//! Pure transition function; the session driver decides which events
//! happened.

use super::events::UplinkEvent;

/// Connection states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// No network link
    #[default]
    LinkDown,
    /// Link up, broker session not established
    LinkUpNoTransport,
    /// Publishing and receiving commands
    Ready,
}

impl ConnectionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: UplinkEvent) -> Self {
        use ConnectionState::*;
        use UplinkEvent::*;

        match (self, event) {
            (_, LinkLost) => LinkDown,

            (LinkDown, LinkEstablished) => LinkUpNoTransport,

            (LinkUpNoTransport, TransportConnected) => Ready,

            // Broker loss restarts from the link
            (Ready, TransportLost) => LinkDown,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = ConnectionState::default()
            .transition(UplinkEvent::LinkEstablished)
            .transition(UplinkEvent::TransportConnected);
        assert_eq!(state, ConnectionState::Ready);
        assert!(state.is_ready());
    }

    #[test]
    fn test_link_loss_from_any_state() {
        for state in [
            ConnectionState::LinkDown,
            ConnectionState::LinkUpNoTransport,
            ConnectionState::Ready,
        ] {
            assert_eq!(
                state.transition(UplinkEvent::LinkLost),
                ConnectionState::LinkDown
            );
        }
    }

    #[test]
    fn test_transport_loss_when_ready() {
        assert_eq!(
            ConnectionState::Ready.transition(UplinkEvent::TransportLost),
            ConnectionState::LinkDown
        );
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        assert_eq!(
            ConnectionState::LinkDown.transition(UplinkEvent::TransportConnected),
            ConnectionState::LinkDown
        );
        assert_eq!(
            ConnectionState::Ready.transition(UplinkEvent::LinkEstablished),
            ConnectionState::Ready
        );
        assert_eq!(
            ConnectionState::LinkUpNoTransport.transition(UplinkEvent::TransportLost),
            ConnectionState::LinkUpNoTransport
        );
    }
}
