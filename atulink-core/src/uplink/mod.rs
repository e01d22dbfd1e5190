//! Uplink: broker connection lifecycle and remote commands
//!
//! ```text
//!   LinkDown ──LinkEstablished──► LinkUpNoTransport ──TransportConnected──► Ready
//!      ▲                                 │                                   │
//!      └──────────── LinkLost ───────────┴──────── LinkLost / TransportLost ─┘
//! ```

pub mod dispatch;
pub mod events;
pub mod session;
pub mod state;

pub use dispatch::{
    Antenna, Button, ControlPanel, Relay, RemoteCommand, StatusUpdate, StatusUpdates,
};
pub use events::UplinkEvent;
pub use session::{LineError, LineOutcome, Uplink, UplinkError, PRESENCE_OFFLINE, PRESENCE_ONLINE};
pub use state::ConnectionState;
