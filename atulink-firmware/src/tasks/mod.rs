//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod net;
pub mod serial_rx;
pub mod uplink;

pub use net::{cyw43_task, net_task};
pub use serial_rx::serial_rx_task;
pub use uplink::{uplink_task, BridgeUplink};
