//! HD44780 display emulation
//!
//! Bus bytes flow through [`DeviceState::receive`] into the display
//! memory; [`DeviceState::tick`] decides when a settled snapshot is due.

mod device;
mod memory;
mod settle;

pub use device::{DecodeStats, DeviceState};
pub use memory::{CursorState, DisplayBuffer, DisplayMemory, BLANK, DISPLAY_LEN};
pub use settle::{SettleTracker, DEFAULT_QUIESCENCE_MS};
