//! atulink wire protocols
//!
//! Two protocols meet in this crate:
//!
//! - **HD44780 4-bit bus** ([`bus`], [`command`]): the tuner firmware drives
//!   its LCD through a PCF8574 I2C backpack. Every controller byte arrives as
//!   two nibble transfers on the expander's upper four lines:
//!
//! ```text
//!   bit:   7   6   5   4   3    2   1    0
//!        ┌───┬───┬───┬───┬────┬───┬────┬────┐
//!        │ D7│ D6│ D5│ D4│ BL │ E │ RW │ RS │
//!        └───┴───┴───┴───┴────┴───┴────┴────┘
//! ```
//!
//! - **Snapshot line** ([`line`]): the emulator's serial output, exactly 80
//!   display characters followed by CR LF.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod command;
pub mod line;

pub use bus::{BusFrame, NibbleDecoder, ENABLE_BIT, RS_BIT, RW_BIT};
pub use command::{Command, ProtocolError, RamTarget};
pub use line::{encode_snapshot, LineAssembler, LINE_CAPACITY, SNAPSHOT_LEN, SNAPSHOT_LINE_LEN};
