//! atulink Hardware Abstraction Layer
//!
//! This crate defines the hardware-facing traits and configuration types
//! shared by the LCD emulator and the bridge firmware. Board crates
//! (`atulink-hal-rp2040`) implement them; `atulink-core` consumes them so
//! the application logic stays testable on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  Firmware (atulink-firmware, atulink-lcd-fw)  │
//! └───────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌───────────────────────────────────────────────┐
//! │  atulink-core (logic)  /  atulink-hal (traits)│
//! └───────────────────────────────────────────────┘
//!                        │
//!                        ▼
//!               ┌─────────────────┐
//!               │ atulink-hal-    │
//!               │    rp2040       │
//!               └─────────────────┘
//! ```
//!
//! # Contents
//!
//! - [`gpio::OutputPin`] - Relay, button and LED outputs
//! - [`uart::UartConfig`] - Snapshot link settings
//! - [`i2c::I2cTargetConfig`] - LCD backpack bus address

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod uart;

// Re-export key types at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::{I2cTargetConfig, I2cTargetError};
pub use uart::UartConfig;
