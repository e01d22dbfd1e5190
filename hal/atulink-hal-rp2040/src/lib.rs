//! RP2040-specific HAL for the atulink firmware
//!
//! Thin adapters between `embassy-rp` drivers and the `atulink-hal`
//! types used by the board-agnostic logic:
//!
//! - GPIO outputs implementing `atulink_hal::OutputPin`
//! - I2C target configuration and error mapping
//! - UART configuration mapping

#![no_std]

pub mod gpio;
pub mod i2c;
pub mod uart;

pub use gpio::RpOutput;
pub use i2c::{target_config, target_error};
pub use uart::uart_config;
