//! Board-agnostic core logic for the atulink firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Display emulation: memory model, settle detection, device aggregate
//! - Telemetry: snapshot line parsing and JSON rendering
//! - Uplink: connection state machine, session driver, command dispatch
//! - Bridge configuration types and TOML loader
//! - Collaborator traits (network link, publish/subscribe transport)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod display;
pub mod telemetry;
pub mod traits;
pub mod uplink;
