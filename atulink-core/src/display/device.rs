//! Emulated LCD backpack
//!
//! Aggregates everything the emulator mutates so the firmware can keep
//! it behind a single lock.

use atulink_protocol::{Command, NibbleDecoder, ProtocolError};

use super::memory::{DisplayMemory, DISPLAY_LEN};
use super::settle::SettleTracker;

/// Counters for frames that were decoded or dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeStats {
    /// Frames decoded into a command
    pub frames: u32,
    /// Frames dropped because RW was set
    pub read_requests: u32,
    /// Instruction bytes matching no opcode
    pub unknown_opcodes: u32,
}

impl DecodeStats {
    pub fn dropped(&self) -> u32 {
        self.read_requests.wrapping_add(self.unknown_opcodes)
    }
}

/// Emulator state: bus decoder, display memory and settle tracker
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub memory: DisplayMemory,
    pub settle: SettleTracker,
    pub decoder: NibbleDecoder,
    pub stats: DecodeStats,
}

impl DeviceState {
    pub const fn new(quiescence_ms: u32) -> Self {
        Self {
            memory: DisplayMemory::new(),
            settle: SettleTracker::new(quiescence_ms),
            decoder: NibbleDecoder::new(),
            stats: DecodeStats {
                frames: 0,
                read_requests: 0,
                unknown_opcodes: 0,
            },
        }
    }

    /// Process the bytes of one bus write transaction
    pub fn receive(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(frame) = self.decoder.feed(byte) {
                match Command::from_frame(frame) {
                    Ok(command) => {
                        self.stats.frames = self.stats.frames.wrapping_add(1);
                        self.memory.apply(command);
                    }
                    Err(ProtocolError::ReadRequest) => {
                        self.stats.read_requests = self.stats.read_requests.wrapping_add(1);
                    }
                    Err(ProtocolError::UnknownOpcode(_)) => {
                        self.stats.unknown_opcodes = self.stats.unknown_opcodes.wrapping_add(1);
                    }
                }
            }
        }
    }

    /// Advance the settle tracker; returns the snapshot once settled
    pub fn tick(&mut self, now_ms: u32) -> Option<[u8; DISPLAY_LEN]> {
        let dirty = self.memory.take_dirty();
        self.settle
            .poll(dirty, now_ms)
            .then(|| self.memory.snapshot())
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(super::settle::DEFAULT_QUIESCENCE_MS)
    }
}
