//! HD44780 instruction decoding
//!
//! Instructions are identified by their highest set bit. The decode table
//! is checked most specific first, so `0x01` is a clear and never a
//! DDRAM address.

use crate::bus::BusFrame;

/// RAM that data writes currently target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RamTarget {
    /// Display data RAM (visible characters)
    #[default]
    Data,
    /// Character generator RAM (custom glyphs)
    CharGen,
}

/// Controller commands decoded from a [`BusFrame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Clear display and return home
    ClearDisplay,
    /// Return cursor to address 0
    CursorHome,
    /// Cursor direction and display shift on write
    SetEntryMode { increment: bool, shift: bool },
    /// Display, cursor and blink on/off
    SetDisplayControl {
        display: bool,
        cursor: bool,
        blink: bool,
    },
    /// Move the cursor or shift the display by one
    ShiftCursorOrDisplay { display_shift: bool, right: bool },
    /// Interface width, line count and font
    SetFunction {
        eight_bit: bool,
        two_lines: bool,
        big_font: bool,
    },
    /// Select CGRAM or DDRAM and set the address
    SetRamAddress { target: RamTarget, address: u8 },
    /// Write a data byte at the cursor
    WriteData { byte: u8 },
}

/// Frames that do not decode into a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Busy flag / data read requested (RW set)
    ReadRequest,
    /// Instruction byte matches no known opcode
    UnknownOpcode(u8),
}

/// One decode table row: `(mask, value, constructor)`
type Opcode = (u8, u8, fn(u8) -> Command);

const fn bit(byte: u8, mask: u8) -> bool {
    byte & mask != 0
}

/// Instruction table, most specific mask first
const OPCODES: [Opcode; 8] = [
    (0xFF, 0x01, |_| Command::ClearDisplay),
    (0xFE, 0x02, |_| Command::CursorHome),
    (0xFC, 0x04, |b| Command::SetEntryMode {
        increment: bit(b, 0x02),
        shift: bit(b, 0x01),
    }),
    (0xF8, 0x08, |b| Command::SetDisplayControl {
        display: bit(b, 0x04),
        cursor: bit(b, 0x02),
        blink: bit(b, 0x01),
    }),
    (0xF0, 0x10, |b| Command::ShiftCursorOrDisplay {
        display_shift: bit(b, 0x08),
        right: bit(b, 0x04),
    }),
    (0xE0, 0x20, |b| Command::SetFunction {
        eight_bit: bit(b, 0x10),
        two_lines: bit(b, 0x08),
        big_font: bit(b, 0x04),
    }),
    (0xC0, 0x40, |b| Command::SetRamAddress {
        target: RamTarget::CharGen,
        address: b & 0x3F,
    }),
    (0x80, 0x80, |b| Command::SetRamAddress {
        target: RamTarget::Data,
        address: b & 0x7F,
    }),
];

impl Command {
    /// Decode an instruction byte (RS = 0)
    pub fn from_instruction(byte: u8) -> Result<Self, ProtocolError> {
        OPCODES
            .iter()
            .find(|(mask, value, _)| byte & mask == *value)
            .map(|(_, _, build)| build(byte))
            .ok_or(ProtocolError::UnknownOpcode(byte))
    }

    /// Decode a reassembled bus frame
    pub fn from_frame(frame: BusFrame) -> Result<Self, ProtocolError> {
        if frame.rw {
            return Err(ProtocolError::ReadRequest);
        }
        if frame.rs {
            return Ok(Command::WriteData { byte: frame.value });
        }
        Self::from_instruction(frame.value)
    }

    /// Encode back into the byte and RS flag a controller would send
    pub fn to_frame(&self) -> BusFrame {
        let (value, rs) = match *self {
            Command::ClearDisplay => (0x01, false),
            Command::CursorHome => (0x02, false),
            Command::SetEntryMode { increment, shift } => {
                (0x04 | flag(increment, 0x02) | flag(shift, 0x01), false)
            }
            Command::SetDisplayControl {
                display,
                cursor,
                blink,
            } => (
                0x08 | flag(display, 0x04) | flag(cursor, 0x02) | flag(blink, 0x01),
                false,
            ),
            Command::ShiftCursorOrDisplay {
                display_shift,
                right,
            } => (0x10 | flag(display_shift, 0x08) | flag(right, 0x04), false),
            Command::SetFunction {
                eight_bit,
                two_lines,
                big_font,
            } => (
                0x20 | flag(eight_bit, 0x10) | flag(two_lines, 0x08) | flag(big_font, 0x04),
                false,
            ),
            Command::SetRamAddress {
                target: RamTarget::CharGen,
                address,
            } => (0x40 | (address & 0x3F), false),
            Command::SetRamAddress {
                target: RamTarget::Data,
                address,
            } => (0x80 | (address & 0x7F), false),
            Command::WriteData { byte } => (byte, true),
        };
        BusFrame {
            value,
            rs,
            rw: false,
        }
    }
}

const fn flag(set: bool, mask: u8) -> u8 {
    if set {
        mask
    } else {
        0
    }
}
