//! Display data RAM and cursor model

use atulink_protocol::{Command, RamTarget};

/// Visible cells on a 20x4 display
pub const DISPLAY_LEN: usize = 80;

/// Power-up and cleared cell content
pub const BLANK: u8 = b' ';

/// Cursor and write-mode state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorState {
    /// Always in `0..DISPLAY_LEN`
    pub address: u8,
    pub target: RamTarget,
    pub increment: bool,
    /// Stored but has no effect on writes
    pub shift: bool,
}

impl CursorState {
    pub const POWER_UP: Self = Self {
        address: 0,
        target: RamTarget::Data,
        increment: true,
        shift: false,
    };

    fn advance(&mut self) {
        self.address = wrap(self.address as usize + 1);
    }

    fn retreat(&mut self) {
        self.address = wrap(self.address as usize + DISPLAY_LEN - 1);
    }
}

impl Default for CursorState {
    fn default() -> Self {
        Self::POWER_UP
    }
}

fn wrap(address: usize) -> u8 {
    (address % DISPLAY_LEN) as u8
}

/// The 80 character cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    cells: [u8; DISPLAY_LEN],
}

impl DisplayBuffer {
    pub const fn new() -> Self {
        Self {
            cells: [BLANK; DISPLAY_LEN],
        }
    }

    /// Write one cell; the address wraps
    pub fn write_cell(&mut self, address: u8, value: u8) {
        self.cells[address as usize % DISPLAY_LEN] = value;
    }

    pub fn cell(&self, address: u8) -> u8 {
        self.cells[address as usize % DISPLAY_LEN]
    }

    pub fn fill(&mut self, value: u8) {
        self.cells = [value; DISPLAY_LEN];
    }

    pub fn cells(&self) -> &[u8; DISPLAY_LEN] {
        &self.cells
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display memory driven by decoded commands
///
/// Single writer of the buffer and of the dirty flag.
#[derive(Debug, Clone, Default)]
pub struct DisplayMemory {
    buffer: DisplayBuffer,
    cursor: CursorState,
    dirty: bool,
}

impl DisplayMemory {
    pub const fn new() -> Self {
        Self {
            buffer: DisplayBuffer::new(),
            cursor: CursorState::POWER_UP,
            dirty: false,
        }
    }

    /// Apply one command
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::ClearDisplay => {
                self.buffer.fill(BLANK);
                self.cursor = CursorState::POWER_UP;
                self.dirty = true;
            }
            Command::CursorHome => self.cursor.address = 0,
            Command::SetEntryMode { increment, shift } => {
                self.cursor.increment = increment;
                self.cursor.shift = shift;
            }
            Command::SetDisplayControl { .. } | Command::SetFunction { .. } => {}
            Command::ShiftCursorOrDisplay { right, .. } => {
                if right {
                    self.cursor.advance();
                } else {
                    self.cursor.retreat();
                }
            }
            Command::SetRamAddress {
                target: RamTarget::CharGen,
                ..
            } => self.cursor.target = RamTarget::CharGen,
            Command::SetRamAddress {
                target: RamTarget::Data,
                address,
            } => {
                self.cursor.target = RamTarget::Data;
                self.cursor.address = wrap(address as usize);
            }
            Command::WriteData { byte } => {
                if self.cursor.target == RamTarget::CharGen {
                    return;
                }
                self.buffer.write_cell(self.cursor.address, byte);
                self.dirty = true;
                if self.cursor.increment {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Read and clear the dirty flag
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    /// Copy of the current content
    pub fn snapshot(&self) -> [u8; DISPLAY_LEN] {
        *self.buffer.cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn write_str(memory: &mut DisplayMemory, text: &[u8]) {
        for &byte in text {
            memory.apply(Command::WriteData { byte });
        }
    }

    fn ddram(address: u8) -> Command {
        Command::SetRamAddress {
            target: RamTarget::Data,
            address,
        }
    }

    #[test]
    fn test_power_up_state() {
        let memory = DisplayMemory::new();
        assert!(memory.snapshot().iter().all(|&c| c == BLANK));
        assert_eq!(memory.cursor(), CursorState::POWER_UP);
        assert!(!memory.is_dirty());
    }

    #[test]
    fn test_write_advances_cursor() {
        let mut memory = DisplayMemory::new();
        write_str(&mut memory, b"PWR=");
        assert_eq!(&memory.snapshot()[..4], b"PWR=");
        assert_eq!(memory.cursor().address, 4);
        assert!(memory.take_dirty());
        assert!(!memory.take_dirty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut memory = DisplayMemory::new();
        memory.apply(Command::SetEntryMode {
            increment: false,
            shift: true,
        });
        memory.apply(ddram(33));
        write_str(&mut memory, b"x");
        memory.take_dirty();

        memory.apply(Command::ClearDisplay);
        assert!(memory.snapshot().iter().all(|&c| c == BLANK));
        assert_eq!(memory.cursor(), CursorState::POWER_UP);
        assert!(memory.is_dirty());
    }

    #[test]
    fn test_home_only_moves_cursor() {
        let mut memory = DisplayMemory::new();
        memory.apply(Command::SetEntryMode {
            increment: false,
            shift: false,
        });
        memory.apply(ddram(10));
        memory.apply(Command::CursorHome);
        assert_eq!(memory.cursor().address, 0);
        assert!(!memory.cursor().increment);
    }

    #[test]
    fn test_no_increment_overwrites_same_cell() {
        let mut memory = DisplayMemory::new();
        memory.apply(Command::SetEntryMode {
            increment: false,
            shift: false,
        });
        memory.apply(ddram(5));
        write_str(&mut memory, b"ab");
        assert_eq!(memory.cursor().address, 5);
        assert_eq!(memory.buffer().cell(5), b'b');
        assert_eq!(memory.buffer().cell(4), BLANK);
    }

    #[test]
    fn test_write_wraps_at_end() {
        let mut memory = DisplayMemory::new();
        memory.apply(ddram(79));
        write_str(&mut memory, b"yz");
        assert_eq!(memory.buffer().cell(79), b'y');
        assert_eq!(memory.buffer().cell(0), b'z');
        assert_eq!(memory.cursor().address, 1);
    }

    #[test]
    fn test_ddram_address_wraps() {
        let mut memory = DisplayMemory::new();
        // 0x54 is row 3 on a 20x4 module, 84 mod 80 = 4
        memory.apply(ddram(0x54));
        assert_eq!(memory.cursor().address, 4);
    }

    #[test]
    fn test_shift_left_wraps() {
        let mut memory = DisplayMemory::new();
        memory.apply(Command::ShiftCursorOrDisplay {
            display_shift: false,
            right: false,
        });
        assert_eq!(memory.cursor().address, 79);
        assert!(!memory.is_dirty());
    }

    #[test]
    fn test_cgram_writes_suppressed() {
        let mut memory = DisplayMemory::new();
        memory.apply(Command::SetRamAddress {
            target: RamTarget::CharGen,
            address: 8,
        });
        write_str(&mut memory, b"\x1f\x11");
        assert!(!memory.is_dirty());
        assert_eq!(memory.cursor().address, 0);
        assert!(memory.snapshot().iter().all(|&c| c == BLANK));

        memory.apply(ddram(0));
        write_str(&mut memory, b"A");
        assert_eq!(memory.buffer().cell(0), b'A');
    }

    #[test]
    fn test_accepted_no_ops() {
        let mut memory = DisplayMemory::new();
        memory.apply(Command::SetFunction {
            eight_bit: false,
            two_lines: true,
            big_font: false,
        });
        memory.apply(Command::SetDisplayControl {
            display: true,
            cursor: false,
            blink: false,
        });
        assert_eq!(memory.cursor(), CursorState::POWER_UP);
        assert!(!memory.is_dirty());
    }

    proptest! {
        #[test]
        fn prop_full_shift_cycle_returns_cursor(start in 0u8..80, byte in 0x20u8..0x7F) {
            let mut memory = DisplayMemory::new();
            memory.apply(ddram(start));
            memory.apply(Command::WriteData { byte });
            let before = memory.cursor().address;
            for _ in 0..DISPLAY_LEN {
                memory.apply(Command::ShiftCursorOrDisplay { display_shift: false, right: true });
            }
            prop_assert_eq!(memory.cursor().address, before);
        }

        #[test]
        fn prop_address_stays_in_range(commands in proptest::collection::vec(0u8..=0xFF, 0..200)) {
            let mut memory = DisplayMemory::new();
            for value in commands {
                if let Ok(cmd) = Command::from_instruction(value) {
                    memory.apply(cmd);
                }
                memory.apply(Command::WriteData { byte: value });
                prop_assert!((memory.cursor().address as usize) < DISPLAY_LEN);
            }
        }
    }
}
