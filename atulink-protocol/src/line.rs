//! Snapshot line framing
//!
//! The emulator sends each settled screen as exactly 80 characters
//! followed by `\r\n`. The bridge rebuilds lines byte by byte.

use heapless::Vec;

/// Characters in one snapshot (4 rows of 20)
pub const SNAPSHOT_LEN: usize = 80;

/// Snapshot plus the `\r\n` terminator
pub const SNAPSHOT_LINE_LEN: usize = SNAPSHOT_LEN + 2;

/// Capacity of the receive-side line buffer
pub const LINE_CAPACITY: usize = 128;

/// Frame a snapshot for the serial link
pub fn encode_snapshot(snapshot: &[u8; SNAPSHOT_LEN]) -> [u8; SNAPSHOT_LINE_LEN] {
    let mut line = [0u8; SNAPSHOT_LINE_LEN];
    line[..SNAPSHOT_LEN].copy_from_slice(snapshot);
    line[SNAPSHOT_LEN] = b'\r';
    line[SNAPSHOT_LEN + 1] = b'\n';
    line
}

/// Accumulates serial bytes into lines
///
/// `\n` completes a line. Any other control byte (below 0x20, including
/// `\r`) is skipped. Printable bytes past [`LINE_CAPACITY`] are dropped
/// until the next `\n`.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Vec<u8, LINE_CAPACITY>,
    complete: bool,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            complete: false,
        }
    }

    /// Push one byte; returns the finished line when `byte` is `\n`
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        if self.complete {
            self.buf.clear();
            self.complete = false;
        }

        match byte {
            b'\n' => {
                self.complete = true;
                Some(self.buf.as_slice())
            }
            0x00..=0x1F => None,
            _ => {
                // Overflow is dropped, the line still completes on '\n'
                let _ = self.buf.push(byte);
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(asm: &mut LineAssembler, bytes: &[u8]) -> Option<std::vec::Vec<u8>> {
        let mut out = None;
        for &b in bytes {
            if let Some(line) = asm.push(b) {
                out = Some(line.to_vec());
            }
        }
        out
    }

    #[test]
    fn test_encode_terminates_line() {
        let snapshot = [b'x'; SNAPSHOT_LEN];
        let line = encode_snapshot(&snapshot);
        assert_eq!(line.len(), 82);
        assert_eq!(&line[80..], b"\r\n");
        assert!(line[..80].iter().all(|&b| b == b'x'));
    }

    #[test]
    fn test_crlf_stripped() {
        let mut asm = LineAssembler::new();
        assert_eq!(feed(&mut asm, b"PWR=50\r\n").as_deref(), Some(&b"PWR=50"[..]));
    }

    #[test]
    fn test_control_bytes_skipped() {
        let mut asm = LineAssembler::new();
        assert_eq!(feed(&mut asm, b"A\x01B\x1fC\n").as_deref(), Some(&b"ABC"[..]));
    }

    #[test]
    fn test_consecutive_lines() {
        let mut asm = LineAssembler::new();
        assert_eq!(feed(&mut asm, b"one\n").as_deref(), Some(&b"one"[..]));
        assert_eq!(feed(&mut asm, b"two\n").as_deref(), Some(&b"two"[..]));
    }

    #[test]
    fn test_empty_line() {
        let mut asm = LineAssembler::new();
        assert_eq!(feed(&mut asm, b"\r\n").as_deref(), Some(&b""[..]));
    }

    #[test]
    fn test_overflow_dropped() {
        let mut asm = LineAssembler::new();
        let mut input = std::vec![b'a'; LINE_CAPACITY + 20];
        input.push(b'\n');
        let line = feed(&mut asm, &input).unwrap();
        assert_eq!(line.len(), LINE_CAPACITY);
    }

    #[test]
    fn test_full_snapshot_passes_through() {
        let mut snapshot = [b' '; SNAPSHOT_LEN];
        snapshot[..4].copy_from_slice(b"PWR=");
        let mut asm = LineAssembler::new();
        let line = feed(&mut asm, &encode_snapshot(&snapshot)).unwrap();
        assert_eq!(line, snapshot.to_vec());
    }
}
