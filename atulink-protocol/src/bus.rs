//! Nibble reassembly for the 4-bit HD44780 interface.
//!
//! Only transfers with the enable strobe set are latched by a real
//! controller; everything else on the expander is backlight toggling or
//! setup time and must be ignored.

/// Register select (0 = instruction, 1 = data)
pub const RS_BIT: u8 = 0x01;

/// Read/write select (1 = read)
pub const RW_BIT: u8 = 0x02;

/// Enable strobe
pub const ENABLE_BIT: u8 = 0x04;

/// A controller byte reassembled from two nibble transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusFrame {
    /// Reassembled 8-bit value
    pub value: u8,
    /// Register select of the low transfer
    pub rs: bool,
    /// Read request flag of the low transfer
    pub rw: bool,
}

impl BusFrame {
    /// Build a frame from the latched high transfer and the low transfer
    pub fn from_transfers(high: u8, low: u8) -> Self {
        Self {
            value: (high & 0xF0) | (low >> 4),
            rs: low & RS_BIT != 0,
            rw: low & RW_BIT != 0,
        }
    }

    /// Split this frame back into the two transfers a controller would send
    ///
    /// Both transfers carry the enable strobe plus the RS/RW bits. Used by
    /// tests and bus simulators.
    pub fn to_transfers(&self) -> [u8; 2] {
        let mut control = ENABLE_BIT;
        if self.rs {
            control |= RS_BIT;
        }
        if self.rw {
            control |= RW_BIT;
        }
        [(self.value & 0xF0) | control, (self.value << 4) | control]
    }
}

/// Reassembles [`BusFrame`]s from raw expander writes
///
/// Keeps the high/low toggle across reception events, so a frame split
/// over two I2C transactions is still decoded.
#[derive(Debug, Clone, Default)]
pub struct NibbleDecoder {
    expect_low: bool,
    high: u8,
}

impl NibbleDecoder {
    /// Create a decoder waiting for a high nibble
    pub const fn new() -> Self {
        Self {
            expect_low: false,
            high: 0,
        }
    }

    /// Forget any latched high nibble
    pub fn reset(&mut self) {
        self.expect_low = false;
        self.high = 0;
    }

    /// True if a high nibble is latched and the low one is pending
    pub fn is_mid_frame(&self) -> bool {
        self.expect_low
    }

    /// Feed one expander byte
    ///
    /// Returns a frame once the low nibble of a pair arrives.
    pub fn feed(&mut self, byte: u8) -> Option<BusFrame> {
        if byte & ENABLE_BIT == 0 {
            return None;
        }

        self.expect_low = !self.expect_low;
        if self.expect_low {
            self.high = byte;
            None
        } else {
            Some(BusFrame::from_transfers(self.high, byte))
        }
    }

    /// Feed all bytes of a reception event, calling `on_frame` per frame
    pub fn feed_bytes(&mut self, bytes: &[u8], mut on_frame: impl FnMut(BusFrame)) {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte) {
                on_frame(frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect(decoder: &mut NibbleDecoder, bytes: &[u8]) -> Vec<BusFrame> {
        let mut frames = Vec::new();
        decoder.feed_bytes(bytes, |f| frames.push(f));
        frames
    }

    #[test]
    fn test_reassembles_byte() {
        let mut decoder = NibbleDecoder::new();
        // 'A' = 0x41 as data: high 0x4_, low 0x1_, RS set
        let frames = collect(&mut decoder, &[0x4D, 0x1D]);
        assert_eq!(
            frames,
            vec![BusFrame {
                value: 0x41,
                rs: true,
                rw: false
            }]
        );
    }

    #[test]
    fn test_strobe_low_is_ignored() {
        let mut decoder = NibbleDecoder::new();
        // Typical backpack pattern: data with E low, E high, E low again
        let frames = collect(&mut decoder, &[0x48, 0x4C, 0x48, 0x18, 0x1C, 0x18]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].value, 0x41);
        assert!(!frames[0].rs);
    }

    #[test]
    fn test_no_strobe_no_frame() {
        let mut decoder = NibbleDecoder::new();
        assert!(collect(&mut decoder, &[0x40, 0x10, 0x08, 0xF3]).is_empty());
        assert!(!decoder.is_mid_frame());
    }

    #[test]
    fn test_frame_split_across_events() {
        let mut decoder = NibbleDecoder::new();
        assert!(collect(&mut decoder, &[0x84]).is_empty());
        assert!(decoder.is_mid_frame());

        let frames = collect(&mut decoder, &[0x04]);
        assert_eq!(frames[0].value, 0x80);
        assert!(!decoder.is_mid_frame());
    }

    #[test]
    fn test_read_flag_from_low_transfer() {
        let mut decoder = NibbleDecoder::new();
        let frames = collect(&mut decoder, &[0x04, 0x06]);
        assert!(frames[0].rw);
    }

    #[test]
    fn test_reset_drops_latched_nibble() {
        let mut decoder = NibbleDecoder::new();
        decoder.feed(0x84);
        decoder.reset();
        assert_eq!(decoder.feed(0x34), None);
    }

    proptest! {
        #[test]
        fn prop_reconstructs_value(high in any::<u8>(), low in any::<u8>()) {
            let mut decoder = NibbleDecoder::new();
            prop_assert_eq!(decoder.feed(high | ENABLE_BIT), None);
            let frame = decoder.feed(low | ENABLE_BIT).unwrap();
            prop_assert_eq!(frame.value, (high & 0xF0) | ((low | ENABLE_BIT) >> 4));
        }

        #[test]
        fn prop_missing_strobe_yields_nothing(high in any::<u8>(), low in any::<u8>()) {
            let mut decoder = NibbleDecoder::new();
            prop_assert_eq!(decoder.feed(high & !ENABLE_BIT), None);
            prop_assert_eq!(decoder.feed(low & !ENABLE_BIT), None);
            prop_assert!(!decoder.is_mid_frame());
        }

        #[test]
        fn prop_transfers_roundtrip(value in any::<u8>(), rs in any::<bool>()) {
            let frame = BusFrame { value, rs, rw: false };
            let mut decoder = NibbleDecoder::new();
            let mut out = None;
            for byte in frame.to_transfers() {
                out = decoder.feed(byte);
            }
            prop_assert_eq!(out, Some(frame));
        }
    }
}
