//! I2C target (slave) abstractions
//!
//! The LCD emulator listens on the bus as if it were a PCF8574 based
//! HD44780 backpack. Only the write direction carries meaning.

/// Default address of PCF8574 LCD backpacks
pub const LCD_BACKPACK_ADDRESS: u8 = 0x27;

/// I2C target configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cTargetConfig {
    /// 7-bit address to answer on
    pub address: u8,
    /// Respond to general call (address 0) writes
    pub general_call: bool,
    /// Byte returned when the controller attempts a read
    pub read_fill: u8,
}

impl Default for I2cTargetConfig {
    fn default() -> Self {
        Self {
            address: LCD_BACKPACK_ADDRESS,
            general_call: false,
            read_fill: 0xFF,
        }
    }
}

impl I2cTargetConfig {
    /// Check that the address is a valid, non-reserved 7-bit address
    pub fn is_valid(&self) -> bool {
        (0x08..=0x77).contains(&self.address)
    }
}

/// Errors reported by an I2C target peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cTargetError {
    /// Transfer aborted by the controller or the bus
    Abort,
    /// Controller wrote more bytes than the receive buffer holds
    Overrun,
    /// Controller read past the bytes we offered
    PartialRead,
    /// Other error
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address() {
        let cfg = I2cTargetConfig::default();
        assert_eq!(cfg.address, 0x27);
        assert!(!cfg.general_call);
        assert!(cfg.is_valid());
    }

    #[test]
    fn test_reserved_addresses_rejected() {
        for address in [0x00, 0x07, 0x78, 0x7F] {
            let cfg = I2cTargetConfig {
                address,
                ..Default::default()
            };
            assert!(!cfg.is_valid());
        }
    }
}
