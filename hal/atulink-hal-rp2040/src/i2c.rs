//! I2C target (slave) adapters

use atulink_hal::{I2cTargetConfig, I2cTargetError};
use embassy_rp::i2c_slave::{Config, Error};

/// Build the `embassy-rp` target configuration
///
/// Pull-ups are left at the driver defaults.
pub fn target_config(config: &I2cTargetConfig) -> Config {
    let mut rp = Config::default();
    rp.addr = u16::from(config.address);
    rp.general_call = config.general_call;
    rp
}

/// Map a driver error onto the shared error type
pub fn target_error(error: Error) -> I2cTargetError {
    match error {
        Error::Abort(_) => I2cTargetError::Abort,
        Error::PartialWrite(_) | Error::PartialGeneralCall(_) => I2cTargetError::Overrun,
        Error::InvalidResponseBufferLength => I2cTargetError::PartialRead,
        #[allow(unreachable_patterns)]
        _ => I2cTargetError::Other,
    }
}
