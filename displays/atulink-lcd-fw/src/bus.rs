//! I2C target task
//!
//! Every write transaction from the tuner is fed into the emulated
//! display under the device lock. Reads (busy flag polling) are not
//! supported and answered with the fill byte.

use defmt::*;
use embassy_rp::i2c_slave::{Command, I2cSlave};
use embassy_rp::peripherals::I2C1;

use atulink_hal_rp2040::target_error;

use crate::DEVICE;

/// Largest single write we accept; backpack libraries send 1-4 bytes
const RX_BUF_LEN: usize = 64;

#[embassy_executor::task]
pub async fn bus_task(mut target: I2cSlave<'static, I2C1>, read_fill: u8) {
    info!("Bus task started");

    let mut buf = [0u8; RX_BUF_LEN];

    loop {
        match target.listen(&mut buf).await {
            Ok(Command::Write(len)) => {
                trace!("bus write {} bytes", len);
                DEVICE.lock(|device| device.borrow_mut().receive(&buf[..len]));
            }
            Ok(Command::WriteRead(len)) => {
                DEVICE.lock(|device| device.borrow_mut().receive(&buf[..len]));
                if let Err(e) = target.respond_and_fill(&[], read_fill).await {
                    warn!("bus read response failed: {:?}", target_error(e));
                }
            }
            Ok(Command::Read) => {
                if let Err(e) = target.respond_and_fill(&[], read_fill).await {
                    warn!("bus read response failed: {:?}", target_error(e));
                }
            }
            Ok(Command::GeneralCall(len)) => {
                debug!("ignoring general call ({} bytes)", len);
            }
            Err(e) => {
                warn!("bus error: {:?}", target_error(e));
            }
        }
    }
}
