//! UART configuration mapping

use atulink_hal::uart::{DataBits, Parity, StopBits};
use atulink_hal::UartConfig;
use embassy_rp::uart;

/// Convert to the `embassy-rp` UART configuration
pub fn uart_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}
