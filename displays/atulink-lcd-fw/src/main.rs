//! atulink LCD emulator firmware
//!
//! Sits on the ATU-100's display bus as the PCF8574 backpack at 0x27,
//! rebuilds the 20x4 screen from the 4-bit HD44780 traffic and sends
//! every settled screen as one 80 character line over UART0.
//!
//! Wiring (Raspberry Pi Pico):
//! - GPIO2 / GPIO3: I2C1 SDA / SCL, to the tuner's display connector
//! - GPIO0: UART0 TX, to the bridge's RX

#![no_std]
#![no_main]

mod bus;
mod snapshot;

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::InterruptHandler as I2cInterruptHandler;
use embassy_rp::i2c_slave::I2cSlave;
use embassy_rp::peripherals::{I2C1, UART0};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use atulink_core::config::EmulatorConfig;
use atulink_core::display::{DeviceState, DEFAULT_QUIESCENCE_MS};
use atulink_hal_rp2040::{target_config, uart_config};

bind_interrupts!(struct Irqs {
    I2C1_IRQ => I2cInterruptHandler<I2C1>;
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Emulated display, shared by the bus and snapshot tasks
///
/// Each lock is held for one bus transaction or one tick, never across
/// an await.
pub static DEVICE: Mutex<CriticalSectionRawMutex, RefCell<DeviceState>> =
    Mutex::new(RefCell::new(DeviceState::new(DEFAULT_QUIESCENCE_MS)));

// Static cell for the UART buffer (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("atulink LCD emulator starting...");

    let p = embassy_rp::init(Default::default());
    let config = EmulatorConfig::default();

    DEVICE.lock(|device| *device.borrow_mut() = DeviceState::new(config.quiescence_ms));

    if !config.i2c.is_valid() {
        error!("I2C address {=u8:#x} is reserved", config.i2c.address);
    }

    let target = I2cSlave::new(
        p.I2C1,
        p.PIN_3, // SCL
        p.PIN_2, // SDA
        Irqs,
        target_config(&config.i2c),
    );
    info!("Listening as I2C target at {=u8:#x}", config.i2c.address);

    let tx = BufferedUartTx::new(
        p.UART0,
        Irqs,
        p.PIN_0,
        TX_BUF.init([0; 256]),
        uart_config(&config.uart),
    );
    info!("Snapshot UART at {} baud", config.uart.baudrate);

    spawner.spawn(bus::bus_task(target, config.i2c.read_fill)).unwrap();
    spawner.spawn(snapshot::snapshot_task(tx, config)).unwrap();

    info!("All tasks spawned");
}
