//! atulink bridge firmware
//!
//! Runs on a Raspberry Pi Pico W next to the ATU-100. Reads settled
//! screen snapshots from the LCD emulator over UART, publishes the
//! parsed telemetry to an MQTT broker over WiFi, and presses the tuner's
//! buttons and switches the antenna relays on command.
//!
//! Wiring:
//! - GPIO1: UART0 RX, from the emulator's TX
//! - GPIO2: tune button line (pulsed high)
//! - GPIO3: transformer bypass relay
//! - GPIO4 / GPIO5 / GPIO6: antenna 1 / 2 / 3 relays
//! - GPIO15: status LED (the onboard LED hangs off the radio)

#![no_std]
#![no_main]

mod channels;
mod link;
mod mqtt;
mod tasks;

use cyw43::PowerManagementMode;
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::tcp::TcpSocket;
use embassy_net::{DhcpConfig, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{PIO0, UART0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartRx};
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use atulink_core::config::{parse_bridge_config, BridgeConfig};
use atulink_core::uplink::{ControlPanel, Uplink};
use atulink_hal::UartConfig;
use atulink_hal_rp2040::{uart_config, RpOutput};

use crate::link::WifiLink;
use crate::mqtt::{MqttTransport, SocketCell};

/// Embedded configuration (compiled into firmware)
/// Edit bridge.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../bridge.toml");

/// cyw43 firmware blobs, flashed separately:
/// probe-rs download 43439A0.bin --binary-format bin --chip RP2040 --base-address 0x10100000
/// probe-rs download 43439A0_clm.bin --binary-format bin --chip RP2040 --base-address 0x10140000
const CYW43_FW_ADDR: usize = 0x1010_0000;
const CYW43_FW_LEN: usize = 230_321;
const CYW43_CLM_ADDR: usize = 0x1014_0000;
const CYW43_CLM_LEN: usize = 4752;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells (must live forever)
static CONFIG: StaticCell<BridgeConfig> = StaticCell::new();
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static TCP_RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static TCP_TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static SOCKET: StaticCell<SocketCell> = StaticCell::new();
static MQTT_TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static MQTT_RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("atulink bridge starting...");

    let p = embassy_rp::init(Default::default());

    let config: &'static BridgeConfig = CONFIG.init(match parse_bridge_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("bridge.toml rejected: {:?}, using defaults", e);
            BridgeConfig::default()
        }
    });
    info!(
        "Broker {}:{}, data topic {}",
        config.mqtt.host.as_str(),
        config.mqtt.port,
        config.topics.data.as_str()
    );

    // Snapshot input from the LCD emulator
    let rx = BufferedUartRx::new(
        p.UART0,
        Irqs,
        p.PIN_1,
        RX_BUF.init([0; 256]),
        uart_config(&UartConfig::default()),
    );

    // Tuner controls, all low at power-up
    let panel = ControlPanel::new(
        RpOutput::new(p.PIN_2.into()),
        RpOutput::new(p.PIN_3.into()),
        [
            RpOutput::new(p.PIN_4.into()),
            RpOutput::new(p.PIN_5.into()),
            RpOutput::new(p.PIN_6.into()),
        ],
    );
    let status_led = RpOutput::new(p.PIN_15.into());

    // Radio
    // SAFETY: the blobs are flashed at these addresses and flash is
    // memory-mapped (XIP) for the lifetime of the program.
    let (fw, clm) = unsafe {
        (
            core::slice::from_raw_parts(CYW43_FW_ADDR as *const u8, CYW43_FW_LEN),
            core::slice::from_raw_parts(CYW43_CLM_ADDR as *const u8, CYW43_CLM_LEN),
        )
    };

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(tasks::cyw43_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(PowerManagementMode::PowerSave)
        .await;
    info!("Radio initialised");

    // Network stack
    let mut dhcp = DhcpConfig::default();
    dhcp.hostname = config.wifi.hostname.as_str().try_into().ok();
    let seed = 0x0123_4567_89ab_cdef; // chosen by fair dice roll
    let (stack, net_runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(dhcp),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(tasks::net_task(net_runner)).unwrap();

    let socket = SOCKET.init(Mutex::new(TcpSocket::new(
        stack,
        TCP_RX_BUF.init([0; 1024]),
        TCP_TX_BUF.init([0; 1024]),
    )));
    let transport = MqttTransport::new(
        stack,
        socket,
        MQTT_TX_BUF.init([0; 512]),
        MQTT_RX_BUF.init([0; 512]),
    );

    let uplink = Uplink::new(
        config,
        WifiLink::new(control, stack, &config.wifi),
        transport,
        panel,
        status_led,
        Delay,
    );

    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::uplink_task(uplink)).unwrap();

    info!("All tasks spawned");
}
