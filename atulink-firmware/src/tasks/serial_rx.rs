//! Snapshot UART receive task
//!
//! Assembles newline-terminated snapshot lines from the LCD emulator and
//! hands them to the uplink loop.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use atulink_protocol::LineAssembler;

use crate::channels::{Line, LINES};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut assembler = LineAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    if let Some(line) = assembler.push(byte) {
                        forward(line);
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
                assembler.clear();
            }
        }
    }
}

fn forward(line: &[u8]) {
    let Ok(line) = Line::from_slice(line) else {
        warn!("Snapshot line too long ({} bytes), dropping", line.len());
        return;
    };
    if LINES.try_send(line).is_err() {
        warn!("Line channel full, dropping snapshot");
    }
}
