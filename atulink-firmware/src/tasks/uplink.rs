//! Uplink task
//!
//! Owns the bridge's `Uplink` and runs its state machine, interleaved
//! with publishing snapshot lines from the serial receiver.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Delay, Duration, Instant, Timer};

use atulink_core::uplink::{ConnectionState, LineError, LineOutcome, Uplink};
use atulink_hal_rp2040::RpOutput;

use crate::channels::LINES;
use crate::link::WifiLink;
use crate::mqtt::MqttTransport;

/// Longest wait for a line before the next state-machine step
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The concrete uplink the firmware runs
pub type BridgeUplink = Uplink<'static, WifiLink, MqttTransport, RpOutput<'static>, Delay>;

#[embassy_executor::task]
pub async fn uplink_task(mut uplink: BridgeUplink) {
    info!("Uplink task started");

    let mut last_state = ConnectionState::LinkDown;

    loop {
        let now_ms = Instant::now().as_millis() as u32;
        if let Err(e) = uplink.step(now_ms).await {
            warn!("Uplink error: {:?}", e);
        }

        let state = uplink.state();
        if state != last_state {
            info!("Uplink {:?} -> {:?}", last_state, state);
            last_state = state;
        }

        if let Either::First(line) = select(LINES.receive(), Timer::after(POLL_INTERVAL)).await {
            match uplink.handle_line(&line).await {
                Ok(LineOutcome::Published(record)) => {
                    debug!("Published: {:?}", record);
                }
                Ok(LineOutcome::NotReady(_)) => {
                    trace!("Snapshot parsed while offline, not published");
                }
                Err(LineError::Format(e)) => {
                    // Idle screens and menus carry no telemetry
                    trace!("Snapshot without telemetry: {:?}", e);
                }
                Err(e) => {
                    warn!("Snapshot publish failed: {:?}", e);
                }
            }
        }
    }
}
