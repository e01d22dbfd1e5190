//! Settle tick and snapshot output
//!
//! Ticks the settle tracker every millisecond. Once a screen has been
//! quiet long enough its snapshot is copied out under the lock and
//! written to the UART outside it.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embassy_time::{Duration, Instant, Ticker};
use embedded_io_async::Write;

use atulink_core::config::EmulatorConfig;
use atulink_core::display::DecodeStats;
use atulink_protocol::encode_snapshot;

use crate::DEVICE;

/// How often decoder statistics are logged when they change
const STATS_INTERVAL_MS: u32 = 10_000;

#[embassy_executor::task]
pub async fn snapshot_task(mut tx: BufferedUartTx, config: EmulatorConfig) {
    info!("Snapshot task started");

    let mut ticker = Ticker::every(Duration::from_millis(config.tick_ms as u64));
    let mut last_stats = DecodeStats::default();
    let mut last_stats_ms = 0u32;

    loop {
        ticker.next().await;

        let now_ms = Instant::now().as_millis() as u32;
        let (snapshot, stats) = DEVICE.lock(|device| {
            let mut device = device.borrow_mut();
            (device.tick(now_ms), device.stats)
        });

        if let Some(snapshot) = snapshot {
            let line = encode_snapshot(&snapshot);
            trace!("snapshot {=[u8]:a}", &line[..]);
            if let Err(e) = tx.write_all(&line).await {
                warn!("snapshot write failed: {:?}", e);
            }
        }

        if now_ms.wrapping_sub(last_stats_ms) >= STATS_INTERVAL_MS {
            last_stats_ms = now_ms;
            if stats != last_stats {
                debug!(
                    "decoder: {} frames, {} reads, {} unknown",
                    stats.frames, stats.read_requests, stats.unknown_opcodes
                );
                last_stats = stats;
            }
        }
    }
}
