//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use atulink_protocol::LINE_CAPACITY;

/// Channel capacity for snapshot lines
const LINE_CHANNEL_SIZE: usize = 4;

/// One completed snapshot line, terminator stripped
pub type Line = Vec<u8, LINE_CAPACITY>;

/// Snapshot lines from the serial receiver to the uplink loop
///
/// Senders drop lines when full; a newer screen follows shortly.
pub static LINES: Channel<CriticalSectionRawMutex, Line, LINE_CHANNEL_SIZE> = Channel::new();
