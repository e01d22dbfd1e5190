//! Tuner telemetry extracted from display snapshots

mod parser;
mod payload;
mod record;

pub use parser::parse_line;
pub use payload::{render_json, JsonPayload, JSON_CAPACITY};
pub use record::{FormatError, Network, TelemetryRecord};
