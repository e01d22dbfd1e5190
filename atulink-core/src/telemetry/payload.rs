//! JSON rendering for the data topic

use heapless::String;
use serde::{Serialize, Serializer};

use super::record::TelemetryRecord;

/// Every numeric cell is at most four plain-decimal characters, so the
/// widest payload stays well below this
pub const JSON_CAPACITY: usize = 256;

pub type JsonPayload = String<JSON_CAPACITY>;

/// Data topic document; field order is the key order
#[derive(Serialize)]
struct DataMessage {
    tuning: bool,
    resetting: bool,
    auto_mode: bool,
    #[serde(serialize_with = "number")]
    pwr_in: f32,
    txing: bool,
    #[serde(serialize_with = "number")]
    pwr_out: f32,
    #[serde(serialize_with = "number")]
    efficiency: f32,
    #[serde(serialize_with = "number")]
    swr: f32,
    lc_network: bool,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "optional_number")]
    inductance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "optional_number")]
    capacitance: Option<f32>,
}

impl From<&TelemetryRecord> for DataMessage {
    fn from(record: &TelemetryRecord) -> Self {
        Self {
            tuning: record.tuning,
            resetting: record.resetting,
            auto_mode: record.auto_mode,
            pwr_in: record.pwr_in,
            txing: record.txing,
            pwr_out: record.pwr_out,
            efficiency: record.efficiency,
            swr: record.swr.unwrap_or(0.0),
            lc_network: record.lc_network,
            inductance: record.network.map(|n| n.inductance),
            capacitance: record.network.map(|n| n.capacitance),
        }
    }
}

/// Whole values render without a fraction (`050` becomes `50`)
fn number<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    let whole = *value as i32;
    if whole as f32 == *value {
        serializer.serialize_i32(whole)
    } else {
        serializer.serialize_f32(*value)
    }
}

fn optional_number<S: Serializer>(value: &Option<f32>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => number(v, serializer),
        None => serializer.serialize_none(),
    }
}

/// Render a record with the fixed key order
///
/// Absent SWR renders as 0. The inductance/capacitance pair is only
/// emitted when both values are present.
pub fn render_json(record: &TelemetryRecord) -> Result<JsonPayload, serde_json_core::ser::Error> {
    serde_json_core::to_string(&DataMessage::from(record))
}
