//! Telemetry record types

/// One parsed snapshot
///
/// Numbers are in the display's units: watts for power, percent for
/// efficiency, nH/pF as shown for the network values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryRecord {
    pub tuning: bool,
    pub resetting: bool,
    pub auto_mode: bool,
    pub txing: bool,
    /// Zero when the cell is not a number
    pub pwr_in: f32,
    /// Zero unless transmitting
    pub pwr_out: f32,
    /// Zero unless transmitting
    pub efficiency: f32,
    pub swr: Option<f32>,
    pub lc_network: bool,
    /// Network values, both present or both absent
    pub network: Option<Network>,
}

/// Matching network component values
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Network {
    pub inductance: f32,
    pub capacitance: f32,
}

/// Snapshot line rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Line does not start with `PWR=`
    MissingMarker,
}
