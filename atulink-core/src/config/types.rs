//! Configuration type definitions

use heapless::String;

use atulink_hal::{I2cTargetConfig, UartConfig};
use crate::display::DEFAULT_QUIESCENCE_MS;
use crate::traits::MAX_TOPIC_LEN;

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA passphrase length
pub const MAX_SECRET_LEN: usize = 64;

/// Maximum hostname, client id or user name length
pub const MAX_NAME_LEN: usize = 32;

/// Maximum broker host length
pub const MAX_HOST_LEN: usize = 64;

pub type Topic = String<MAX_TOPIC_LEN>;

/// Copy `text` into a bounded string, truncating if it does not fit
pub(crate) fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// WiFi credentials
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WifiConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub passphrase: String<MAX_SECRET_LEN>,
    pub hostname: String<MAX_NAME_LEN>,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            passphrase: String::new(),
            hostname: bounded("atu100"),
        }
    }
}

/// Broker endpoint and session
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MqttConfig {
    pub host: String<MAX_HOST_LEN>,
    pub port: u16,
    pub client_id: String<MAX_NAME_LEN>,
    /// Empty means anonymous
    pub user: String<MAX_NAME_LEN>,
    pub password: String<MAX_SECRET_LEN>,
    pub keep_alive_s: u16,
}

impl MqttConfig {
    pub fn username(&self) -> Option<&str> {
        (!self.user.is_empty()).then_some(self.user.as_str())
    }

    pub fn password(&self) -> Option<&str> {
        (!self.password.is_empty()).then_some(self.password.as_str())
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: bounded("192.168.1.1"),
            port: 1883,
            client_id: bounded("atu100"),
            user: String::new(),
            password: String::new(),
            keep_alive_s: 15,
        }
    }
}

/// Topic names
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TopicConfig {
    /// Telemetry JSON
    pub data: Topic,
    /// Signal strength heartbeat
    pub rssi: Topic,
    /// Presence, `"true"` while connected, last will `"false"`
    pub will: Topic,
    /// Inbound commands
    pub cmd: Topic,
    pub trafo_relay: Topic,
    pub ant1_relay: Topic,
    pub ant2_relay: Topic,
    pub ant3_relay: Topic,
}

impl TopicConfig {
    /// Status topic for antenna `index` (0-based)
    pub fn antenna(&self, index: usize) -> &str {
        match index {
            1 => &self.ant2_relay,
            2 => &self.ant3_relay,
            _ => &self.ant1_relay,
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            data: bounded("hamradio/atu100/data"),
            rssi: bounded("hamradio/atu100/rssi"),
            will: bounded("hamradio/atu100/alive"),
            cmd: bounded("hamradio/atu100/cmd"),
            trafo_relay: bounded("hamradio/atu100/trafo"),
            ant1_relay: bounded("hamradio/atu100/ant1"),
            ant2_relay: bounded("hamradio/atu100/ant2"),
            ant3_relay: bounded("hamradio/atu100/ant3"),
        }
    }
}

/// Uplink timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Interval between signal strength reports
    pub heartbeat_s: u16,
    /// Length of a simulated button press
    pub pulse_ms: u16,
    /// Link polls per association attempt
    pub link_retries: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            heartbeat_s: 10,
            pulse_ms: 500,
            link_retries: 10,
        }
    }
}

/// Status indication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UiConfig {
    /// Drive the status LED (blink patterns while connecting)
    pub status_led: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { status_led: true }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    pub wifi: WifiConfig,
    pub mqtt: MqttConfig,
    pub topics: TopicConfig,
    pub timing: TimingConfig,
    pub ui: UiConfig,
}

/// LCD emulator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmulatorConfig {
    /// Bus target the tuner writes to
    pub i2c: I2cTargetConfig,
    /// Snapshot output
    pub uart: UartConfig,
    /// Quiet time before a snapshot is sent
    pub quiescence_ms: u32,
    /// Settle tracker tick
    pub tick_ms: u32,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            i2c: I2cTargetConfig::default(),
            uart: UartConfig::default(),
            quiescence_ms: DEFAULT_QUIESCENCE_MS,
            tick_ms: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.mqtt.client_id.as_str(), "atu100");
        assert_eq!(config.mqtt.username(), None);
        assert_eq!(config.topics.will.as_str(), "hamradio/atu100/alive");
        assert_eq!(config.timing.heartbeat_s, 10);
        assert_eq!(config.timing.pulse_ms, 500);
    }

    #[test]
    fn test_antenna_topics() {
        let topics = TopicConfig::default();
        assert_eq!(topics.antenna(0), "hamradio/atu100/ant1");
        assert_eq!(topics.antenna(2), "hamradio/atu100/ant3");
    }

    #[test]
    fn test_bounded_truncates() {
        let s: String<4> = bounded("abcdef");
        assert_eq!(s.as_str(), "abcd");
    }

    #[test]
    fn test_emulator_defaults() {
        let config = EmulatorConfig::default();
        assert_eq!(config.i2c.address, 0x27);
        assert_eq!(config.uart.baudrate, 9600);
        assert_eq!(config.quiescence_ms, 100);
    }
}
