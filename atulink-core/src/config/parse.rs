//! Minimal TOML loader for the bridge configuration
//!
//! Handles only the subset `bridge.toml` uses:
//! - `[section]` headers
//! - `key = value` with quoted strings, integers and booleans
//! - `#` comments, full-line or trailing
//!
//! Every key belongs to a known section. Unknown sections or keys are
//! rejected rather than ignored so typos do not silently fall back to
//! defaults. The build script validates the same file with a full TOML
//! parser before it is embedded.

use core::str::FromStr;

use heapless::String;

use super::types::BridgeConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Line is neither a header nor `key = value`
    Syntax,
    /// Section name not recognized
    UnknownSection,
    /// Key not valid in its section (or outside any section)
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String longer than its field
    ValueTooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Wifi,
    Mqtt,
    Topics,
    Timing,
    Ui,
}

/// Parse TOML text into a [`BridgeConfig`], starting from defaults
pub fn parse_bridge_config(input: &str) -> Result<BridgeConfig, ConfigError> {
    let mut config = BridgeConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = strip_comment(header)
                .strip_suffix(']')
                .ok_or(ConfigError::Syntax)?;
            section = parse_section_header(name.trim())?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::Syntax)?;
        apply_value(&mut config, section, key, value)?;
    }

    Ok(config)
}

fn parse_section_header(name: &str) -> Result<Section, ConfigError> {
    match name {
        "wifi" => Ok(Section::Wifi),
        "mqtt" => Ok(Section::Mqtt),
        "topics" => Ok(Section::Topics),
        "timing" => Ok(Section::Timing),
        "ui" => Ok(Section::Ui),
        _ => Err(ConfigError::UnknownSection),
    }
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return text[..i].trim_end(),
            _ => {}
        }
    }
    text
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value.trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ConfigError::InvalidValue)?;
    if inner.contains('"') || inner.contains('\\') {
        // Escapes are not supported
        return Err(ConfigError::InvalidValue);
    }
    String::try_from(inner).map_err(|_| ConfigError::ValueTooLong)
}

fn parse_int<T: FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn apply_value(
    config: &mut BridgeConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match (section, key) {
        (Section::Wifi, "ssid") => config.wifi.ssid = parse_string(value)?,
        (Section::Wifi, "passphrase") => config.wifi.passphrase = parse_string(value)?,
        (Section::Wifi, "hostname") => config.wifi.hostname = parse_string(value)?,

        (Section::Mqtt, "host") => config.mqtt.host = parse_string(value)?,
        (Section::Mqtt, "port") => config.mqtt.port = parse_int(value)?,
        (Section::Mqtt, "client_id") => config.mqtt.client_id = parse_string(value)?,
        (Section::Mqtt, "user") => config.mqtt.user = parse_string(value)?,
        (Section::Mqtt, "password") => config.mqtt.password = parse_string(value)?,
        (Section::Mqtt, "keep_alive_s") => config.mqtt.keep_alive_s = parse_int(value)?,

        (Section::Topics, "data") => config.topics.data = parse_string(value)?,
        (Section::Topics, "rssi") => config.topics.rssi = parse_string(value)?,
        (Section::Topics, "will") => config.topics.will = parse_string(value)?,
        (Section::Topics, "cmd") => config.topics.cmd = parse_string(value)?,
        (Section::Topics, "trafo_relay") => config.topics.trafo_relay = parse_string(value)?,
        (Section::Topics, "ant1_relay") => config.topics.ant1_relay = parse_string(value)?,
        (Section::Topics, "ant2_relay") => config.topics.ant2_relay = parse_string(value)?,
        (Section::Topics, "ant3_relay") => config.topics.ant3_relay = parse_string(value)?,

        (Section::Timing, "heartbeat_s") => config.timing.heartbeat_s = parse_int(value)?,
        (Section::Timing, "pulse_ms") => config.timing.pulse_ms = parse_int(value)?,
        (Section::Timing, "link_retries") => config.timing.link_retries = parse_int(value)?,

        (Section::Ui, "status_led") => config.ui.status_led = parse_bool(value)?,

        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}
