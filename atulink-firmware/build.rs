//! Build script for atulink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bridge.toml at compile time

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => panic!("OUT_DIR not set: {}", e),
    };

    // Copy memory.x to the output directory
    if let Err(e) = fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")) {
        panic!("failed to write memory.x: {}", e);
    }

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Expected shape of a configuration value
#[derive(Clone, Copy)]
enum Kind {
    /// String of at most this many bytes
    Str(usize),
    /// Integer within the inclusive range
    Int(i64, i64),
    Bool,
}

const WIFI_KEYS: &[(&str, Kind)] = &[
    ("ssid", Kind::Str(32)),
    ("passphrase", Kind::Str(64)),
    ("hostname", Kind::Str(32)),
];

const MQTT_KEYS: &[(&str, Kind)] = &[
    ("host", Kind::Str(64)),
    ("port", Kind::Int(1, 65535)),
    ("client_id", Kind::Str(32)),
    ("user", Kind::Str(32)),
    ("password", Kind::Str(64)),
    ("keep_alive_s", Kind::Int(0, 65535)),
];

const TOPIC_KEYS: &[(&str, Kind)] = &[
    ("data", Kind::Str(64)),
    ("rssi", Kind::Str(64)),
    ("will", Kind::Str(64)),
    ("cmd", Kind::Str(64)),
    ("trafo_relay", Kind::Str(64)),
    ("ant1_relay", Kind::Str(64)),
    ("ant2_relay", Kind::Str(64)),
    ("ant3_relay", Kind::Str(64)),
];

const TIMING_KEYS: &[(&str, Kind)] = &[
    ("heartbeat_s", Kind::Int(1, 65535)),
    ("pulse_ms", Kind::Int(1, 65535)),
    ("link_retries", Kind::Int(1, 255)),
];

const UI_KEYS: &[(&str, Kind)] = &[("status_led", Kind::Bool)];

const SECTIONS: &[(&str, &[(&str, Kind)])] = &[
    ("wifi", WIFI_KEYS),
    ("mqtt", MQTT_KEYS),
    ("topics", TOPIC_KEYS),
    ("timing", TIMING_KEYS),
    ("ui", UI_KEYS),
];

/// Validate bridge.toml configuration at compile time
fn validate_config() {
    // Re-run if bridge.toml changes
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: bridge.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds bridge.toml at compile time.                ║\n\
            ║  Please create one in the atulink-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bridge.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bridge.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = validate_sections(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid bridge configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    let ssid_empty = config
        .get("wifi")
        .and_then(|w| w.get("ssid"))
        .and_then(|s| s.as_str())
        .map_or(true, str::is_empty);
    if ssid_empty {
        println!("cargo:warning=bridge.toml has no wifi ssid, the bridge will never associate");
    }

    println!("cargo:warning=bridge.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check every section and key against the known layout
///
/// The on-target parser only understands flat sections with string,
/// integer and boolean values, so anything else is rejected here.
fn validate_sections(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return errors,
    };

    for (section, body) in root {
        let keys = match SECTIONS.iter().find(|(name, _)| name == section) {
            Some((_, keys)) => keys,
            None => {
                errors.push(format!("unknown section [{}]", section));
                continue;
            }
        };

        let table = match body.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };

        for (key, value) in table {
            match keys.iter().find(|(name, _)| name == key) {
                Some((_, kind)) => {
                    if let Err(e) = check_value(*kind, value) {
                        errors.push(format!("[{}] {}: {}", section, key, e));
                    }
                }
                None => errors.push(format!("[{}] unknown key '{}'", section, key)),
            }
        }
    }

    errors
}

fn check_value(kind: Kind, value: &toml::Value) -> Result<(), String> {
    match (kind, value) {
        (Kind::Str(max), toml::Value::String(s)) => {
            if s.len() > max {
                Err(format!("longer than {} bytes", max))
            } else if s.contains('"') || s.contains('\\') {
                Err("quotes and backslashes are not supported".to_string())
            } else {
                Ok(())
            }
        }
        (Kind::Int(min, max), toml::Value::Integer(n)) => {
            if (min..=max).contains(n) {
                Ok(())
            } else {
                Err(format!("must be {}-{}", min, max))
            }
        }
        (Kind::Bool, toml::Value::Boolean(_)) => Ok(()),
        (Kind::Str(_), _) => Err("must be a string".to_string()),
        (Kind::Int(..), _) => Err("must be an integer".to_string()),
        (Kind::Bool, _) => Err("must be true or false".to_string()),
    }
}
