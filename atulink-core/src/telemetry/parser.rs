//! Positional snapshot parser
//!
//! The tuner draws a fixed 20x4 layout, serialized here as one 80
//! character line. Which offsets hold which value depends on the mode the
//! screen is in, so each mode has its own extraction table.

use super::record::{FormatError, Network, TelemetryRecord};

const MARKER: &[u8] = b"PWR=";

/// Half-open byte range within the line
type Span = (usize, usize);

const PWR_IN: Span = (4, 7);
const AUTO_DOT: usize = 8;
const NETWORK_KIND: usize = 9;
const TX_MARK_UPPER: usize = 11;
const TX_MARK_LOWER: usize = 76;
const STATUS_LABEL: Span = (64, 68);
const RESET_LABEL: Span = (64, 69);
const STATUS_VALUE: Span = (68, 72);

/// Where the mode-dependent values live
struct Layout {
    pwr_out: Option<Span>,
    efficiency: Option<Span>,
    inductance: Option<Span>,
    capacitance: Option<Span>,
}

/// Transmitting: output power and efficiency replace the network values
const TRANSMITTING: Layout = Layout {
    pwr_out: Some((12, 15)),
    efficiency: Some((77, 79)),
    inductance: None,
    capacitance: None,
};

/// Idle with an L-C network
const LC_NETWORK: Layout = Layout {
    pwr_out: None,
    efficiency: None,
    inductance: Some((11, 15)),
    capacitance: Some((75, 79)),
};

/// Idle with a C-L network; the two values trade places on screen
const CL_NETWORK: Layout = Layout {
    pwr_out: None,
    efficiency: None,
    inductance: Some((75, 79)),
    capacitance: Some((11, 15)),
};

/// Bytes in `span`, clamped to the line; empty when out of range
fn field(line: &[u8], (start, end): Span) -> &[u8] {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or(&[])
}

/// Byte at `index`, NUL when out of range
fn char_at(line: &[u8], index: usize) -> u8 {
    line.get(index).copied().unwrap_or(0)
}

/// Trimmed plain decimal (digits, `.` and `-` only), `None` otherwise
///
/// Exponents, `inf` and `NaN` are not display text and are rejected.
fn number(bytes: &[u8]) -> Option<f32> {
    let text = bytes.trim_ascii();
    if text.is_empty()
        || !text
            .iter()
            .all(|b| b.is_ascii_digit() || *b == b'.' || *b == b'-')
    {
        return None;
    }
    core::str::from_utf8(text).ok()?.parse::<f32>().ok()
}

/// Numbers that are always published; blank or garbled cells read as zero
fn value(line: &[u8], span: Span) -> f32 {
    number(field(line, span)).unwrap_or(0.0)
}

fn optional(line: &[u8], span: Option<Span>) -> Option<f32> {
    span.and_then(|s| number(field(line, s)))
}

/// Parse one snapshot line into a record
pub fn parse_line(line: &[u8]) -> Result<TelemetryRecord, FormatError> {
    if !line.starts_with(MARKER) {
        return Err(FormatError::MissingMarker);
    }

    let pwr_in = value(line, PWR_IN);
    let auto_mode = char_at(line, AUTO_DOT) == b'.';
    let txing = char_at(line, TX_MARK_UPPER) == b'=' || char_at(line, TX_MARK_LOWER) == b'=';
    let tuning = field(line, STATUS_VALUE) == b"TUNE";
    let resetting = field(line, RESET_LABEL) == b"RESET";

    let swr = if field(line, STATUS_LABEL) == b"SWR=" && !tuning {
        number(field(line, STATUS_VALUE))
    } else {
        None
    };

    let lc_network = !txing && char_at(line, NETWORK_KIND) == b'L';
    let layout = if txing {
        &TRANSMITTING
    } else if lc_network {
        &LC_NETWORK
    } else {
        &CL_NETWORK
    };

    let (pwr_out, efficiency) = match (layout.pwr_out, layout.efficiency) {
        (Some(out), Some(eff)) => (value(line, out), value(line, eff)),
        _ => (0.0, 0.0),
    };

    let network = match (
        optional(line, layout.inductance),
        optional(line, layout.capacitance),
    ) {
        (Some(inductance), Some(capacitance)) => Some(Network {
            inductance,
            capacitance,
        }),
        _ => None,
    };

    Ok(TelemetryRecord {
        tuning,
        resetting,
        auto_mode,
        txing,
        pwr_in,
        pwr_out,
        efficiency,
        swr,
        lc_network,
        network,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An 80-character line with text placed at the given offsets
    fn screen(parts: &[(usize, &str)]) -> [u8; 80] {
        let mut line = [b' '; 80];
        for (offset, text) in parts {
            line[*offset..*offset + text.len()].copy_from_slice(text.as_bytes());
        }
        line
    }

    #[test]
    fn test_transmitting() {
        let line = screen(&[
            (0, "PWR= 50W"),
            (11, "= 45"),
            (64, "SWR=1.10"),
            (77, "90"),
        ]);
        let record = parse_line(&line).unwrap();
        assert!(record.txing);
        assert!(!record.tuning);
        assert!(!record.lc_network);
        assert_eq!(record.pwr_in, 50.0);
        assert_eq!(record.pwr_out, 45.0);
        assert_eq!(record.efficiency, 90.0);
        assert_eq!(record.swr, Some(1.10));
        assert_eq!(record.network, None);
    }

    #[test]
    fn test_tx_mark_on_lower_row() {
        let line = screen(&[(0, "PWR=100"), (12, " 80"), (76, "=85")]);
        let record = parse_line(&line).unwrap();
        assert!(record.txing);
        assert_eq!(record.pwr_in, 100.0);
        assert_eq!(record.efficiency, 85.0);
    }

    #[test]
    fn test_lc_network() {
        let line = screen(&[(0, "PWR=  0"), (8, ".L 1.25"), (75, " 330")]);
        let record = parse_line(&line).unwrap();
        assert!(record.auto_mode);
        assert!(record.lc_network);
        assert!(!record.txing);
        assert_eq!(record.pwr_out, 0.0);
        assert_eq!(
            record.network,
            Some(Network {
                inductance: 1.25,
                capacitance: 330.0
            })
        );
    }

    #[test]
    fn test_cl_network_swaps_values() {
        let line = screen(&[(0, "PWR=  0"), (9, "C  470"), (75, "2.50")]);
        let record = parse_line(&line).unwrap();
        assert!(!record.lc_network);
        assert!(!record.auto_mode);
        assert_eq!(
            record.network,
            Some(Network {
                inductance: 2.5,
                capacitance: 470.0
            })
        );
    }

    #[test]
    fn test_tuning_hides_swr() {
        let line = screen(&[(0, "PWR= 10"), (64, "SWR=TUNE")]);
        let record = parse_line(&line).unwrap();
        assert!(record.tuning);
        assert_eq!(record.swr, None);
    }

    #[test]
    fn test_resetting() {
        let line = screen(&[(0, "PWR=  0"), (64, "RESET")]);
        let record = parse_line(&line).unwrap();
        assert!(record.resetting);
        assert_eq!(record.swr, None);
    }

    #[test]
    fn test_missing_marker() {
        let line = screen(&[(0, "SWR=1.00")]);
        assert_eq!(parse_line(&line), Err(FormatError::MissingMarker));
        assert_eq!(parse_line(b""), Err(FormatError::MissingMarker));
    }

    #[test]
    fn test_garbled_input_power_reads_zero() {
        let line = screen(&[(0, "PWR=---")]);
        assert_eq!(parse_line(&line).unwrap().pwr_in, 0.0);
    }

    #[test]
    fn test_dotted_transmit_line() {
        let mut line = [b'.'; 80];
        let text = b"PWR=050.100=025SWR=1.5";
        line[..text.len()].copy_from_slice(text);
        let record = parse_line(&line).unwrap();
        assert!(record.txing);
        assert!(!record.auto_mode);
        assert_eq!(record.pwr_in, 50.0);
        assert_eq!(record.pwr_out, 25.0);
        // Cells 77..79 hold ".."
        assert_eq!(record.efficiency, 0.0);
        assert_eq!(record.swr, None);
    }

    #[test]
    fn test_blank_efficiency_still_published() {
        let line = screen(&[(0, "PWR= 50"), (11, "= 45")]);
        let record = parse_line(&line).unwrap();
        assert!(record.txing);
        assert_eq!(record.pwr_out, 45.0);
        assert_eq!(record.efficiency, 0.0);
    }

    #[test]
    fn test_garbled_output_power_reads_zero() {
        let line = screen(&[(0, "PWR= 50"), (11, "=???"), (77, "90")]);
        let record = parse_line(&line).unwrap();
        assert_eq!(record.pwr_out, 0.0);
        assert_eq!(record.efficiency, 90.0);
    }

    #[test]
    fn test_unparsable_swr_is_absent() {
        let line = screen(&[(0, "PWR= 50"), (64, "SWR=-.--")]);
        assert_eq!(parse_line(&line).unwrap().swr, None);
    }

    #[test]
    fn test_half_network_drops_both() {
        let line = screen(&[(0, "PWR=  0"), (9, "L 1.25")]);
        let record = parse_line(&line).unwrap();
        assert_eq!(record.network, None);
    }

    #[test]
    fn test_short_line_does_not_panic() {
        let record = parse_line(b"PWR= 12").unwrap();
        assert_eq!(record.pwr_in, 12.0);
        assert!(!record.txing);
        assert_eq!(record.swr, None);
        assert_eq!(record.network, None);
    }

    #[test]
    fn test_non_decimal_text_rejected() {
        let line = screen(&[(0, "PWR=NaN"), (64, "SWR=1e38")]);
        let record = parse_line(&line).unwrap();
        assert_eq!(record.pwr_in, 0.0);
        assert_eq!(record.swr, None);
    }

    #[test]
    fn test_exponent_network_values_dropped() {
        let line = screen(&[(0, "PWR=  0"), (9, "L 1e38"), (75, "1e38")]);
        assert_eq!(parse_line(&line).unwrap().network, None);
    }
}
