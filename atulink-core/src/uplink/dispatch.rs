//! Remote command dispatch
//!
//! Commands arrive as single ASCII digits on the command topic:
//!
//! | Payload       | Action                                   |
//! |---------------|------------------------------------------|
//! | `1` `2` `3`   | press TUNE / AUTO / BYPASS               |
//! | `4` / `5`     | transformer relay on / off               |
//! | `6` `7` `8`   | select antenna 1 / 2 / 3                 |
//!
//! Only the first byte counts; anything else is ignored.

use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use atulink_hal::OutputPin;

/// Front panel buttons
///
/// All three are wired to the single tune control line, so pressing any
/// of them produces the same pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Tune,
    Auto,
    Bypass,
}

/// Antenna selector position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Antenna {
    #[default]
    One,
    Two,
    Three,
}

impl Antenna {
    pub const ALL: [Antenna; 3] = [Antenna::One, Antenna::Two, Antenna::Three];

    /// 1-based antenna number; anything unknown selects antenna 1
    pub fn from_number(number: u8) -> Self {
        match number {
            2 => Antenna::Two,
            3 => Antenna::Three,
            _ => Antenna::One,
        }
    }

    /// 0-based relay index
    pub fn index(&self) -> usize {
        match self {
            Antenna::One => 0,
            Antenna::Two => 1,
            Antenna::Three => 2,
        }
    }
}

/// A decoded command payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RemoteCommand {
    Press(Button),
    Trafo(bool),
    SelectAntenna(Antenna),
}

impl RemoteCommand {
    /// Decode from the first payload byte; `None` for empty or unknown
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let command = match *payload.first()? {
            b'1' => RemoteCommand::Press(Button::Tune),
            b'2' => RemoteCommand::Press(Button::Auto),
            b'3' => RemoteCommand::Press(Button::Bypass),
            b'4' => RemoteCommand::Trafo(true),
            b'5' => RemoteCommand::Trafo(false),
            b @ b'6'..=b'8' => RemoteCommand::SelectAntenna(Antenna::from_number(b - b'5')),
            _ => return None,
        };
        Some(command)
    }
}

/// Relay whose state is reported after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Relay {
    Trafo,
    Antenna(Antenna),
}

/// New relay state to publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusUpdate {
    pub relay: Relay,
    pub on: bool,
}

impl StatusUpdate {
    /// Payload as published: `"1"` or `"0"`
    pub fn payload(&self) -> &'static [u8] {
        if self.on {
            b"1"
        } else {
            b"0"
        }
    }
}

pub type StatusUpdates = Vec<StatusUpdate, 3>;

/// The tuner's control lines
///
/// Exactly one antenna relay is energized at any time.
pub struct ControlPanel<P> {
    tune: P,
    trafo: P,
    antennas: [P; 3],
    selected: Antenna,
}

impl<P: OutputPin> ControlPanel<P> {
    /// Take the pins and drive the power-up state: tune idle, transformer
    /// off, antenna 1 selected
    pub fn new(mut tune: P, mut trafo: P, antennas: [P; 3]) -> Self {
        tune.set_low();
        trafo.set_low();
        let mut panel = Self {
            tune,
            trafo,
            antennas,
            selected: Antenna::One,
        };
        panel.drive_antennas(Antenna::One);
        panel
    }

    pub fn selected_antenna(&self) -> Antenna {
        self.selected
    }

    pub fn trafo_on(&self) -> bool {
        self.trafo.is_set_high()
    }

    /// Execute a command, returning the relay states to report
    ///
    /// Button presses hold the tune line high for `pulse_ms`.
    pub async fn apply<D: DelayNs>(
        &mut self,
        command: RemoteCommand,
        delay: &mut D,
        pulse_ms: u32,
    ) -> StatusUpdates {
        let mut updates = StatusUpdates::new();
        match command {
            RemoteCommand::Press(_) => {
                self.tune.set_high();
                delay.delay_ms(pulse_ms).await;
                self.tune.set_low();
            }
            RemoteCommand::Trafo(on) => {
                self.trafo.set_state(on);
                let _ = updates.push(StatusUpdate {
                    relay: Relay::Trafo,
                    on,
                });
            }
            RemoteCommand::SelectAntenna(antenna) => {
                self.drive_antennas(antenna);
                for candidate in Antenna::ALL {
                    let _ = updates.push(StatusUpdate {
                        relay: Relay::Antenna(candidate),
                        on: candidate == antenna,
                    });
                }
            }
        }
        updates
    }

    fn drive_antennas(&mut self, antenna: Antenna) {
        // Release before energizing so two relays are never on together
        for (index, pin) in self.antennas.iter_mut().enumerate() {
            if index != antenna.index() {
                pin.set_low();
            }
        }
        self.antennas[antenna.index()].set_high();
        self.selected = antenna;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use embassy_futures::block_on;
    use std::rc::Rc;
    use std::vec::Vec as StdVec;

    type Log = Rc<RefCell<StdVec<(&'static str, bool)>>>;

    struct LoggedPin {
        name: &'static str,
        high: bool,
        log: Log,
    }

    impl OutputPin for LoggedPin {
        fn set_high(&mut self) {
            self.high = true;
            self.log.borrow_mut().push((self.name, true));
        }

        fn set_low(&mut self) {
            self.high = false;
            self.log.borrow_mut().push((self.name, false));
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    struct FakeDelay {
        log: Log,
        total_ms: u32,
    }

    impl DelayNs for FakeDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns / 1_000_000;
            self.log.borrow_mut().push(("delay", true));
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms;
            self.log.borrow_mut().push(("delay", true));
        }
    }

    fn panel() -> (ControlPanel<LoggedPin>, FakeDelay, Log) {
        let log: Log = Rc::default();
        let pin = |name| LoggedPin {
            name,
            high: false,
            log: log.clone(),
        };
        let panel = ControlPanel::new(pin("tune"), pin("trafo"), [pin("ant1"), pin("ant2"), pin("ant3")]);
        let delay = FakeDelay {
            log: log.clone(),
            total_ms: 0,
        };
        log.borrow_mut().clear();
        (panel, delay, log)
    }

    fn antenna_lines(panel: &ControlPanel<LoggedPin>) -> [bool; 3] {
        [
            panel.antennas[0].high,
            panel.antennas[1].high,
            panel.antennas[2].high,
        ]
    }

    #[test]
    fn test_payload_table() {
        assert_eq!(
            RemoteCommand::from_payload(b"1"),
            Some(RemoteCommand::Press(Button::Tune))
        );
        assert_eq!(
            RemoteCommand::from_payload(b"5"),
            Some(RemoteCommand::Trafo(false))
        );
        assert_eq!(
            RemoteCommand::from_payload(b"7extra"),
            Some(RemoteCommand::SelectAntenna(Antenna::Two))
        );
        assert_eq!(RemoteCommand::from_payload(b"9"), None);
        assert_eq!(RemoteCommand::from_payload(b"0"), None);
        assert_eq!(RemoteCommand::from_payload(b""), None);
    }

    #[test]
    fn test_power_up_state() {
        let (panel, _, _) = panel();
        assert_eq!(panel.selected_antenna(), Antenna::One);
        assert_eq!(antenna_lines(&panel), [true, false, false]);
        assert!(!panel.trafo_on());
        assert!(!panel.tune.high);
    }

    #[test]
    fn test_every_button_pulses_tune_line() {
        for button in [Button::Tune, Button::Auto, Button::Bypass] {
            let (mut panel, mut delay, log) = panel();
            let updates = block_on(panel.apply(RemoteCommand::Press(button), &mut delay, 500));
            assert!(updates.is_empty());
            assert_eq!(delay.total_ms, 500);
            assert_eq!(
                *log.borrow(),
                std::vec![("tune", true), ("delay", true), ("tune", false)]
            );
        }
    }

    #[test]
    fn test_trafo_reports_state() {
        let (mut panel, mut delay, _) = panel();
        let updates = block_on(panel.apply(RemoteCommand::Trafo(true), &mut delay, 500));
        assert!(panel.trafo_on());
        assert_eq!(
            updates.as_slice(),
            &[StatusUpdate {
                relay: Relay::Trafo,
                on: true
            }]
        );
        assert_eq!(updates[0].payload(), b"1");
        assert_eq!(delay.total_ms, 0);
    }

    #[test]
    fn test_select_antenna_two() {
        let (mut panel, mut delay, _) = panel();
        let updates = block_on(panel.apply(
            RemoteCommand::SelectAntenna(Antenna::Two),
            &mut delay,
            500,
        ));
        assert_eq!(antenna_lines(&panel), [false, true, false]);
        let reported: StdVec<(Relay, &[u8])> =
            updates.iter().map(|u| (u.relay, u.payload())).collect();
        assert_eq!(
            reported,
            std::vec![
                (Relay::Antenna(Antenna::One), &b"0"[..]),
                (Relay::Antenna(Antenna::Two), &b"1"[..]),
                (Relay::Antenna(Antenna::Three), &b"0"[..]),
            ]
        );
    }

    #[test]
    fn test_relays_never_overlap() {
        let (mut panel, mut delay, log) = panel();
        block_on(panel.apply(RemoteCommand::SelectAntenna(Antenna::Three), &mut delay, 500));
        // ant1 released before ant3 is energized
        let order: StdVec<_> = log.borrow().clone();
        let release = order.iter().position(|e| *e == ("ant1", false)).unwrap();
        let energize = order.iter().position(|e| *e == ("ant3", true)).unwrap();
        assert!(release < energize);
    }

    #[test]
    fn test_unknown_number_selects_first() {
        assert_eq!(Antenna::from_number(0), Antenna::One);
        assert_eq!(Antenna::from_number(9), Antenna::One);
        assert_eq!(Antenna::from_number(3), Antenna::Three);
    }
}
