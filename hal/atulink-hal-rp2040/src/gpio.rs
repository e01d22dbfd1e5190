//! GPIO outputs

use atulink_hal::OutputPin;
use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::Peri;

/// Push-pull output pin
pub struct RpOutput<'d> {
    pin: Output<'d>,
}

impl<'d> RpOutput<'d> {
    /// Configure `pin` as an output, driven low
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        Self {
            pin: Output::new(pin, Level::Low),
        }
    }
}

impl OutputPin for RpOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
