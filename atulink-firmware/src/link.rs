//! WiFi link over the Pico W's cyw43 radio

use cyw43::JoinOptions;
use embassy_net::Stack;

use atulink_core::config::WifiConfig;
use atulink_core::traits::Link;

/// Errors from the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LinkError {
    /// Association was rejected or timed out
    JoinFailed,
}

/// Station-mode WiFi link with a DHCP-configured stack
pub struct WifiLink {
    control: cyw43::Control<'static>,
    stack: Stack<'static>,
    config: &'static WifiConfig,
}

impl WifiLink {
    pub fn new(
        control: cyw43::Control<'static>,
        stack: Stack<'static>,
        config: &'static WifiConfig,
    ) -> Self {
        Self {
            control,
            stack,
            config,
        }
    }
}

impl Link for WifiLink {
    type Error = LinkError;

    fn is_up(&mut self) -> bool {
        self.stack.is_link_up() && self.stack.is_config_up()
    }

    async fn join(&mut self) -> Result<(), LinkError> {
        let options = if self.config.passphrase.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(self.config.passphrase.as_bytes())
        };
        self.control
            .join(&self.config.ssid, options)
            .await
            .map_err(|_| LinkError::JoinFailed)
    }

    async fn signal_strength(&mut self) -> i32 {
        self.control.get_rssi().await
    }
}
