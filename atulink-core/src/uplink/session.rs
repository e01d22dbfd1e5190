//! Uplink session driver
//!
//! Owns the link, the broker transport and the control panel, and runs
//! one state-machine step per call. Nothing here blocks for long except
//! the blink patterns while connecting and button pulses.

use core::fmt::Write;

use embedded_hal_async::delay::DelayNs;
use heapless::String;

use atulink_hal::OutputPin;

use super::dispatch::{ControlPanel, Relay, RemoteCommand, StatusUpdate};
use super::events::UplinkEvent;
use super::state::ConnectionState;
use crate::config::BridgeConfig;
use crate::telemetry::{parse_line, render_json, FormatError, TelemetryRecord};
use crate::traits::{ConnectOptions, LastWill, Link, QoS, Transport};

/// Presence payload while connected
pub const PRESENCE_ONLINE: &[u8] = b"true";

/// Presence payload registered as last will
pub const PRESENCE_OFFLINE: &[u8] = b"false";

/// Errors surfaced by [`Uplink::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UplinkError<L, T> {
    Link(L),
    Transport(T),
}

/// Errors surfaced by [`Uplink::handle_line`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError<T> {
    /// Line rejected by the parser
    Format(FormatError),
    /// Record did not fit the payload buffer
    Render,
    /// Publish failed
    Transport(T),
}

/// What happened to a snapshot line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineOutcome {
    /// Parsed and published on the data topic
    Published(TelemetryRecord),
    /// Parsed, but the uplink is not ready
    NotReady(TelemetryRecord),
}

/// The bridge's uplink
pub struct Uplink<'c, L, T, P, D> {
    config: &'c BridgeConfig,
    state: ConnectionState,
    link: L,
    transport: T,
    panel: ControlPanel<P>,
    status_led: P,
    delay: D,
    last_beat_ms: u32,
}

impl<'c, L, T, P, D> Uplink<'c, L, T, P, D>
where
    L: Link,
    T: Transport<'c>,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(
        config: &'c BridgeConfig,
        link: L,
        transport: T,
        panel: ControlPanel<P>,
        mut status_led: P,
        delay: D,
    ) -> Self {
        if config.ui.status_led {
            status_led.set_low();
        }
        Self {
            config,
            state: ConnectionState::LinkDown,
            link,
            transport,
            panel,
            status_led,
            delay,
            last_beat_ms: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn panel(&self) -> &ControlPanel<P> {
        &self.panel
    }

    pub fn link(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    fn apply(&mut self, event: UplinkEvent) {
        self.state = self.state.transition(event);
    }

    /// Run one iteration of the connection lifecycle
    ///
    /// Returns the state after the step. Errors leave the state machine in
    /// a state from which the next call retries.
    pub async fn step(
        &mut self,
        now_ms: u32,
    ) -> Result<ConnectionState, UplinkError<L::Error, T::Error>> {
        match self.state {
            ConnectionState::LinkDown => self.establish_link().await?,
            ConnectionState::LinkUpNoTransport => self.open_session().await?,
            ConnectionState::Ready => {
                if let Err(e) = self.service(now_ms).await {
                    self.apply(UplinkEvent::TransportLost);
                    return Err(e);
                }
            }
        }
        Ok(self.state)
    }

    async fn establish_link(&mut self) -> Result<(), UplinkError<L::Error, T::Error>> {
        if !self.link.is_up() {
            self.link.join().await.map_err(UplinkError::Link)?;
            let mut polls = 0;
            while !self.link.is_up() && polls < self.config.timing.link_retries {
                self.blink(50, 450).await;
                polls += 1;
            }
            if !self.link.is_up() {
                return Ok(());
            }
        }

        let mqtt = &self.config.mqtt;
        self.transport.set_server(&mqtt.host, mqtt.port);
        self.apply(UplinkEvent::LinkEstablished);
        Ok(())
    }

    async fn open_session(&mut self) -> Result<(), UplinkError<L::Error, T::Error>> {
        if !self.link.is_up() {
            self.apply(UplinkEvent::LinkLost);
            return Ok(());
        }

        self.blink(50, 50).await;
        self.blink(50, 350).await;

        let config = self.config;
        let options = ConnectOptions {
            client_id: &config.mqtt.client_id,
            username: config.mqtt.username(),
            password: config.mqtt.password(),
            keep_alive_s: config.mqtt.keep_alive_s,
            will: LastWill {
                topic: &config.topics.will,
                payload: PRESENCE_OFFLINE,
                qos: QoS::ExactlyOnce,
                retain: true,
            },
        };
        self.transport
            .connect(&options)
            .await
            .map_err(UplinkError::Transport)?;
        self.transport
            .publish(&config.topics.will, PRESENCE_ONLINE, true)
            .await
            .map_err(UplinkError::Transport)?;
        self.transport
            .subscribe(&config.topics.cmd)
            .await
            .map_err(UplinkError::Transport)?;

        self.apply(UplinkEvent::TransportConnected);
        Ok(())
    }

    async fn service(&mut self, now_ms: u32) -> Result<(), UplinkError<L::Error, T::Error>> {
        if !self.link.is_up() {
            self.apply(UplinkEvent::LinkLost);
            return Ok(());
        }
        if !self.transport.is_connected() {
            self.apply(UplinkEvent::TransportLost);
            return Ok(());
        }

        self.led(true);

        if let Some(message) = self.transport.poll().await.map_err(UplinkError::Transport)? {
            if message.topic.as_str() == self.config.topics.cmd.as_str() {
                if let Some(command) = RemoteCommand::from_payload(&message.payload) {
                    self.dispatch(command)
                        .await
                        .map_err(UplinkError::Transport)?;
                }
            }
        }

        self.heartbeat(now_ms).await.map_err(UplinkError::Transport)
    }

    /// Execute a command and publish any relay changes
    pub async fn dispatch(&mut self, command: RemoteCommand) -> Result<(), T::Error> {
        let pulse_ms = u32::from(self.config.timing.pulse_ms);
        let updates = self.panel.apply(command, &mut self.delay, pulse_ms).await;
        for update in updates {
            self.publish_status(update).await?;
        }
        Ok(())
    }

    async fn publish_status(&mut self, update: StatusUpdate) -> Result<(), T::Error> {
        let topics = &self.config.topics;
        let topic = match update.relay {
            Relay::Trafo => topics.trafo_relay.as_str(),
            Relay::Antenna(antenna) => topics.antenna(antenna.index()),
        };
        self.transport.publish(topic, update.payload(), true).await
    }

    async fn heartbeat(&mut self, now_ms: u32) -> Result<(), T::Error> {
        if !self.transport.is_connected() {
            return Ok(());
        }
        let interval_ms = u32::from(self.config.timing.heartbeat_s) * 1000;
        if now_ms.wrapping_sub(self.last_beat_ms) < interval_ms {
            return Ok(());
        }
        self.last_beat_ms = now_ms;

        let rssi = self.link.signal_strength().await;
        let mut payload: String<12> = String::new();
        // An i32 always fits in 12 characters
        let _ = write!(payload, "{}", rssi);
        self.transport
            .publish(&self.config.topics.rssi, payload.as_bytes(), true)
            .await
    }

    /// Parse a snapshot line and publish it when ready
    pub async fn handle_line(&mut self, line: &[u8]) -> Result<LineOutcome, LineError<T::Error>> {
        let record = parse_line(line).map_err(LineError::Format)?;
        if !self.state.is_ready() {
            return Ok(LineOutcome::NotReady(record));
        }

        let json = render_json(&record).map_err(|_| LineError::Render)?;
        self.transport
            .publish(&self.config.topics.data, json.as_bytes(), true)
            .await
            .map_err(LineError::Transport)?;
        Ok(LineOutcome::Published(record))
    }

    async fn blink(&mut self, on_ms: u32, off_ms: u32) {
        self.led(true);
        self.delay.delay_ms(on_ms).await;
        self.led(false);
        self.delay.delay_ms(off_ms).await;
    }

    fn led(&mut self, on: bool) {
        if self.config.ui.status_led {
            self.status_led.set_state(on);
        }
    }
}
