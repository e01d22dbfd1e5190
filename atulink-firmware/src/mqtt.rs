//! Broker transport on rust-mqtt over an embassy-net TCP socket
//!
//! The socket lives behind a mutex so it can be re-dialled between
//! sessions while the client keeps its buffers. The client is built on
//! the first connect. Publishes go out at QoS 0. The client has no will
//! QoS setting, so `options.will.qos` is not forwarded.

use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::{self, State, TcpSocket};
use embassy_net::{IpAddress, Ipv4Address, Stack};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration, Instant};
use embedded_io_async::{ErrorType, Read, Write};
use heapless::String;
use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::packet::v5::reason_codes::ReasonCode;
use rust_mqtt::utils::rng_generator::CountingRng;

use atulink_core::traits::{ConnectOptions, InboundMessage, Transport};

/// Time allowed for the TCP handshake, CONNACK, SUBACK and one inbound packet
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest broker host name we keep
const MAX_HOST_LEN: usize = 64;

/// MQTT v5 properties the client may attach
const MAX_PROPERTIES: usize = 5;

pub type SocketCell = Mutex<NoopRawMutex, TcpSocket<'static>>;

type Client = MqttClient<'static, SharedSocket, MAX_PROPERTIES, CountingRng>;

/// Errors from the broker connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MqttError {
    /// `set_server` was never called
    NoServer,
    /// Host name did not resolve
    Dns,
    /// TCP connect failed
    Connect,
    /// No answer from the broker in time
    Timeout,
    /// Broker or client library reported a failure
    Broker(ReasonCode),
    /// Operation needs an established session
    NotConnected,
}

impl defmt::Format for MqttError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            MqttError::NoServer => defmt::write!(f, "NoServer"),
            MqttError::Dns => defmt::write!(f, "Dns"),
            MqttError::Connect => defmt::write!(f, "Connect"),
            MqttError::Timeout => defmt::write!(f, "Timeout"),
            MqttError::Broker(code) => defmt::write!(f, "Broker({})", defmt::Debug2Format(code)),
            MqttError::NotConnected => defmt::write!(f, "NotConnected"),
        }
    }
}

/// Socket handle the client reads and writes through
#[derive(Clone, Copy)]
pub struct SharedSocket(&'static SocketCell);

impl ErrorType for SharedSocket {
    type Error = tcp::Error;
}

impl Read for SharedSocket {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, tcp::Error> {
        self.0.lock().await.read(buf).await
    }
}

impl Write for SharedSocket {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, tcp::Error> {
        self.0.lock().await.write(buf).await
    }

    async fn flush(&mut self) -> Result<(), tcp::Error> {
        self.0.lock().await.flush().await
    }
}

/// Broker session on a single TCP socket
pub struct MqttTransport {
    stack: Stack<'static>,
    socket: &'static SocketCell,
    buffers: Option<(&'static mut [u8], &'static mut [u8])>,
    client: Option<Client>,
    host: String<MAX_HOST_LEN>,
    port: u16,
    connected: bool,
    keep_alive: Duration,
    last_ping: Instant,
}

impl MqttTransport {
    pub fn new(
        stack: Stack<'static>,
        socket: &'static SocketCell,
        tx_buf: &'static mut [u8],
        rx_buf: &'static mut [u8],
    ) -> Self {
        Self {
            stack,
            socket,
            buffers: Some((tx_buf, rx_buf)),
            client: None,
            host: String::new(),
            port: 0,
            connected: false,
            keep_alive: Duration::from_secs(0),
            last_ping: Instant::now(),
        }
    }

    async fn resolve(&self) -> Result<IpAddress, MqttError> {
        if self.host.is_empty() {
            return Err(MqttError::NoServer);
        }
        if let Ok(addr) = self.host.parse::<Ipv4Address>() {
            return Ok(IpAddress::Ipv4(addr));
        }
        let addrs = self
            .stack
            .dns_query(&self.host, DnsQueryType::A)
            .await
            .map_err(|_| MqttError::Dns)?;
        addrs.first().copied().ok_or(MqttError::Dns)
    }

    /// Drop the current connection and dial the broker again
    async fn redial(&mut self, addr: IpAddress) -> Result<(), MqttError> {
        let mut socket = self.socket.lock().await;
        if socket.state() != State::Closed {
            socket.abort();
            // Waits for the RST to go out
            let _ = socket.flush().await;
        }
        socket.set_timeout(Some(HANDSHAKE_TIMEOUT + self.keep_alive));
        with_timeout(HANDSHAKE_TIMEOUT, socket.connect((addr, self.port)))
            .await
            .map_err(|_| MqttError::Timeout)?
            .map_err(|_| MqttError::Connect)
    }

    /// The client, built from the first session's options
    fn client(&mut self, options: &ConnectOptions<'static>) -> Option<&mut Client> {
        if self.client.is_none() {
            let (tx_buf, rx_buf) = self.buffers.take()?;
            let mut config = ClientConfig::new(MqttVersion::MQTTv5, CountingRng(20_000));
            config.add_max_subscribe_qos(QualityOfService::QoS1);
            config.add_client_id(options.client_id);
            if let Some(user) = options.username {
                config.add_username(user);
            }
            if let Some(password) = options.password {
                config.add_password(password);
            }
            config.add_will(options.will.topic, options.will.payload, options.will.retain);
            config.keep_alive = options.keep_alive_s;
            config.max_packet_size = rx_buf.len() as u32;
            let (tx_len, rx_len) = (tx_buf.len(), rx_buf.len());
            self.client = Some(MqttClient::new(
                SharedSocket(self.socket),
                tx_buf,
                tx_len,
                rx_buf,
                rx_len,
                config,
            ));
        }
        self.client.as_mut()
    }

    /// Client of the live session
    fn session(&mut self) -> Result<&mut Client, MqttError> {
        match self.client.as_mut() {
            Some(client) if self.connected => Ok(client),
            _ => Err(MqttError::NotConnected),
        }
    }

    fn fail(&mut self, e: MqttError) -> MqttError {
        self.connected = false;
        e
    }

    async fn keep_alive(&mut self) -> Result<(), MqttError> {
        if self.keep_alive.as_ticks() == 0 || self.last_ping.elapsed() < self.keep_alive / 2 {
            return Ok(());
        }
        let client = self.session()?;
        let result = with_timeout(HANDSHAKE_TIMEOUT, client.send_ping()).await;
        match result {
            Ok(Ok(())) => {
                self.last_ping = Instant::now();
                Ok(())
            }
            Ok(Err(code)) => Err(self.fail(MqttError::Broker(code))),
            Err(_) => Err(self.fail(MqttError::Timeout)),
        }
    }
}

impl Transport<'static> for MqttTransport {
    type Error = MqttError;

    fn set_server(&mut self, host: &str, port: u16) {
        self.host.clear();
        for c in host.chars() {
            if self.host.push(c).is_err() {
                break;
            }
        }
        self.port = port;
    }

    async fn connect(&mut self, options: &ConnectOptions<'static>) -> Result<(), MqttError> {
        self.connected = false;
        let addr = self.resolve().await?;
        self.keep_alive = Duration::from_secs(u64::from(options.keep_alive_s));
        self.redial(addr).await?;

        let client = self.client(options).ok_or(MqttError::NotConnected)?;
        with_timeout(HANDSHAKE_TIMEOUT, client.connect_to_broker())
            .await
            .map_err(|_| MqttError::Timeout)?
            .map_err(MqttError::Broker)?;

        self.last_ping = Instant::now();
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), MqttError> {
        let client = self.session()?;
        let result = client
            .send_message(topic, payload, QualityOfService::QoS0, retain)
            .await;
        result.map_err(|code| self.fail(MqttError::Broker(code)))
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), MqttError> {
        let client = self.session()?;
        let result = with_timeout(HANDSHAKE_TIMEOUT, client.subscribe_to_topic(topic)).await;
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(code)) => Err(self.fail(MqttError::Broker(code))),
            Err(_) => Err(self.fail(MqttError::Timeout)),
        }
    }

    async fn poll(&mut self) -> Result<Option<InboundMessage>, MqttError> {
        if !self.connected {
            return Err(MqttError::NotConnected);
        }

        let (readable, open) = {
            let socket = self.socket.lock().await;
            (socket.can_recv(), socket.may_recv())
        };
        if !open {
            return Err(self.fail(MqttError::NotConnected));
        }
        if !readable {
            self.keep_alive().await?;
            return Ok(None);
        }

        let client = self.session()?;
        let received = match with_timeout(HANDSHAKE_TIMEOUT, client.receive_message()).await {
            Ok(Ok((topic, payload))) => Ok(Some(InboundMessage::truncated(topic, payload))),
            // Pings and acks surface as a success code with no message
            Ok(Err(ReasonCode::Success)) => Ok(None),
            Ok(Err(code)) => Err(MqttError::Broker(code)),
            Err(_) => Err(MqttError::Timeout),
        };
        received.map_err(|e| self.fail(e))
    }
}
