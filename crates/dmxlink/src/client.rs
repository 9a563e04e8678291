//! ArtNet client: the public entry point

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::config::ArtNetConfig;
use crate::dmx::channels::DMX_CHANNELS;
use crate::dmx::scheduler::Scheduler;
use crate::transport::{Transport, UdpTransport};
use crate::{error::ArtNetError, Result};

/// Sends DMX channel state to ArtNet nodes.
///
/// Channel updates go out as soon as they change something, limited to one
/// frame per universe per throttle interval. Every universe that has been
/// sent once is refreshed with a full frame whenever it stays quiet for the
/// configured refresh period.
///
/// Must be created and used inside a Tokio runtime. Dropping the client
/// closes it.
pub struct ArtNetClient {
    scheduler: Arc<Scheduler>,
}

impl ArtNetClient {
    /// Create a client over any transport
    pub fn new(config: ArtNetConfig, transport: Arc<dyn Transport>) -> Self {
        tracing::info!(
            "Art-Net client created -> {}:{} (refresh {} ms, throttle {} ms, send_all {})",
            config.host,
            config.port,
            config.refresh_ms,
            config.throttle_ms,
            config.send_all
        );

        Self {
            scheduler: Arc::new(Scheduler::new(&config, transport)),
        }
    }

    /// Bind a UDP socket per `config` and create a client on it
    pub async fn connect(config: ArtNetConfig) -> Result<Self> {
        let transport = UdpTransport::bind(&config).await?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Deliver failures of background refresh sends to `sink`.
    ///
    /// Failures of sends triggered by [`set`](Self::set) are returned to the
    /// caller instead.
    pub fn with_error_sink(self, sink: UnboundedSender<ArtNetError>) -> Self {
        self.scheduler.set_error_sink(sink);
        self
    }

    /// Write `values` starting at the 1-indexed `start_channel` of `universe`
    /// and transmit if anything changed.
    ///
    /// Returns [`ArtNetError::Busy`] if the universe was sent less than one
    /// throttle interval ago; the values are kept and go out with the next
    /// frame.
    pub async fn set(&self, universe: u16, start_channel: u16, values: &[u8]) -> Result<()> {
        self.scheduler.set(universe, start_channel, values).await
    }

    /// Write a single channel
    pub async fn set_channel(&self, universe: u16, channel: u16, value: u8) -> Result<()> {
        self.set(universe, channel, &[value]).await
    }

    /// Send `universe` now; `force_full` sends all 512 channels
    pub async fn send(&self, universe: u16, force_full: bool) -> Result<()> {
        self.scheduler.request_send(universe, force_full).await
    }

    /// Send an ArtTrigger frame
    pub async fn trigger(&self, oem: u16, key: u8, subkey: u8) -> Result<()> {
        self.scheduler.trigger(oem, key, subkey).await
    }

    pub fn host(&self) -> String {
        self.scheduler.host()
    }

    pub fn port(&self) -> u16 {
        self.scheduler.port()
    }

    /// Change the destination host
    pub fn set_host(&self, host: &str) -> Result<()> {
        self.scheduler.set_host(host)
    }

    /// Change the destination port. Rejected while the host is the broadcast
    /// address.
    pub fn set_port(&self, port: u16) -> Result<()> {
        self.scheduler.set_port(port)
    }

    /// Current values of all channels of `universe`
    pub fn channels(&self, universe: u16) -> [u8; DMX_CHANNELS] {
        self.scheduler.channels(universe)
    }

    /// The first `length` channels, rounded up to even and clamped to 2-512
    pub fn read_frame(&self, universe: u16, length: usize) -> Result<Vec<u8>> {
        self.scheduler.read_frame(universe, length)
    }

    /// Highest channel changed since the last send of `universe`, 0 if none
    pub fn high_watermark(&self, universe: u16) -> u16 {
        self.scheduler.high_watermark(universe)
    }

    pub fn is_throttled(&self, universe: u16) -> bool {
        self.scheduler.is_throttled(universe)
    }

    pub fn is_closed(&self) -> bool {
        self.scheduler.is_closed()
    }

    /// Stop all refresh timers and release the transport
    pub fn close(&self) {
        self.scheduler.close();
    }
}

impl Drop for ArtNetClient {
    fn drop(&mut self) {
        self.scheduler.close();
    }
}
