//! Per-universe send scheduling
//!
//! Every universe runs its own small state machine:
//!
//! ```text
//! Idle --request_send--> Sending (throttled) --throttle elapsed--> Idle
//! ```
//!
//! A send request while throttled fails with [`ArtNetError::Busy`] and is not
//! queued; the channel buffer already holds the new values, so the next send
//! (manual or refresh) carries them. Each send attempt also re-arms that
//! universe's refresh task, which forces a full 512-channel frame when the
//! universe has been quiet for a whole refresh period.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::artnet::{encode_dmx_frame, encode_trigger_frame};
use super::channels::{frame_length, ChannelBuffer, DMX_CHANNELS};
use crate::config::{is_broadcast, ArtNetConfig};
use crate::transport::Transport;
use crate::{error::ArtNetError, Result};

/// Highest valid universe (15-bit Port-Address)
pub const MAX_UNIVERSE: u16 = 0x7FFF;

#[derive(Debug, Clone)]
struct Destination {
    host: String,
    port: u16,
}

#[derive(Default)]
struct UniverseState {
    buffer: ChannelBuffer,
    throttled: bool,
    refresh: Option<JoinHandle<()>>,
}

type UniverseSlot = Arc<Mutex<UniverseState>>;

/// Owns all universe state and the shared transport
pub struct Scheduler {
    transport: RwLock<Option<Arc<dyn Transport>>>,
    destination: RwLock<Destination>,
    universes: Mutex<HashMap<u16, UniverseSlot>>,
    refresh: Duration,
    throttle: Duration,
    send_all: bool,
    closed: AtomicBool,
    error_sink: Mutex<Option<UnboundedSender<ArtNetError>>>,
}

fn check_universe(universe: u16) -> Result<()> {
    if universe > MAX_UNIVERSE {
        return Err(ArtNetError::InvalidUniverse(universe));
    }
    Ok(())
}

impl Scheduler {
    pub fn new(config: &ArtNetConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: RwLock::new(Some(transport)),
            destination: RwLock::new(Destination {
                host: config.host.clone(),
                port: config.port,
            }),
            universes: Mutex::new(HashMap::new()),
            refresh: config.refresh_interval(),
            throttle: config.throttle_interval(),
            send_all: config.send_all,
            closed: AtomicBool::new(false),
            error_sink: Mutex::new(None),
        }
    }

    /// Route errors of refresh-triggered sends to `sink`
    pub fn set_error_sink(&self, sink: UnboundedSender<ArtNetError>) {
        *self.error_sink.lock() = Some(sink);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(ArtNetError::Closed);
        }
        Ok(())
    }

    /// Look up a universe, creating it on first reference
    fn slot(&self, universe: u16) -> Result<UniverseSlot> {
        check_universe(universe)?;
        let mut universes = self.universes.lock();
        // Checked under the map lock so close() cannot race a new insert
        self.ensure_open()?;
        Ok(Arc::clone(universes.entry(universe).or_default()))
    }

    /// Look up a universe without creating it
    fn existing_slot(&self, universe: u16) -> Option<UniverseSlot> {
        self.universes.lock().get(&universe).cloned()
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        self.transport.read().clone().ok_or(ArtNetError::Closed)
    }

    /// Update channels and, if anything changed, send the universe.
    ///
    /// Returns `Ok(())` without sending when the values were already stored.
    /// On [`ArtNetError::Busy`] the new values stay in the buffer.
    pub async fn set(self: &Arc<Self>, universe: u16, start_channel: u16, values: &[u8]) -> Result<()> {
        let changed = {
            let slot = self.slot(universe)?;
            let mut state = slot.lock();
            state.buffer.set_channels(start_channel, values)?
        };

        if !changed {
            return Ok(());
        }

        self.request_send(universe, false).await
    }

    /// Send the universe now, subject to its throttle
    pub async fn request_send(self: &Arc<Self>, universe: u16, force_full: bool) -> Result<()> {
        self.begin_send(universe, force_full)?.await
    }

    /// Synchronous half of a send: throttle check, encode, re-arm timers and
    /// hand the frame to the transport. The returned future resolves with the
    /// transport's outcome.
    fn begin_send(
        self: &Arc<Self>,
        universe: u16,
        force_full: bool,
    ) -> Result<BoxFuture<'static, Result<()>>> {
        let slot = self.slot(universe)?;
        let destination = self.destination.read().clone();

        let (frame, transport) = {
            let mut state = slot.lock();
            // close() may have run since the slot lookup
            self.ensure_open()?;
            let transport = self.transport()?;

            if state.throttled {
                return Err(ArtNetError::Busy { universe });
            }
            state.throttled = true;

            let watermark = state.buffer.take_watermark();
            let length = if force_full || self.send_all {
                DMX_CHANNELS
            } else {
                frame_length(watermark as usize)
            };
            let frame = encode_dmx_frame(universe, state.buffer.read_frame(length));
            self.arm_refresh(&mut state, universe);

            (frame, transport)
        };

        tracing::trace!(
            "Sending Art-Net DMX frame for universe {} ({} channels) to {}:{}",
            universe,
            frame.len() - super::artnet::HEADER_LEN,
            destination.host,
            destination.port
        );

        let sending = transport.send(frame, &destination.host, destination.port);

        let cooldown_slot = Arc::clone(&slot);
        let cooldown_until = Instant::now() + self.throttle;
        tokio::spawn(async move {
            tokio::time::sleep_until(cooldown_until).await;
            cooldown_slot.lock().throttled = false;
        });

        Ok(async move { sending.await.map_err(ArtNetError::Transmission) }.boxed())
    }

    /// Replace the universe's refresh task with one due a full period from now
    fn arm_refresh(self: &Arc<Self>, state: &mut UniverseState, universe: u16) {
        let refresh = tokio::spawn(refresh_at(
            Arc::downgrade(self),
            universe,
            Instant::now() + self.refresh,
        ));
        if let Some(previous) = state.refresh.replace(refresh) {
            previous.abort();
        }
    }

    /// Send an ArtTrigger frame to the current destination
    pub async fn trigger(&self, oem: u16, key: u8, subkey: u8) -> Result<()> {
        self.ensure_open()?;
        let transport = self.transport()?;
        let destination = self.destination.read().clone();

        tracing::trace!(
            "Sending Art-Net trigger oem={:#06x} key={} subkey={}",
            oem,
            key,
            subkey
        );

        transport
            .send(
                encode_trigger_frame(oem, key, subkey),
                &destination.host,
                destination.port,
            )
            .await
            .map_err(ArtNetError::Transmission)
    }

    fn report(&self, error: ArtNetError) {
        tracing::warn!("Art-Net refresh send failed: {}", error);
        if let Some(sink) = self.error_sink.lock().as_ref() {
            let _ = sink.send(error);
        }
    }

    pub fn host(&self) -> String {
        self.destination.read().host.clone()
    }

    pub fn port(&self) -> u16 {
        self.destination.read().port
    }

    pub fn set_host(&self, host: &str) -> Result<()> {
        self.ensure_open()?;
        self.destination.write().host = host.to_string();
        tracing::debug!("Art-Net destination host set to {}", host);
        Ok(())
    }

    /// Change the destination port; not allowed while broadcasting
    pub fn set_port(&self, port: u16) -> Result<()> {
        self.ensure_open()?;
        let mut destination = self.destination.write();
        if is_broadcast(&destination.host) {
            return Err(ArtNetError::Configuration(
                "can't change port when using broadcast address 255.255.255.255".to_string(),
            ));
        }
        destination.port = port;
        tracing::debug!("Art-Net destination port set to {}", port);
        Ok(())
    }

    /// The first `length` channels (rounded to even, 2-512) of a universe
    pub fn read_frame(&self, universe: u16, length: usize) -> Result<Vec<u8>> {
        let slot = self.slot(universe)?;
        let state = slot.lock();
        Ok(state.buffer.read_frame(length).to_vec())
    }

    /// Snapshot of all channels; zeros for a universe never referenced
    pub fn channels(&self, universe: u16) -> [u8; DMX_CHANNELS] {
        self.existing_slot(universe)
            .map(|slot| *slot.lock().buffer.channels())
            .unwrap_or([0u8; DMX_CHANNELS])
    }

    pub fn high_watermark(&self, universe: u16) -> u16 {
        self.existing_slot(universe)
            .map(|slot| slot.lock().buffer.high_watermark())
            .unwrap_or(0)
    }

    pub fn is_throttled(&self, universe: u16) -> bool {
        self.existing_slot(universe)
            .map(|slot| slot.lock().throttled)
            .unwrap_or(false)
    }

    /// Cancel every refresh task, drop universe state and release the
    /// transport. Idempotent.
    pub fn close(&self) {
        let universes = {
            let mut universes = self.universes.lock();
            if self.closed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *universes)
        };

        for slot in universes.values() {
            if let Some(refresh) = slot.lock().refresh.take() {
                refresh.abort();
            }
        }

        if let Some(transport) = self.transport.write().take() {
            transport.close();
        }
        self.error_sink.lock().take();

        tracing::debug!("Art-Net scheduler closed ({} universe(s))", universes.len());
    }
}

/// Body of a universe's refresh task
async fn refresh_at(scheduler: Weak<Scheduler>, universe: u16, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;

    let Some(scheduler) = scheduler.upgrade() else {
        return;
    };

    // begin_send replaces (and aborts) this task's handle, so the transport
    // future is driven from a separate task
    match scheduler.begin_send(universe, true) {
        Ok(sending) => {
            tokio::spawn(async move {
                if let Err(e) = sending.await {
                    scheduler.report(e);
                }
            });
        }
        Err(ArtNetError::Busy { .. }) => {
            // Still cooling down; try again a full period later
            tracing::trace!("Refresh for busy universe {} postponed", universe);
            if let Ok(slot) = scheduler.slot(universe) {
                let mut state = slot.lock();
                scheduler.arm_refresh(&mut state, universe);
            }
        }
        Err(ArtNetError::Closed) => {}
        Err(e) => scheduler.report(e),
    }
}
