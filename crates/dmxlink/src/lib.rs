//! dmxlink - ArtNet DMX512 client
//!
//! Keeps the channel values of any number of DMX universes and sends them to
//! ArtNet nodes over UDP:
//! - **On change**: a `set` that changes at least one value sends the
//!   universe, trimmed to the highest changed channel
//! - **Throttled**: at most one frame per universe per throttle interval
//!   (25 ms by default); a second update inside the window returns
//!   [`ArtNetError::Busy`] and rides along with the next frame
//! - **Keep-alive**: a universe that stays quiet for the refresh period
//!   (4 s by default) is resent in full
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dmxlink::{ArtNetClient, ArtNetConfig};
//!
//! # async fn run() -> dmxlink::Result<()> {
//! let client = ArtNetClient::connect(ArtNetConfig::default()).await?;
//!
//! // Channel 1 of universe 0 to full
//! client.set_channel(0, 1, 255).await?;
//!
//! // Channels 2-4 of universe 1
//! client.set(1, 2, &[10, 20, 30]).await?;
//!
//! client.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - public client
//! - [`dmx`] - channel buffers, frame encoding, send scheduling
//! - [`transport`] - datagram transport seam and UDP implementation
//! - [`config`] - configuration
//! - [`error`] - error types

/// Public client
pub mod client;
/// Configuration
pub mod config;
/// DMX buffers, Art-Net frames and scheduling
pub mod dmx;
/// Error types
pub mod error;
/// Datagram transport
pub mod transport;

// Re-exports
pub use client::ArtNetClient;
pub use config::{ArtNetConfig, BROADCAST_HOST};
pub use dmx::artnet::DEFAULT_PORT;
pub use error::{ArtNetError, Result};
pub use transport::{Transport, UdpTransport};
