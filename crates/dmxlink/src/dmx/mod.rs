//! DMX output over Art-Net
//!
//! - [`channels`]: per-universe channel values with change tracking
//! - [`artnet`]: ArtDmx / ArtTrigger frame encoding
//! - [`scheduler`]: throttled, change-driven sending with keep-alive refresh
//!
//! ## Art-Net
//!
//! - UDP, broadcast by default (255.255.255.255:6454)
//! - 32768 universes (15-bit Port-Address: Net + SubUni)
//! - ArtDmx frames carry only the changed prefix of a universe (2-512
//!   channels, even length); refresh frames always carry all 512
//!
//! ## Example Usage
//!
//! ```rust
//! use dmxlink::dmx::{encode_dmx_frame, ChannelBuffer};
//!
//! let mut buffer = ChannelBuffer::new();
//! buffer.set_channels(1, &[255]).unwrap();
//!
//! let length = buffer.take_watermark() as usize;
//! let frame = encode_dmx_frame(0, buffer.read_frame(length));
//! assert_eq!(&frame[18..], &[255, 0]);
//! ```

pub mod artnet;
pub mod channels;
pub mod scheduler;

pub use artnet::{encode_dmx_frame, encode_trigger_frame};
pub use channels::{frame_length, ChannelBuffer, DMX_CHANNELS};
pub use scheduler::{Scheduler, MAX_UNIVERSE};
