//! Per-universe DMX channel buffer with change tracking

use crate::{error::ArtNetError, Result};

/// Number of DMX512 channels in a universe
pub const DMX_CHANNELS: usize = 512;

/// Round a requested payload length up to even and clamp it to 2-512.
///
/// ArtDmx requires an even data length of at least two bytes.
pub fn frame_length(length: usize) -> usize {
    let even = length + (length & 1);
    even.clamp(2, DMX_CHANNELS)
}

/// Channel values of one universe plus the highest channel changed since the
/// last send was initiated
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    channels: [u8; DMX_CHANNELS],
    high_watermark: u16,
}

impl Default for ChannelBuffer {
    fn default() -> Self {
        Self {
            channels: [0u8; DMX_CHANNELS],
            high_watermark: 0,
        }
    }
}

impl ChannelBuffer {
    /// Create an all-zero buffer with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `values` starting at the 1-indexed `start_channel`.
    ///
    /// Only positions whose value actually differs are stored, and only those
    /// raise the watermark. Returns whether anything changed. Out-of-range
    /// writes are rejected before any channel is touched.
    pub fn set_channels(&mut self, start_channel: u16, values: &[u8]) -> Result<bool> {
        let start = start_channel as usize;
        if start == 0 || start - 1 + values.len() > DMX_CHANNELS {
            return Err(ArtNetError::InvalidChannel {
                start: start_channel,
                count: values.len(),
            });
        }

        let mut changed = false;
        for (offset, &value) in values.iter().enumerate() {
            let index = start - 1 + offset;
            if self.channels[index] != value {
                self.channels[index] = value;
                // 1-indexed position, bounded by DMX_CHANNELS above
                self.high_watermark = self.high_watermark.max((index + 1) as u16);
                changed = true;
            }
        }

        Ok(changed)
    }

    /// The first `frame_length(length)` channel values
    pub fn read_frame(&self, length: usize) -> &[u8] {
        &self.channels[..frame_length(length)]
    }

    /// Highest 1-indexed channel changed since the last send, 0 if none
    pub fn high_watermark(&self) -> u16 {
        self.high_watermark
    }

    /// Return the watermark and reset it to 0
    pub fn take_watermark(&mut self) -> u16 {
        std::mem::take(&mut self.high_watermark)
    }

    /// All 512 channel values
    pub fn channels(&self) -> &[u8; DMX_CHANNELS] {
        &self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_zeroed() {
        let buffer = ChannelBuffer::new();
        assert!(buffer.channels().iter().all(|&v| v == 0));
        assert_eq!(buffer.high_watermark(), 0);
    }

    #[test]
    fn test_single_channel_sets_watermark() {
        let mut buffer = ChannelBuffer::new();
        assert!(buffer.set_channels(1, &[255]).unwrap());
        assert_eq!(buffer.high_watermark(), 1);
        assert_eq!(buffer.read_frame(1), &[255, 0]);
    }

    #[test]
    fn test_unchanged_write_is_noop() {
        let mut buffer = ChannelBuffer::new();
        assert!(!buffer.set_channels(10, &[0, 0, 0]).unwrap());
        assert_eq!(buffer.high_watermark(), 0);

        buffer.set_channels(5, &[42]).unwrap();
        buffer.take_watermark();
        assert!(!buffer.set_channels(5, &[42]).unwrap());
        assert_eq!(buffer.high_watermark(), 0);
    }

    #[test]
    fn test_watermark_tracks_highest_changed_position() {
        let mut buffer = ChannelBuffer::new();
        buffer.set_channels(100, &[1]).unwrap();
        buffer.set_channels(3, &[1]).unwrap();
        assert_eq!(buffer.high_watermark(), 100);

        // Only the last position differs from what is stored
        buffer.set_channels(200, &[0, 0, 7]).unwrap();
        assert_eq!(buffer.high_watermark(), 202);
    }

    #[test]
    fn test_take_watermark_resets() {
        let mut buffer = ChannelBuffer::new();
        buffer.set_channels(512, &[9]).unwrap();
        assert_eq!(buffer.take_watermark(), 512);
        assert_eq!(buffer.high_watermark(), 0);
        assert_eq!(buffer.channels()[511], 9);
    }

    #[test]
    fn test_out_of_range_rejected_without_mutation() {
        let mut buffer = ChannelBuffer::new();
        assert!(buffer.set_channels(0, &[1]).is_err());
        assert!(buffer.set_channels(511, &[1, 2, 3]).is_err());
        assert!(buffer.channels().iter().all(|&v| v == 0));
        assert_eq!(buffer.high_watermark(), 0);

        assert!(buffer.set_channels(511, &[1, 2]).unwrap());
    }

    #[test]
    fn test_frame_length_rounding() {
        assert_eq!(frame_length(0), 2);
        assert_eq!(frame_length(1), 2);
        assert_eq!(frame_length(2), 2);
        assert_eq!(frame_length(3), 4);
        assert_eq!(frame_length(511), 512);
        assert_eq!(frame_length(512), 512);
        assert_eq!(frame_length(4096), 512);
    }
}
