//! Art-Net frame encoding (ArtDmx and ArtTrigger)
//!
//! Both encoders are pure: they build a complete UDP payload from their
//! arguments and never look at scheduler state.

use super::channels::DMX_CHANNELS;

/// Packet ID: "Art-Net" followed by NUL
pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

/// OpDmx, transmitted low byte first
pub const OP_DMX: u16 = 0x5000;

/// OpTrigger, transmitted low byte first
pub const OP_TRIGGER: u16 = 0x9900;

/// Art-Net protocol revision, transmitted high byte first
pub const PROTOCOL_VERSION: u16 = 14;

/// Bytes preceding the payload in every frame
pub const HEADER_LEN: usize = 18;

/// ArtTrigger frames always carry a full 512-byte data block
pub const TRIGGER_FRAME_LEN: usize = HEADER_LEN + DMX_CHANNELS;

/// Standard Art-Net UDP port
pub const DEFAULT_PORT: u16 = 6454;

fn write_header(packet: &mut [u8], opcode: u16) {
    packet[0..8].copy_from_slice(ARTNET_ID);
    packet[8..10].copy_from_slice(&opcode.to_le_bytes());
    packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
}

/// Build an ArtDmx frame for `universe` carrying `data`.
///
/// `data` is expected to be an even length between 2 and 512, as produced by
/// [`ChannelBuffer::read_frame`](super::ChannelBuffer::read_frame).
pub fn encode_dmx_frame(universe: u16, data: &[u8]) -> Vec<u8> {
    debug_assert!(data.len() >= 2 && data.len() <= DMX_CHANNELS && data.len() % 2 == 0);

    let mut packet = vec![0u8; HEADER_LEN + data.len()];
    write_header(&mut packet, OP_DMX);

    // Sequence and Physical stay 0: sequencing is disabled

    // SubUni, then Net
    packet[14] = (universe & 0xFF) as u8;
    packet[15] = ((universe >> 8) & 0xFF) as u8;

    // Length (big-endian)
    packet[16..18].copy_from_slice(&(data.len() as u16).to_be_bytes());

    packet[HEADER_LEN..].copy_from_slice(data);

    packet
}

/// Build an ArtTrigger frame.
///
/// The 512-byte manufacturer data block is left zeroed.
pub fn encode_trigger_frame(oem: u16, key: u8, subkey: u8) -> Vec<u8> {
    let mut packet = vec![0u8; TRIGGER_FRAME_LEN];
    write_header(&mut packet, OP_TRIGGER);

    // Bytes 12-13 are filler
    packet[14..16].copy_from_slice(&oem.to_be_bytes());
    packet[16] = key;
    packet[17] = subkey;

    packet
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dmx_frame_structure() {
        let packet = encode_dmx_frame(0, &[255, 0]);

        assert_eq!(&packet[0..8], b"Art-Net\0");

        // OpCode (little-endian)
        assert_eq!(packet[8], 0x00);
        assert_eq!(packet[9], 0x50);

        // Protocol version (big-endian)
        assert_eq!(packet[10], 0);
        assert_eq!(packet[11], 14);

        assert_eq!(packet[12], 0);
        assert_eq!(packet[13], 0);

        // Length (big-endian)
        assert_eq!(packet[16], 0x00);
        assert_eq!(packet[17], 0x02);

        assert_eq!(&packet[18..], &[255, 0]);
        assert_eq!(packet.len(), 20);
    }

    #[test]
    fn test_dmx_frame_port_address() {
        let packet = encode_dmx_frame(0x1234, &[0; 2]);
        assert_eq!(packet[14], 0x34);
        assert_eq!(packet[15], 0x12);

        let packet = encode_dmx_frame(32767, &[0; 2]);
        assert_eq!(packet[14], 0xFF);
        assert_eq!(packet[15], 0x7F);
    }

    #[test]
    fn test_full_dmx_frame() {
        let data = [7u8; 512];
        let packet = encode_dmx_frame(1, &data);
        assert_eq!(packet.len(), 18 + 512);
        assert_eq!(packet[16], 0x02);
        assert_eq!(packet[17], 0x00);
        assert!(packet[18..].iter().all(|&v| v == 7));
    }

    #[test]
    fn test_trigger_frame_structure() {
        let packet = encode_trigger_frame(0xFFFF, 2, 9);

        assert_eq!(packet.len(), 530);
        assert_eq!(&packet[0..8], b"Art-Net\0");
        assert_eq!(packet[8], 0x00);
        assert_eq!(packet[9], 0x99);
        assert_eq!(packet[10], 0);
        assert_eq!(packet[11], 14);
        assert_eq!(packet[14], 0xFF);
        assert_eq!(packet[15], 0xFF);
        assert_eq!(packet[16], 2);
        assert_eq!(packet[17], 9);
        assert!(packet[18..].iter().all(|&v| v == 0));
    }

    proptest! {
        #[test]
        fn dmx_length_field_matches_payload(universe in 0u16..=32767, half in 1usize..=256) {
            let data = vec![0xAB; half * 2];
            let packet = encode_dmx_frame(universe, &data);
            let length = u16::from_be_bytes([packet[16], packet[17]]) as usize;
            prop_assert_eq!(length, data.len());
            prop_assert_eq!(packet.len(), HEADER_LEN + length);
        }

        #[test]
        fn trigger_frame_is_constant_size(oem: u16, key: u8, subkey: u8) {
            prop_assert_eq!(encode_trigger_frame(oem, key, subkey).len(), TRIGGER_FRAME_LEN);
        }
    }
}
