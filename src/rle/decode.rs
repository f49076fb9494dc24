use alloc::vec::Vec;
use enough::Stop;

use crate::cursor::Cursor;
use crate::error::TgaError;

/// Expand packets from `c` until exactly `expected` bytes are produced.
///
/// Leaves the cursor just past the last consumed packet.
pub(crate) fn decode_from(
    c: &mut Cursor<'_>,
    expected: usize,
    bpp: usize,
    stop: &dyn Stop,
) -> Result<Vec<u8>, TgaError> {
    // a packet expands at most 128-fold
    let input = (c.len() - c.position()).saturating_mul(super::MAX_PACKET_PIXELS);
    let mut out = Vec::with_capacity(expected.min(input));
    let mut packets = 0usize;
    while out.len() < expected {
        if packets % 1024 == 0 {
            stop.check()?;
        }
        packets += 1;

        let header = c.read_u8()?;
        let count = usize::from(header & 0x7F) + 1;
        let len = count * bpp;
        let remaining = expected - out.len();
        if len > remaining {
            return Err(TgaError::length("rle packet", remaining, len));
        }
        if header & 0x80 != 0 {
            let px = c.read_bytes(bpp)?;
            for _ in 0..count {
                out.extend_from_slice(px);
            }
        } else {
            out.extend_from_slice(c.read_bytes(len)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::{decode_rle, encode_rle};
    use super::*;
    use alloc::vec;

    #[test]
    fn run_and_raw() {
        let out = decode_rle(&[0x81, 1, 2, 3, 0x00, 4, 5, 6], 3, 1, 3).unwrap();
        assert_eq!(out, [1, 2, 3, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn packets_may_straddle_scanlines() {
        // one run covering two rows of two pixels
        let out = decode_rle(&[0x83, 9], 2, 2, 1).unwrap();
        assert_eq!(out, [9, 9, 9, 9]);
    }

    #[test]
    fn exhausted_input_is_truncated() {
        assert!(matches!(
            decode_rle(&[0x01, 1, 2, 3], 2, 1, 3),
            Err(TgaError::TruncatedStream)
        ));
        assert!(matches!(
            decode_rle(&[], 1, 1, 1),
            Err(TgaError::TruncatedStream)
        ));
    }

    #[test]
    fn overrunning_packet_is_rejected() {
        assert!(matches!(
            decode_rle(&[0x83, 9], 3, 1, 1),
            Err(TgaError::MalformedLength {
                expected: 3,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn trailing_bytes_are_left_alone() {
        let mut c = Cursor::new(&[0x81, 7, 0xAA, 0xBB]);
        let out = decode_from(&mut c, 2, 1, &enough::Unstoppable).unwrap();
        assert_eq!(out, [7, 7]);
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn encode_then_decode_mixed_rows() {
        let mut px = vec![0u8; 4 * 40 * 3];
        for (i, chunk) in px.chunks_exact_mut(4).enumerate() {
            let v = if (i / 7) % 2 == 0 { 0x11 } else { i as u8 };
            chunk.copy_from_slice(&[v, v, 0, 255]);
        }
        let enc = encode_rle(&px, 40, 3, 4).unwrap();
        assert_eq!(decode_rle(&enc, 40, 3, 4).unwrap(), px);
    }
}
