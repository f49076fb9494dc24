use alloc::vec::Vec;
use enough::Stop;

use super::MAX_PACKET_PIXELS;
use crate::error::TgaError;

/// One packet: its header byte and the pixel bytes that follow it.
struct Packet<'a> {
    header: u8,
    data: &'a [u8],
}

/// Splits one scanline into packets.
struct Packets<'a> {
    row: &'a [u8],
    bpp: usize,
    pos: usize,
}

impl<'a> Packets<'a> {
    fn new(row: &'a [u8], bpp: usize) -> Self {
        Self { row, bpp, pos: 0 }
    }

    fn pixel(&self, i: usize) -> &'a [u8] {
        &self.row[i * self.bpp..(i + 1) * self.bpp]
    }

    fn same(&self, a: usize, b: usize) -> bool {
        self.pixel(a) == self.pixel(b)
    }
}

impl<'a> Iterator for Packets<'a> {
    type Item = Packet<'a>;

    fn next(&mut self) -> Option<Packet<'a>> {
        let n = self.row.len() / self.bpp;
        let p = self.pos;
        if p >= n {
            return None;
        }

        let packet = if p + 1 < n && self.same(p, p + 1) {
            let mut count = 2;
            while count < MAX_PACKET_PIXELS && p + count < n && self.same(p, p + count) {
                count += 1;
            }
            self.pos += count;
            Packet {
                header: 0x80 | (count - 1) as u8,
                data: self.pixel(p),
            }
        } else {
            // A pixel equal to its right neighbour starts the next run.
            let mut count = 1;
            while count < MAX_PACKET_PIXELS
                && p + count < n
                && !(p + count + 1 < n && self.same(p + count, p + count + 1))
            {
                count += 1;
            }
            self.pos += count;
            Packet {
                header: (count - 1) as u8,
                data: &self.row[p * self.bpp..(p + count) * self.bpp],
            }
        };
        Some(packet)
    }
}

/// Append the packet stream for `pixels` to `out`, one scanline at a time.
///
/// The caller has validated `pixels` against the geometry.
pub(crate) fn encode_into(
    pixels: &[u8],
    width: usize,
    bpp: usize,
    out: &mut Vec<u8>,
    stop: &dyn Stop,
) -> Result<(), TgaError> {
    let row_bytes = width * bpp;
    if row_bytes == 0 {
        return Ok(());
    }
    for (y, row) in pixels.chunks_exact(row_bytes).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        for packet in Packets::new(row, bpp) {
            out.push(packet.header);
            out.extend_from_slice(packet.data);
        }
    }
    Ok(())
}

/// Byte length `encode_into` would produce, without allocating.
pub(crate) fn encoded_len(pixels: &[u8], width: usize, bpp: usize) -> usize {
    let row_bytes = width * bpp;
    if row_bytes == 0 {
        return 0;
    }
    pixels
        .chunks_exact(row_bytes)
        .flat_map(|row| Packets::new(row, bpp))
        .map(|p| 1 + p.data.len())
        .sum()
}
