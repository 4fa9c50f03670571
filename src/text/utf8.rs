//! Lenient UTF-8 decoding and extended encoding
//!
//! Sequences of 1-6 bytes are accepted so that game-scoped glyph values
//! (above U+10FFFF) can travel inside byte strings. Malformed units are
//! dropped rather than replaced; each dropped unit is logged at trace level.

use log::{trace, warn};

/// Largest value a 6-byte sequence can carry
pub const MAX_ENCODABLE: u32 = 0x7FFF_FFFF;

/// Replacement written for values that do not fit 6 bytes
const REPLACEMENT: u32 = 0xFFFD;

/// Decode `bytes` lazily, dropping malformed units
pub fn decode(bytes: &[u8]) -> Decoder<'_> {
    Decoder {
        bytes,
        pos: 0,
        dropped: 0,
    }
}

/// Iterator over the codepoints of a byte string
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    dropped: usize,
}

impl Decoder<'_> {
    /// Number of malformed units dropped so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn drop_unit(&mut self, start: usize, len: usize) {
        self.dropped += 1;
        trace!(
            "Dropped malformed UTF-8 unit {:02X?} at byte {}",
            &self.bytes[start..start + len],
            start
        );
    }
}

/// Sequence length and payload bits of a lead byte
fn lead_byte(b: u8) -> Option<(usize, u32)> {
    match b {
        0x00..=0x7F => Some((1, u32::from(b))),
        0xC0..=0xDF => Some((2, u32::from(b & 0x1F))),
        0xE0..=0xEF => Some((3, u32::from(b & 0x0F))),
        0xF0..=0xF7 => Some((4, u32::from(b & 0x07))),
        0xF8..=0xFB => Some((5, u32::from(b & 0x03))),
        0xFC..=0xFD => Some((6, u32::from(b & 0x01))),
        _ => None,
    }
}

impl Iterator for Decoder<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let Some((len, mut cp)) = lead_byte(self.bytes[start]) else {
                // Stray continuation byte or 0xFE/0xFF
                self.pos += 1;
                self.drop_unit(start, 1);
                continue;
            };

            let mut read = 1;
            while read < len {
                match self.bytes.get(start + read) {
                    Some(&b) if b & 0xC0 == 0x80 => cp = (cp << 6) | u32::from(b & 0x3F),
                    _ => break,
                }
                read += 1;
            }

            self.pos = start + read;
            if read < len {
                // Resume at the byte that broke the sequence
                self.drop_unit(start, read);
                continue;
            }
            return Some(cp);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len() - self.pos;
        (0, Some(remaining))
    }
}

/// Append the extended UTF-8 encoding of `cp` to `out`
///
/// Values above [`MAX_ENCODABLE`] are written as U+FFFD.
pub fn encode(cp: u32, out: &mut Vec<u8>) {
    let cp = if cp > MAX_ENCODABLE {
        warn!("Codepoint {:#x} does not fit a 6-byte sequence", cp);
        REPLACEMENT
    } else {
        cp
    };

    let (len, lead): (u32, u8) = match cp {
        0..=0x7F => {
            out.push(cp as u8);
            return;
        }
        0x80..=0x7FF => (2, 0xC0),
        0x800..=0xFFFF => (3, 0xE0),
        0x1_0000..=0x1F_FFFF => (4, 0xF0),
        0x20_0000..=0x3FF_FFFF => (5, 0xF8),
        _ => (6, 0xFC),
    };
    out.push(lead | (cp >> (6 * (len - 1))) as u8);
    for shift in (0..len - 1).rev() {
        out.push(0x80 | ((cp >> (6 * shift)) & 0x3F) as u8);
    }
}

/// Decode `bytes` into a vector
pub fn decode_all(bytes: &[u8]) -> Vec<u32> {
    decode(bytes).collect()
}
