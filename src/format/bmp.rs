//! Uncompressed 24-bit BMP layout.
//!
//! A file is a 14-byte file header, a geometry ("DIB") header of variable length, then pixel rows
//! stored bottom-up. Each row holds `width` BGR triples followed by 0..=3 pad bytes so the row
//! length is a multiple of four.

use std::io::Read;

use crate::foundation::core::CanvasDims;
use crate::foundation::error::{ChartaError, ChartaResult};

/// File type marker, `"BM"`.
pub const MAGIC: [u8; 2] = *b"BM";
/// Length of the fixed file header preceding the geometry header.
pub const FILE_HEADER_LEN: u64 = 14;
/// Length of the geometry header this crate writes (`BITMAPINFOHEADER`).
pub const INFO_HEADER_LEN: u32 = 40;
/// Total header length of every file written by this crate; pixel data starts here.
pub const HEADER_LEN: u64 = FILE_HEADER_LEN + INFO_HEADER_LEN as u64;
/// Smallest geometry header in the wild (`BITMAPCOREHEADER`).
pub const MIN_GEOMETRY_HEADER_LEN: u32 = 12;
/// Largest geometry header in the wild (`BITMAPV5HEADER`).
pub const MAX_GEOMETRY_HEADER_LEN: u32 = 124;
/// Bytes per pixel; the only supported depth is 24 bits.
pub const BYTES_PER_PIXEL: u32 = 3;
pub const BITS_PER_PIXEL: u16 = 24;
/// Value written into row pad bytes of freshly created canvases. Readers ignore pad bytes.
pub const PAD_FILLER: u8 = 0xFF;

const COMPRESSION_NONE: u32 = 0;
const PIXELS_PER_METER: u32 = 2834;
/// File header bytes plus the geometry header's own size field.
const LEAD_IN_LEN: usize = FILE_HEADER_LEN as usize + 4;

/// Pad bytes appended to each row so that `(width * 3 + padding) % 4 == 0`.
pub fn row_padding(width: u32) -> u32 {
    (4 - (width % 4) * BYTES_PER_PIXEL % 4) % 4
}

/// Length in bytes of one stored row, padding included.
pub fn row_stride(width: u32) -> u64 {
    u64::from(width) * u64::from(BYTES_PER_PIXEL) + u64::from(row_padding(width))
}

/// Length in bytes of the pixel payload: `width * height * 3 + height * padding(width)`.
pub fn pixel_data_len(dims: CanvasDims) -> u64 {
    row_stride(dims.width) * u64::from(dims.height)
}

/// Encode the file header and a `BITMAPINFOHEADER` for a bottom-up 24-bit image.
pub fn encode_header(dims: CanvasDims) -> [u8; HEADER_LEN as usize] {
    // CanvasDims bounds keep the payload below 4 GiB.
    let image_size = pixel_data_len(dims) as u32;

    let mut out = [0u8; HEADER_LEN as usize];
    let mut w = HeaderWriter {
        buf: &mut out,
        pos: 0,
    };
    w.bytes(&MAGIC);
    w.u32(HEADER_LEN as u32 + image_size);
    w.u32(0); // reserved
    w.u32(HEADER_LEN as u32);

    w.u32(INFO_HEADER_LEN);
    w.u32(dims.width);
    w.u32(dims.height);
    w.u16(1); // planes
    w.u16(BITS_PER_PIXEL);
    w.u32(COMPRESSION_NONE);
    w.u32(image_size);
    w.u32(PIXELS_PER_METER);
    w.u32(PIXELS_PER_METER);
    w.u32(0); // palette colors used
    w.u32(0); // important colors
    debug_assert_eq!(w.pos, HEADER_LEN as usize);
    out
}

/// Check the magic marker of `lead_in` and return the declared geometry header length.
///
/// `lead_in` must cover the file header plus the first four bytes of the geometry header, which
/// hold its size.
pub fn validate_header(lead_in: &[u8]) -> ChartaResult<u32> {
    if lead_in.len() < LEAD_IN_LEN {
        return Err(ChartaError::invalid_argument(format!(
            "bmp header needs at least {LEAD_IN_LEN} bytes, got {}",
            lead_in.len()
        )));
    }
    if lead_in[..2] != MAGIC {
        return Err(ChartaError::invalid_argument("not a bmp file (bad magic)"));
    }
    Ok(le_u32(lead_in, FILE_HEADER_LEN as usize))
}

/// Decoded geometry header fields relevant to 24-bit fragments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometryHeader {
    /// Declared length of the geometry header, including its size field.
    pub header_len: u32,
    pub width: i32,
    /// Positive for bottom-up images, negative for top-down ones.
    pub height: i32,
    pub bits_per_pixel: u16,
    pub compression: u32,
}

impl GeometryHeader {
    /// Parse a complete geometry header, starting at its size field.
    pub fn parse(bytes: &[u8]) -> ChartaResult<Self> {
        if bytes.len() < 4 {
            return Err(ChartaError::invalid_argument("truncated bmp geometry header"));
        }
        let header_len = le_u32(bytes, 0);
        if header_len == MIN_GEOMETRY_HEADER_LEN {
            if bytes.len() < MIN_GEOMETRY_HEADER_LEN as usize {
                return Err(ChartaError::invalid_argument("truncated bmp core header"));
            }
            return Ok(Self {
                header_len,
                width: i32::from(le_u16(bytes, 4)),
                height: i32::from(le_u16(bytes, 6)),
                bits_per_pixel: le_u16(bytes, 10),
                compression: COMPRESSION_NONE,
            });
        }
        if !(INFO_HEADER_LEN..=MAX_GEOMETRY_HEADER_LEN).contains(&header_len) {
            return Err(ChartaError::invalid_argument(format!(
                "unsupported bmp geometry header length {header_len}"
            )));
        }
        if bytes.len() < INFO_HEADER_LEN as usize {
            return Err(ChartaError::invalid_argument("truncated bmp info header"));
        }
        Ok(Self {
            header_len,
            width: le_u32(bytes, 4) as i32,
            height: le_u32(bytes, 8) as i32,
            bits_per_pixel: le_u16(bytes, 14),
            compression: le_u32(bytes, 16),
        })
    }

    /// Accept only bottom-up, uncompressed 24-bit images of exactly `expected` size.
    pub fn ensure_fragment(&self, expected: CanvasDims) -> ChartaResult<()> {
        if self.bits_per_pixel != BITS_PER_PIXEL || self.compression != COMPRESSION_NONE {
            return Err(ChartaError::invalid_argument(format!(
                "fragment must be uncompressed {BITS_PER_PIXEL}-bit, got {} bpp compression {}",
                self.bits_per_pixel, self.compression
            )));
        }
        if self.height < 0 {
            return Err(ChartaError::invalid_argument(
                "top-down fragments are not supported",
            ));
        }
        if i64::from(self.width) != i64::from(expected.width)
            || i64::from(self.height) != i64::from(expected.height)
        {
            return Err(ChartaError::invalid_argument(format!(
                "fragment header declares {}x{}, request says {}x{}",
                self.width, self.height, expected.width, expected.height
            )));
        }
        Ok(())
    }
}

/// Consume a fragment's headers from `reader`, leaving it positioned at the first pixel row.
///
/// Discards exactly `FILE_HEADER_LEN + header_len` bytes.
pub fn read_fragment_header<R: Read>(reader: &mut R) -> ChartaResult<GeometryHeader> {
    let mut lead_in = [0u8; LEAD_IN_LEN];
    read_header_bytes(reader, &mut lead_in)?;
    let header_len = validate_header(&lead_in)?;
    if !(MIN_GEOMETRY_HEADER_LEN..=MAX_GEOMETRY_HEADER_LEN).contains(&header_len) {
        return Err(ChartaError::invalid_argument(format!(
            "unsupported bmp geometry header length {header_len}"
        )));
    }

    let mut geometry = vec![0u8; header_len as usize];
    geometry[..4].copy_from_slice(&lead_in[FILE_HEADER_LEN as usize..]);
    read_header_bytes(reader, &mut geometry[4..])?;
    GeometryHeader::parse(&geometry)
}

/// Encode top-down, tightly packed RGB8 pixels as a standalone 24-bit BMP.
pub fn encode_rgb8(dims: CanvasDims, rgb: &[u8]) -> ChartaResult<Vec<u8>> {
    let row_len = dims.width as usize * BYTES_PER_PIXEL as usize;
    let expected = row_len * dims.height as usize;
    if rgb.len() != expected {
        return Err(ChartaError::invalid_argument(format!(
            "expected {expected} rgb bytes for {}x{}, got {}",
            dims.width,
            dims.height,
            rgb.len()
        )));
    }

    let padding = row_padding(dims.width) as usize;
    let mut out = Vec::with_capacity(HEADER_LEN as usize + pixel_data_len(dims) as usize);
    out.extend_from_slice(&encode_header(dims));
    for row in rgb.chunks_exact(row_len).rev() {
        for px in row.chunks_exact(3) {
            out.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        out.extend(std::iter::repeat_n(0u8, padding));
    }
    Ok(out)
}

fn read_header_bytes<R: Read>(reader: &mut R, buf: &mut [u8]) -> ChartaResult<()> {
    reader.read_exact(buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ChartaError::invalid_argument("fragment ends inside its bmp header")
        } else {
            ChartaError::io("read fragment header", err)
        }
    })
}

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

struct HeaderWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl HeaderWriter<'_> {
    fn bytes(&mut self, b: &[u8]) {
        self.buf[self.pos..self.pos + b.len()].copy_from_slice(b);
        self.pos += b.len();
    }

    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/bmp.rs"]
mod tests;
