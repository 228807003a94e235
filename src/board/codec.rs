//! Pure transforms between flat color-channel arrays and the base64 PNG
//! encoding the store and the wire use. The board is persisted in RGBA; some
//! legacy clients author and consume the alpha-first layout, so every
//! transform takes an explicit [`ChannelOrder`] instead of assuming one.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{AppError, Result};

/// Byte layout of the four color components within each pixel cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// R, G, B, A — the canonical stored layout.
    Rgba,
    /// A, B, G, R — the legacy client layout (RGBA reversed per cell).
    Abgr,
}

/// Converts an (x, y) coordinate to its cell index in a row-major flat array.
pub fn xy_to_index(x: u32, y: u32, length: u32) -> usize {
    (y * length + x) as usize
}

/// Inverse of [`xy_to_index`].
pub fn index_to_xy(index: usize, length: u32) -> (u32, u32) {
    let x = index as u32 % length;
    (x, (index as u32 - x) / length)
}

/// Encodes a flat `length² × 4` channel array into a base64 PNG string.
pub fn encode(pixels: &[u8], length: u32, order: ChannelOrder) -> Result<String> {
    let expected = (length * length * 4) as usize;
    if pixels.len() != expected {
        return Err(AppError::MalformedImage(format!(
            "expected {expected} channel bytes, got {}",
            pixels.len()
        )));
    }

    let rgba = match order {
        ChannelOrder::Rgba => pixels.to_vec(),
        ChannelOrder::Abgr => reversed_cells(pixels),
    };

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, length, length);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&rgba)?;
        writer.finish()?;
    }

    Ok(STANDARD.encode(&out))
}

/// Decodes a base64 PNG string into a flat channel array in the requested
/// order. Malformed input is an error, never a silent zero-fill.
pub fn decode(encoded: &str, order: ChannelOrder) -> Result<Vec<u8>> {
    let bytes = STANDARD.decode(encoded)?;
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
        return Err(AppError::MalformedImage(format!(
            "expected 8-bit RGBA, got {:?}/{:?}",
            info.color_type, info.bit_depth
        )));
    }
    buf.truncate(info.buffer_size());

    if order == ChannelOrder::Abgr {
        reverse_cells_in_place(&mut buf);
    }

    Ok(buf)
}

pub fn png_data_uri(base64: &str) -> String {
    format!("data:image/png;base64,{base64}")
}

// ABGR is RGBA with the four bytes of each cell reversed, so the same
// permutation converts in both directions.
fn reversed_cells(pixels: &[u8]) -> Vec<u8> {
    let mut out = pixels.to_vec();
    reverse_cells_in_place(&mut out);
    out
}

fn reverse_cells_in_place(pixels: &mut [u8]) {
    for cell in pixels.chunks_exact_mut(4) {
        cell.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::image::blank_board;

    #[test]
    fn round_trips_rgba() {
        let mut pixels = blank_board(4);
        pixels[0] = 212;
        pixels[1] = 54;
        pixels[2] = 30;

        let encoded = encode(&pixels, 4, ChannelOrder::Rgba).unwrap();
        let decoded = decode(&encoded, ChannelOrder::Rgba).unwrap();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn round_trips_alpha_first() {
        let mut pixels = blank_board(3);
        pixels[8] = 68;

        let encoded = encode(&pixels, 3, ChannelOrder::Abgr).unwrap();
        let decoded = decode(&encoded, ChannelOrder::Abgr).unwrap();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn channel_orders_agree_on_content() {
        let mut pixels = blank_board(2);
        pixels[0] = 10; // r
        pixels[3] = 200; // a

        let encoded = encode(&pixels, 2, ChannelOrder::Rgba).unwrap();
        let abgr = decode(&encoded, ChannelOrder::Abgr).unwrap();
        assert_eq!(abgr[0], 200); // a
        assert_eq!(abgr[3], 10); // r
    }

    #[test]
    fn rejects_wrong_array_size() {
        let err = encode(&[0u8; 12], 2, ChannelOrder::Rgba).unwrap_err();
        assert!(matches!(err, AppError::MalformedImage(_)));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(decode("not base64!!!", ChannelOrder::Rgba).is_err());
    }

    #[test]
    fn rejects_non_png_payload() {
        let encoded = STANDARD.encode(b"definitely not a png");
        assert!(decode(&encoded, ChannelOrder::Rgba).is_err());
    }

    #[test]
    fn maps_coordinates_to_indices() {
        assert_eq!(xy_to_index(0, 0, 10), 0);
        assert_eq!(xy_to_index(3, 2, 10), 23);
        assert_eq!(index_to_xy(23, 10), (3, 2));
        assert_eq!(index_to_xy(0, 10), (0, 0));
    }
}
