// Edge Extractor - derives the conditioning signal from the input photo

use crate::domain::error::{DomainError, Result};
use image::{imageops, GrayImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// 3x3 find-edges kernel (discrete Laplacian: -1 ring, +8 centre).
const EDGE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Decode raw request bytes into an RGB image.
///
/// # Errors
/// DomainError::Decode for malformed or unsupported input. Surfaced to the
/// caller as a client error and never retried.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| DomainError::Decode(e.to_string()))?;
    Ok(decoded.to_rgb8())
}

/// Extract a single-channel edge map from an RGB image.
///
/// Grayscale conversion followed by a 3x3 edge convolution. Pure and
/// deterministic; output dimensions always equal the input's.
pub fn edge_map(image: &RgbImage) -> GrayImage {
    let gray = imageops::grayscale(image);
    imageops::filter3x3(&gray, &EDGE_KERNEL)
}

/// Encode an RGB image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| DomainError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8])
        })
    }

    #[test]
    fn edge_map_preserves_dimensions() {
        for (width, height) in [(1, 1), (3, 5), (64, 48), (100, 1)] {
            let input = gradient_image(width, height);
            let edges = edge_map(&input);
            assert_eq!(edges.dimensions(), (width, height));
        }
    }

    #[test]
    fn edge_map_is_single_channel() {
        use image::Pixel;
        let edges = edge_map(&gradient_image(16, 16));
        assert_eq!(image::Luma::<u8>::CHANNEL_COUNT, 1);
        assert_eq!(edges.as_raw().len(), 16 * 16);
    }

    #[test]
    fn flat_image_has_no_edges() {
        let input = RgbImage::from_pixel(32, 32, Rgb([120, 120, 120]));
        let edges = edge_map(&input);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn step_edge_is_detected() {
        // Black left half, white right half: the boundary must light up.
        let input = RgbImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let edges = edge_map(&input);
        assert!(edges.get_pixel(16, 16).0[0] > 0);
    }

    #[test]
    fn edge_map_is_deterministic() {
        let input = gradient_image(24, 24);
        assert_eq!(edge_map(&input).as_raw(), edge_map(&input).as_raw());
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = decode_rgb(b"not an image at all");
        assert!(matches!(result, Err(DomainError::Decode(_))));
    }

    #[test]
    fn encode_produces_decodable_png() {
        let input = gradient_image(20, 10);
        let png = encode_png(&input).unwrap();
        let decoded = decode_rgb(&png).unwrap();
        assert_eq!(decoded.dimensions(), (20, 10));
        assert_eq!(decoded.as_raw(), input.as_raw());
    }
}
