//! Region capture — the only suspension point of an export.
//!
//! The browser rasterises `#resume-container` and uploads the result; `UploadedCapture`
//! decodes that upload into RGB pixels. Anything else that can produce pixels
//! (a headless renderer, a test fixture) plugs in through `RegionCapture`.

use async_trait::async_trait;
use bytes::Bytes;
use image::ImageFormat;
use tracing::debug;

use super::ExportError;

/// Decoded 8-bit RGB raster, row-major, no padding.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, ExportError> {
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyCapture);
        }
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(ExportError::Capture(format!(
                "raster has {} bytes, expected {expected} for {width}x{height}",
                rgb.len()
            )));
        }
        Ok(Self { width, height, rgb })
    }

    /// Solid-colour raster, used as a stand-in capture.
    #[allow(dead_code)]
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Result<Self, ExportError> {
        let rgb = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self::new(width, height, rgb)
    }
}

/// Produces a raster image of the rendered resume region.
#[async_trait]
pub trait RegionCapture: Send + Sync {
    async fn capture(&self) -> Result<RasterImage, ExportError>;
}

/// A PNG or JPEG captured client-side and uploaded as the export request body.
pub struct UploadedCapture {
    bytes: Bytes,
}

impl UploadedCapture {
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

#[async_trait]
impl RegionCapture for UploadedCapture {
    async fn capture(&self) -> Result<RasterImage, ExportError> {
        if self.bytes.is_empty() {
            return Err(ExportError::EmptyCapture);
        }

        let bytes = self.bytes.clone();
        // Decoding is CPU-bound.
        tokio::task::spawn_blocking(move || decode(&bytes))
            .await
            .map_err(|e| ExportError::Capture(format!("decode task failed: {e}")))?
    }
}

fn decode(bytes: &[u8]) -> Result<RasterImage, ExportError> {
    let format = image::guess_format(bytes)
        .map_err(|e| ExportError::Capture(format!("unrecognised image data: {e}")))?;
    if !matches!(format, ImageFormat::Png | ImageFormat::Jpeg) {
        return Err(ExportError::Capture(format!(
            "unsupported capture format {format:?}, expected PNG or JPEG"
        )));
    }

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ExportError::Capture(e.to_string()))?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    debug!(width, height, ?format, "Decoded uploaded capture");

    RasterImage::new(width, height, decoded.into_raw())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageBuffer, Rgb};

    use super::*;

    fn make_png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_uploaded_png_decodes_to_rgb() {
        let capture = UploadedCapture::new(Bytes::from(make_png(4, 3)));
        let raster = capture.capture().await.unwrap();
        assert_eq!((raster.width, raster.height), (4, 3));
        assert_eq!(raster.rgb.len(), 4 * 3 * 3);
        assert_eq!(&raster.rgb[..3], &[0, 0, 128]);
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let err = UploadedCapture::new(Bytes::new()).capture().await.unwrap_err();
        assert!(matches!(err, ExportError::EmptyCapture));
    }

    #[tokio::test]
    async fn test_garbage_upload_is_capture_error() {
        let err = UploadedCapture::new(Bytes::from_static(b"definitely not an image"))
            .capture()
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Capture(_)));
    }

    #[test]
    fn test_raster_validates_dimensions() {
        assert!(matches!(
            RasterImage::new(0, 10, Vec::new()),
            Err(ExportError::EmptyCapture)
        ));
        assert!(matches!(
            RasterImage::new(2, 2, vec![0; 5]),
            Err(ExportError::Capture(_))
        ));
        let filled = RasterImage::filled(2, 2, [1, 2, 3]).unwrap();
        assert_eq!(filled.rgb, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }
}
