// Export Pipeline: captured raster → paginated A4 PDF held in memory.
// CPU-bound work (decode, PDF assembly) runs inside tokio::task::spawn_blocking.
// A failure at any step returns an ExportError and no artifact; nothing is retried.

pub mod capture;
pub mod filename;
pub mod pagination;
pub mod pdf;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

pub use capture::{RasterImage, RegionCapture, UploadedCapture};
pub use filename::artifact_filename;
pub use pagination::{paginate, SLICE_HEIGHT_MM};

use pagination::image_height_mm;
use pdf::PdfWriter;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("capture failed: {0}")]
    Capture(String),

    #[error("captured region is empty")]
    EmptyCapture,

    #[error("drawing the PDF failed: {0}")]
    Draw(String),
}

/// A finished export, never persisted by this crate.
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportPipeline {
    slice_height_mm: f64,
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self {
            slice_height_mm: SLICE_HEIGHT_MM,
        }
    }
}

impl ExportPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the region, slices it onto A4 pages and names the result after `title`.
    pub async fn run(
        &self,
        capture: &dyn RegionCapture,
        title: &str,
    ) -> Result<ExportArtifact, ExportError> {
        let filename = artifact_filename(title);

        let image = capture.capture().await.map_err(|e| {
            error!("Export capture failed for '{filename}': {e}");
            e
        })?;

        let slices = paginate(
            image_height_mm(image.width, image.height),
            self.slice_height_mm,
        );
        let page_count = slices.len();

        let bytes = tokio::task::spawn_blocking(move || {
            let mut writer = PdfWriter::new(&image);
            for slice in &slices {
                writer.add_page(slice)?;
            }
            writer.finish()
        })
        .await
        .map_err(|e| ExportError::Draw(format!("PDF task failed: {e}")))?
        .map_err(|e| {
            error!("Export drawing failed for '{filename}': {e}");
            e
        })?;

        info!(
            "Exported '{}' ({} page(s), {} bytes)",
            filename,
            page_count,
            bytes.len()
        );

        Ok(ExportArtifact {
            filename,
            bytes,
            page_count,
        })
    }
}
