//! Fixed-height slicing of a tall captured image onto A4 pages.
//!
//! All lengths are millimetres in the page coordinate system. The image is drawn at
//! `PAGE_WIDTH_MM` wide; page `i` shows it with its top shifted up by `i × SLICE_HEIGHT_MM`.
//! The slice height is 2 mm shorter than the physical page, so consecutive pages overlap
//! slightly rather than lose a row of pixels.

use serde::Serialize;

/// A4 portrait.
pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// Vertical distance between the draw offsets of consecutive pages.
pub const SLICE_HEIGHT_MM: f64 = 295.0;

pub const MM_TO_PT: f64 = 72.0 / 25.4;

/// Rounding noise from the pixel → millimetre conversion must not add a blank page.
const EPSILON_MM: f64 = 1e-6;

/// One output page: the image is drawn with its top `offset_mm` above the page top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSlice {
    pub index: usize,
    pub offset_mm: f64,
}

/// Height of the captured image once scaled to the page width.
pub fn image_height_mm(width_px: u32, height_px: u32) -> f64 {
    if width_px == 0 {
        return 0.0;
    }
    f64::from(height_px) * PAGE_WIDTH_MM / f64::from(width_px)
}

/// Number of pages needed for an image `image_height_mm` tall: `ceil(H / P)`, at least one.
pub fn page_count(image_height_mm: f64, page_height_mm: f64) -> usize {
    if !image_height_mm.is_finite() || image_height_mm <= 0.0 || page_height_mm <= 0.0 {
        return 1;
    }
    let pages = ((image_height_mm - EPSILON_MM) / page_height_mm).ceil();
    (pages as usize).max(1)
}

/// Page slices in order, offsets `0, P, 2P, …`.
pub fn paginate(image_height_mm: f64, page_height_mm: f64) -> Vec<PageSlice> {
    (0..page_count(image_height_mm, page_height_mm))
        .map(|index| PageSlice {
            index,
            offset_mm: index as f64 * page_height_mm,
        })
        .collect()
}
