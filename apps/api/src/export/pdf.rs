//! A4 PDF assembly with `lopdf`.
//!
//! The captured raster is embedded once as an image XObject and referenced by every page.
//! Each page places it at full page width with its top `offset_mm` above the page top, so the
//! visible window walks down the image one slice per page.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::capture::RasterImage;
use super::pagination::{image_height_mm, PageSlice, MM_TO_PT, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::ExportError;

const IMAGE_NAME: &str = "Im0";

pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    image_id: ObjectId,
    image_height_mm: f64,
    kids: Vec<Object>,
}

impl PdfWriter {
    pub fn new(image: &RasterImage) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            image.rgb.clone(),
        );
        // An uncompressed stream is still valid output.
        let _ = stream.compress();
        let image_id = doc.add_object(stream);

        Self {
            doc,
            pages_id,
            image_id,
            image_height_mm: image_height_mm(image.width, image.height),
            kids: Vec::new(),
        }
    }

    /// Adds one page showing `slice` of the image.
    pub fn add_page(&mut self, slice: &PageSlice) -> Result<(), ExportError> {
        let width_pt = PAGE_WIDTH_MM * MM_TO_PT;
        let height_pt = self.image_height_mm * MM_TO_PT;
        // PDF space grows upwards from the bottom-left corner.
        let bottom_pt = (PAGE_HEIGHT_MM + slice.offset_mm - self.image_height_mm) * MM_TO_PT;

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        real(width_pt),
                        Object::Integer(0),
                        Object::Integer(0),
                        real(height_pt),
                        Object::Integer(0),
                        real(bottom_pt),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Draw(format!("page {}: {e}", slice.index)))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => self.image_id,
                },
            },
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    /// Serialises the document. Nothing is written anywhere but the returned buffer.
    pub fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        if self.kids.is_empty() {
            return Err(ExportError::Draw("document has no pages".to_string()));
        }

        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(PAGE_WIDTH_MM * MM_TO_PT),
                real(PAGE_HEIGHT_MM * MM_TO_PT),
            ],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| ExportError::Draw(format!("serialising PDF: {e}")))?;
        Ok(bytes)
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::pagination::{paginate, SLICE_HEIGHT_MM};

    fn write(image: &RasterImage) -> Vec<u8> {
        let mut writer = PdfWriter::new(image);
        for slice in paginate(image_height_mm(image.width, image.height), SLICE_HEIGHT_MM) {
            writer.add_page(&slice).unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn test_single_page_pdf_reparses() {
        let image = RasterImage::filled(210, 200, [255, 255, 255]).unwrap();
        let bytes = write(&image);
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_tall_image_spans_pages_sharing_one_image() {
        // 210 px wide → 1 px per mm; 600 px → 600 mm → 3 pages.
        let image = RasterImage::filled(210, 600, [10, 20, 30]).unwrap();
        let bytes = write(&image);
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);

        let images = doc
            .objects
            .values()
            .filter(|o| {
                o.as_stream()
                    .ok()
                    .and_then(|s| s.dict.get(b"Subtype").ok())
                    .and_then(|v| v.as_name().ok())
                    == Some(b"Image".as_slice())
            })
            .count();
        assert_eq!(images, 1);
    }

    /// `cm` operands of every page, in page order.
    fn placements(bytes: &[u8]) -> Vec<Vec<f64>> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|page_id| {
                let data = doc.get_page_content(*page_id).unwrap();
                let content = Content::<Vec<Operation>>::decode(&data).unwrap();
                let cm = content
                    .operations
                    .iter()
                    .find(|op| op.operator == "cm")
                    .unwrap();
                cm.operands
                    .iter()
                    .map(|o| f64::from(o.as_float().unwrap()))
                    .collect()
            })
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 0.01, "{actual} != {expected}");
    }

    #[test]
    fn test_each_page_shows_the_next_slice() {
        // (width px, height px) → image height 600 mm and 590 mm.
        for (width, height) in [(210, 600), (420, 1180)] {
            let image = RasterImage::filled(width, height, [255, 255, 255]).unwrap();
            let image_mm = image_height_mm(width, height);
            let pages = placements(&write(&image));
            assert_eq!(pages.len(), paginate(image_mm, SLICE_HEIGHT_MM).len());

            for (i, cm) in pages.iter().enumerate() {
                assert_close(cm[0], PAGE_WIDTH_MM * MM_TO_PT);
                assert_close(cm[1], 0.0);
                assert_close(cm[2], 0.0);
                assert_close(cm[3], image_mm * MM_TO_PT);
                assert_close(cm[4], 0.0);
                let expected_bottom = PAGE_HEIGHT_MM + i as f64 * SLICE_HEIGHT_MM - image_mm;
                assert_close(cm[5], expected_bottom * MM_TO_PT);
            }

            // The last page's window reaches the bottom of the image.
            let last = pages.last().unwrap();
            assert!(last[5] >= 0.0, "image bottom cropped: {}", last[5]);
        }
    }

    #[test]
    fn test_empty_writer_refuses_to_finish() {
        let image = RasterImage::filled(1, 1, [0, 0, 0]).unwrap();
        let err = PdfWriter::new(&image).finish().unwrap_err();
        assert!(matches!(err, ExportError::Draw(_)));
    }
}
