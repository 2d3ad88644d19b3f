//! Drawing the signature onto a page.
//!
//! [`Compositor`] is the seam between the signing pipeline and the PDF
//! writer. [`SealDocument`](crate::document::SealDocument) implements it over
//! lopdf; tests can substitute a recording implementation.

use lopdf::content::{Content, Operation};
use lopdf::{Object, ObjectId};

use crate::error::Result;
use crate::placement::{ImageMetrics, PageSize, PlacementBox};

use super::image_handler::ImageFormat;

/// An image registered with a document, ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Object holding the Image XObject
    pub id: ObjectId,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

impl EmbeddedImage {
    /// Pixel dimensions.
    pub fn metrics(&self) -> ImageMetrics {
        ImageMetrics::new(self.width, self.height)
    }
}

/// A document that can receive the signature image.
pub trait Compositor {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Size of page `page_index` (0-based) in points.
    fn page_size(&self, page_index: usize) -> Result<PageSize>;

    /// Register an encoded image with the document.
    fn embed_image(&mut self, bytes: &[u8], format: ImageFormat) -> Result<EmbeddedImage>;

    /// Draw `image` into `placement` with the given constant opacity.
    fn draw_image(
        &mut self,
        page_index: usize,
        image: &EmbeddedImage,
        placement: &PlacementBox,
        opacity: f64,
    ) -> Result<()>;

    /// Write the document out.
    fn serialize(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// The `cm` operands that map the unit square onto `placement`.
pub fn transform_matrix(placement: &PlacementBox) -> [f64; 6] {
    [
        placement.width,
        0.0,
        0.0,
        placement.height,
        placement.x,
        placement.y,
    ]
}

/// Content stream painting XObject `image_name` into `placement`.
///
/// `graphics_state` names an ExtGState to select first, if any.
pub fn image_draw_content(
    image_name: &str,
    graphics_state: Option<&str>,
    placement: &PlacementBox,
) -> Result<Vec<u8>> {
    let mut operations = vec![Operation::new("q", vec![])];
    if let Some(gs) = graphics_state {
        operations.push(Operation::new("gs", vec![Object::Name(gs.as_bytes().to_vec())]));
    }
    let matrix = transform_matrix(placement)
        .iter()
        .map(|v| Object::Real(*v as _))
        .collect();
    operations.push(Operation::new("cm", matrix));
    operations.push(Operation::new("Do", vec![Object::Name(image_name.as_bytes().to_vec())]));
    operations.push(Operation::new("Q", vec![]));

    Ok(Content { operations }.encode()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement() -> PlacementBox {
        PlacementBox {
            page_index: 0,
            x: 100.0,
            y: 200.0,
            width: 50.0,
            height: 25.0,
        }
    }

    #[test]
    fn test_transform_matrix() {
        assert_eq!(transform_matrix(&placement()), [50.0, 0.0, 0.0, 25.0, 100.0, 200.0]);
    }

    #[test]
    fn test_image_draw_content_operators() {
        let bytes = image_draw_content("Im1", None, &placement()).unwrap();
        let content = Content::decode(&bytes).unwrap();
        let ops: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(ops, vec!["q", "cm", "Do", "Q"]);
        assert_eq!(content.operations[2].operands[0].as_name().unwrap(), b"Im1");
    }

    #[test]
    fn test_image_draw_content_with_graphics_state() {
        let bytes = image_draw_content("Im2", Some("GS1"), &placement()).unwrap();
        let content = Content::decode(&bytes).unwrap();
        assert_eq!(content.operations[1].operator, "gs");
        assert_eq!(content.operations[1].operands[0].as_name().unwrap(), b"GS1");
    }
}
