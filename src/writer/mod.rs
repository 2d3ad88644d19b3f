//! PDF writing: embedding and drawing the signature image.
//!
//! ## Architecture
//!
//! ```text
//! signature bytes
//!     ↓
//! [ImageData] (JPEG pass-through, PNG → Flate + SMask)
//!     ↓
//! [Compositor::embed_image] (Image XObject in the document)
//!     ↓
//! [Compositor::draw_image] (q … cm /ImN Do Q appended to the page)
//!     ↓
//! PDF bytes
//! ```

mod compositor;
mod image_handler;

pub use compositor::{image_draw_content, transform_matrix, Compositor, EmbeddedImage};
pub use image_handler::{ColorSpace, ImageData, ImageError, ImageFormat};
