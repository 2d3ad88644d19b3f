//! PDF document model.
//!
//! [`SealDocument`] wraps a loaded lopdf [`Document`] and serves both sides of
//! signing: it reads positioned text for anchor resolution
//! ([`TextRunSource`]) and receives the signature image ([`Compositor`]).

use std::cell::RefCell;
use std::collections::HashMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::extractors::extract_page_runs;
use crate::object;
use crate::placement::{PageSize, PlacementBox};
use crate::text::{TextRun, TextRunSource};
use crate::writer::{image_draw_content, Compositor, EmbeddedImage, ImageData, ImageFormat};

/// Page size used when no `/MediaBox` can be found (US Letter).
pub const DEFAULT_PAGE_SIZE: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

/// A PDF document opened for signing.
#[derive(Debug)]
pub struct SealDocument {
    doc: Document,
    /// Page objects in page order
    page_ids: Vec<ObjectId>,
    /// Extracted runs per page
    run_cache: RefCell<HashMap<usize, Vec<TextRun>>>,
}

impl SealDocument {
    /// Parse a PDF from memory.
    ///
    /// The bytes must start at the `%PDF-` header; see
    /// [`normalize_pdf`](crate::sniff::normalize_pdf).
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(Error::InvalidPdf("encrypted documents are not supported".to_string()));
        }
        Ok(Self::from_document(doc))
    }

    /// Wrap an already-loaded document.
    pub fn from_document(doc: Document) -> Self {
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        log::info!("Loaded PDF {} with {} pages", doc.version, page_ids.len());
        Self {
            doc,
            page_ids,
            run_cache: RefCell::new(HashMap::new()),
        }
    }

    /// The underlying lopdf document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Object id of page `page_index` (0-based).
    pub fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(page_index)
            .copied()
            .ok_or(Error::PageOutOfRange {
                index: page_index,
                count: self.page_ids.len(),
            })
    }

    /// Plain text of a page, runs joined by spaces.
    pub fn page_text(&self, page_index: usize) -> Result<String> {
        Ok(crate::text::join_text(&self.page_runs(page_index)?))
    }

    fn page_dict(&self, page_index: usize) -> Result<&Dictionary> {
        Ok(self.doc.get_object(self.page_id(page_index)?)?.as_dict()?)
    }

    /// Effective page resources as an owned dictionary.
    fn resolved_resources(&self, page_index: usize) -> Result<Dictionary> {
        let page = self.page_dict(page_index)?;
        Ok(object::inherited(&self.doc, page, b"Resources")
            .and_then(|obj| obj.as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new))
    }

    /// Owned copy of the `category` sub-dictionary of `resources`.
    fn resource_category(&self, resources: &Dictionary, category: &[u8]) -> Dictionary {
        object::get_dict(&self.doc, resources, category)
            .cloned()
            .unwrap_or_else(Dictionary::new)
    }

    /// Existing content stream references of a page.
    fn content_refs(&self, page: &Dictionary) -> Vec<Object> {
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                Ok(_) => vec![Object::Reference(*id)],
                Err(_) => Vec::new(),
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }
}

/// First `<prefix><n>` not yet used in `dict`.
fn fresh_name(dict: &Dictionary, prefix: &str) -> String {
    (1..)
        .map(|n| format!("{}{}", prefix, n))
        .find(|name| !dict.has(name.as_bytes()))
        .unwrap_or_else(|| prefix.to_string())
}

impl TextRunSource for SealDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_runs(&self, page_index: usize) -> Result<Vec<TextRun>> {
        if let Some(runs) = self.run_cache.borrow().get(&page_index) {
            return Ok(runs.clone());
        }
        let runs = extract_page_runs(&self.doc, self.page_id(page_index)?, page_index)?;
        self.run_cache.borrow_mut().insert(page_index, runs.clone());
        Ok(runs)
    }
}

impl Compositor for SealDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_size(&self, page_index: usize) -> Result<PageSize> {
        let page = self.page_dict(page_index)?;
        let media_box = object::inherited(&self.doc, page, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| {
                let values: Vec<f64> = arr
                    .iter()
                    .filter_map(|v| object::resolve(&self.doc, v).and_then(object::number))
                    .collect();
                match values.as_slice() {
                    [x0, y0, x1, y1] => Some(PageSize::new((x1 - x0).abs(), (y1 - y0).abs())),
                    _ => None,
                }
            });

        Ok(media_box.unwrap_or_else(|| {
            log::warn!("Page {} has no usable MediaBox, assuming US Letter", page_index);
            DEFAULT_PAGE_SIZE
        }))
    }

    fn embed_image(&mut self, bytes: &[u8], format: ImageFormat) -> Result<EmbeddedImage> {
        let image = ImageData::from_bytes(bytes, format)?;
        let mask_id = image.build_soft_mask().map(|mask| self.doc.add_object(mask));
        let id = self.doc.add_object(image.build_xobject(mask_id));
        log::debug!(
            "Embedded {} signature {}x{} as object {:?}{}",
            format.as_str(),
            image.width,
            image.height,
            id,
            if mask_id.is_some() { " with soft mask" } else { "" }
        );
        Ok(EmbeddedImage {
            id,
            width: image.width,
            height: image.height,
        })
    }

    fn draw_image(
        &mut self,
        page_index: usize,
        image: &EmbeddedImage,
        placement: &PlacementBox,
        opacity: f64,
    ) -> Result<()> {
        let page_id = self.page_id(page_index)?;

        let mut resources = self.resolved_resources(page_index)?;
        let mut xobjects = self.resource_category(&resources, b"XObject");
        let image_name = fresh_name(&xobjects, "Im");
        xobjects.set(image_name.as_str(), image.id);
        resources.set("XObject", xobjects);

        let opacity = opacity.clamp(0.0, 1.0);
        let gs_name = if opacity < 1.0 {
            let mut states = self.resource_category(&resources, b"ExtGState");
            let name = fresh_name(&states, "GS");
            states.set(
                name.as_str(),
                dictionary! {
                    "Type" => "ExtGState",
                    "CA" => Object::Real(opacity as _),
                    "ca" => Object::Real(opacity as _),
                },
            );
            resources.set("ExtGState", states);
            Some(name)
        } else {
            None
        };

        let mut contents = vec![Object::Reference(
            self.doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec())),
        )];
        contents.extend(self.content_refs(self.page_dict(page_index)?));
        let mut tail = b"\nQ\n".to_vec();
        tail.extend(image_draw_content(&image_name, gs_name.as_deref(), placement)?);
        contents.push(Object::Reference(
            self.doc.add_object(Stream::new(Dictionary::new(), tail)),
        ));

        let page = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Resources", resources);
        page.set("Contents", contents);
        self.run_cache.borrow_mut().remove(&page_index);

        log::info!(
            "Drew signature /{} on page {} at ({:.2}, {:.2}) size {:.2}x{:.2}",
            image_name,
            page_index,
            placement.x,
            placement.y,
            placement.width,
            placement.height
        );
        Ok(())
    }

    fn serialize(mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}
