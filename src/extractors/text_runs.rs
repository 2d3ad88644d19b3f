//! Positioned text runs from page content streams.
//!
//! A small interpreter for the text and graphics-state operators of PDF
//! 32000-1 sections 8.4 and 9.3-9.4. Each text-showing operator (`Tj`, `TJ`,
//! `'`, `"`) yields one [`TextRun`] whose origin is the start of the text
//! rendering matrix in user space and whose width is the total advance.
//! Form XObjects are followed so that text in reusable forms is not lost.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::Result;
use crate::fonts::FontInfo;
use crate::geometry::Matrix;
use crate::object::{self, numbers};
use crate::text::TextRun;

/// Maximum Form XObject nesting followed.
const MAX_FORM_DEPTH: usize = 8;

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Rc<FontInfo>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scaling: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// Element of a `TJ` array.
enum Shown<'o> {
    Bytes(&'o [u8]),
    Adjust(f64),
}

/// Extract the text runs of one page, in content-stream order.
pub fn extract_page_runs(doc: &Document, page_id: ObjectId, page_index: usize) -> Result<Vec<TextRun>> {
    let page = doc.get_object(page_id)?.as_dict()?;
    let empty = Dictionary::new();
    let resources = object::inherited(doc, page, b"Resources")
        .and_then(|obj| obj.as_dict().ok())
        .unwrap_or(&empty);

    let data = doc.get_page_content(page_id)?;
    let content = Content::decode(&data)?;

    let mut interpreter = Interpreter::new(doc, page_index);
    interpreter.run(&content.operations, resources, 0);
    log::debug!(
        "Page {}: extracted {} text runs",
        page_index,
        interpreter.runs.len()
    );
    Ok(interpreter.runs)
}

struct Interpreter<'a> {
    doc: &'a Document,
    page_index: usize,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    fonts: HashMap<ObjectId, Rc<FontInfo>>,
    active_forms: Vec<ObjectId>,
    runs: Vec<TextRun>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document, page_index: usize) -> Self {
        Self {
            doc,
            page_index,
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: Matrix::identity(),
            line_matrix: Matrix::identity(),
            fonts: HashMap::new(),
            active_forms: Vec::new(),
            runs: Vec::new(),
        }
    }

    fn run(&mut self, operations: &[Operation], resources: &'a Dictionary, depth: usize) {
        for op in operations {
            self.execute(op, resources, depth);
        }
    }

    fn execute(&mut self, op: &Operation, resources: &'a Dictionary, depth: usize) {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.state = saved;
                }
            },
            "cm" => {
                if let Some(m) = numbers(operands).as_deref().and_then(Matrix::from_slice) {
                    self.state.ctm = m.multiply(&self.state.ctm);
                }
            },
            "BT" => {
                self.text_matrix = Matrix::identity();
                self.line_matrix = Matrix::identity();
            },
            "Tf" => {
                if let [name, size] = operands {
                    if let Ok(name) = name.as_name() {
                        self.state.text.font = Some(self.font(resources, name));
                    }
                    if let Some(size) = object::number(size) {
                        self.state.text.font_size = size;
                    }
                }
            },
            "Tc" => self.set_number(operands, |t, v| t.char_spacing = v),
            "Tw" => self.set_number(operands, |t, v| t.word_spacing = v),
            "Tz" => self.set_number(operands, |t, v| t.horizontal_scaling = v / 100.0),
            "TL" => self.set_number(operands, |t, v| t.leading = v),
            "Ts" => self.set_number(operands, |t, v| t.rise = v),
            "Td" => {
                if let Some([tx, ty]) = numbers(operands).as_deref().and_then(first_two) {
                    self.move_line(tx, ty);
                }
            },
            "TD" => {
                if let Some([tx, ty]) = numbers(operands).as_deref().and_then(first_two) {
                    self.state.text.leading = -ty;
                    self.move_line(tx, ty);
                }
            },
            "Tm" => {
                if let Some(m) = numbers(operands).as_deref().and_then(Matrix::from_slice) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            },
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(bytes) = operands.first().and_then(string_bytes) {
                    self.show(&[Shown::Bytes(bytes)]);
                }
            },
            "TJ" => {
                if let Some(Ok(array)) = operands.first().map(Object::as_array) {
                    let items: Vec<Shown<'_>> = array
                        .iter()
                        .filter_map(|item| match string_bytes(item) {
                            Some(bytes) => Some(Shown::Bytes(bytes)),
                            None => object::number(item).map(Shown::Adjust),
                        })
                        .collect();
                    self.show(&items);
                }
            },
            "'" => {
                self.next_line();
                if let Some(bytes) = operands.first().and_then(string_bytes) {
                    self.show(&[Shown::Bytes(bytes)]);
                }
            },
            "\"" => {
                if let [aw, ac, text] = operands {
                    if let (Some(aw), Some(ac)) = (object::number(aw), object::number(ac)) {
                        self.state.text.word_spacing = aw;
                        self.state.text.char_spacing = ac;
                    }
                    self.next_line();
                    if let Some(bytes) = string_bytes(text) {
                        self.show(&[Shown::Bytes(bytes)]);
                    }
                }
            },
            "Do" => {
                if let Some(Ok(name)) = operands.first().map(Object::as_name) {
                    self.draw_form(resources, name, depth);
                }
            },
            _ => {},
        }
    }

    fn set_number(&mut self, operands: &[Object], apply: impl FnOnce(&mut TextState, f64)) {
        if let Some(value) = operands.first().and_then(object::number) {
            apply(&mut self.state.text, value);
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    fn font(&mut self, resources: &'a Dictionary, name: &[u8]) -> Rc<FontInfo> {
        let doc = self.doc;
        let entry = object::get_dict(doc, resources, b"Font").and_then(|fonts| fonts.get(name).ok());

        let Some(entry) = entry else {
            log::warn!(
                "Font resource /{} not found, using fallback metrics",
                String::from_utf8_lossy(name)
            );
            return Rc::new(FontInfo::fallback());
        };

        if let Object::Reference(id) = entry {
            if let Some(font) = self.fonts.get(id) {
                return Rc::clone(font);
            }
        }

        let font = match object::resolve(doc, entry).and_then(|obj| obj.as_dict().ok()) {
            Some(dict) => Rc::new(FontInfo::from_dict(doc, dict)),
            None => Rc::new(FontInfo::fallback()),
        };
        if let Object::Reference(id) = entry {
            self.fonts.insert(*id, Rc::clone(&font));
        }
        font
    }

    /// Emit one run for a sequence of shown strings and adjustments.
    fn show(&mut self, items: &[Shown<'_>]) {
        let font = self
            .state
            .text
            .font
            .clone()
            .unwrap_or_else(|| Rc::new(FontInfo::fallback()));
        let ts = self.state.text.clone();

        let start = self.text_matrix.multiply(&self.state.ctm);
        let (x, y) = start.apply(0.0, ts.rise);

        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            let tx = match item {
                Shown::Bytes(bytes) => font
                    .decode(bytes)
                    .into_iter()
                    .map(|glyph| {
                        text.push_str(&glyph.text);
                        let spacing = if glyph.is_space { ts.word_spacing } else { 0.0 };
                        (glyph.width / 1000.0 * ts.font_size + ts.char_spacing + spacing)
                            * ts.horizontal_scaling
                    })
                    .sum::<f64>(),
                Shown::Adjust(amount) => -amount / 1000.0 * ts.font_size * ts.horizontal_scaling,
            };
            advance += tx;
            self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
        }

        if text.is_empty() {
            return;
        }

        self.runs.push(TextRun {
            text,
            x,
            y,
            width: advance * start.horizontal_scale(),
            page_index: self.page_index,
        });
    }

    fn draw_form(&mut self, resources: &'a Dictionary, name: &[u8], depth: usize) {
        let doc = self.doc;
        let entry = object::get_dict(doc, resources, b"XObject").and_then(|x| x.get(name).ok());
        let Some(&Object::Reference(id)) = entry else {
            return;
        };
        if depth >= MAX_FORM_DEPTH || self.active_forms.contains(&id) {
            log::warn!(
                "Skipping Form XObject /{}: nesting too deep or cyclic",
                String::from_utf8_lossy(name)
            );
            return;
        }
        let Ok(stream) = doc.get_object(id).and_then(Object::as_stream) else {
            return;
        };
        if object::get_name(doc, &stream.dict, b"Subtype") != Some(b"Form".as_slice()) {
            return;
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let content = match Content::decode(&data) {
            Ok(content) => content,
            Err(e) => {
                log::warn!(
                    "Failed to parse Form XObject /{} content: {}, skipping",
                    String::from_utf8_lossy(name),
                    e
                );
                return;
            },
        };

        let form_matrix = object::get_array(doc, &stream.dict, b"Matrix")
            .and_then(|m| numbers(m))
            .as_deref()
            .and_then(Matrix::from_slice)
            .unwrap_or_default();
        let form_resources = object::get_dict(doc, &stream.dict, b"Resources").unwrap_or(resources);

        let saved = (self.state.clone(), self.text_matrix, self.line_matrix);
        self.state.ctm = form_matrix.multiply(&self.state.ctm);
        self.active_forms.push(id);
        self.run(&content.operations, form_resources, depth + 1);
        self.active_forms.pop();
        (self.state, self.text_matrix, self.line_matrix) = saved;
    }
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}

fn first_two(values: &[f64]) -> Option<[f64; 2]> {
    match values {
        [a, b, ..] => Some([*a, *b]),
        _ => None,
    }
}
