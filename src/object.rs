//! Helpers over the lopdf object model.
//!
//! PDF allows almost any value to be an indirect reference, and numbers to be
//! integers or reals. These helpers hide both so the extraction and drawing
//! code can read dictionaries directly.

use lopdf::{Dictionary, Document, Object};

/// Maximum `/Parent` hops followed when looking up inherited page attributes.
pub(crate) const MAX_INHERITANCE_DEPTH: usize = 32;

/// Follow indirect references until a direct object is reached.
///
/// Dangling references and overly long chains resolve to `None`.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Look up `key` in `dict` and resolve it.
pub fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj))
}

/// Look up `key` and resolve it to a dictionary.
pub fn get_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    get(doc, dict, key).and_then(|obj| obj.as_dict().ok())
}

/// Look up `key` and resolve it to an array.
pub fn get_array<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Vec<Object>> {
    get(doc, dict, key).and_then(|obj| obj.as_array().ok())
}

/// Look up `key` and read it as a number.
pub fn get_number(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    get(doc, dict, key).and_then(number)
}

/// Look up `key` and read it as a name.
pub fn get_name<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    get(doc, dict, key).and_then(|obj| obj.as_name().ok())
}

/// Look up a page attribute, walking up `/Parent` for inheritable keys.
pub fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Some(value) = get(doc, node, key) {
            return Some(value);
        }
        node = get_dict(doc, node, b"Parent")?;
    }
    None
}

/// Integer or real value of `obj`.
pub fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Numbers of an operand list; `None` if any operand is not a number.
pub fn numbers(operands: &[Object]) -> Option<Vec<f64>> {
    operands.iter().map(number).collect()
}
