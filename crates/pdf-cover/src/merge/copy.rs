//! Copying pages between lopdf documents

use crate::document::{INHERITABLE_KEYS, inherited_attribute};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Keys that point back up or across the source structure. Following them
/// would drag the whole source page tree into the output.
///
/// `/P` and `/B` mean something else outside annotations and pages (an
/// optional content policy, sound bits per sample), so they are only
/// dropped from those.
fn is_backlink(dict: &Dictionary, key: &[u8]) -> bool {
    match key {
        b"Parent" => true,
        b"P" => has_type(dict, b"Annot"),
        b"B" => has_type(dict, b"Page"),
        _ => false,
    }
}

fn has_type(dict: &Dictionary, expected: &[u8]) -> bool {
    matches!(dict.get(b"Type").and_then(Object::as_name), Ok(name) if name == expected)
}

/// Copies pages out of `source` into `output`.
///
/// Objects shared between pages (fonts, images, resource dictionaries) are
/// copied once; later references are remapped to the first copy.
pub(crate) struct PageCopier<'a> {
    source: &'a Document,
    output: &'a mut Document,
    remapped: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    pub(crate) fn new(source: &'a Document, output: &'a mut Document) -> Self {
        Self {
            source,
            output,
            remapped: HashMap::new(),
        }
    }

    /// Copy one page under `parent_id`.
    ///
    /// Attributes the page inherits from its ancestors are written onto the
    /// copy so it renders the same outside the source page tree.
    pub(crate) fn copy_page(&mut self, page_id: ObjectId, parent_id: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let mut page = self.copy_dictionary(source.get_dictionary(page_id)?)?;

        for key in INHERITABLE_KEYS {
            if page.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page_id, key) {
                page.set(key.to_vec(), self.copy(&value)?);
            }
        }

        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(parent_id));
        Ok(self.output.add_object(page))
    }

    fn copy(&mut self, object: &Object) -> Result<Object> {
        Ok(match object {
            Object::Reference(id) => match self.copy_reference(*id)? {
                Some(copied) => Object::Reference(copied),
                None => Object::Null,
            },
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)?),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy(item))
                    .collect::<Result<_>>()?,
            ),
            Object::Stream(stream) => {
                let mut copied = Stream::new(self.copy_dictionary(&stream.dict)?, stream.content.clone());
                copied.allows_compression = stream.allows_compression;
                Object::Stream(copied)
            }
            other => other.clone(),
        })
    }

    /// The id is claimed before the target is copied, so cycles terminate.
    ///
    /// A reference to an object the source does not define reads as null and
    /// yields `None`.
    fn copy_reference(&mut self, id: ObjectId) -> Result<Option<ObjectId>> {
        if let Some(&copied) = self.remapped.get(&id) {
            return Ok(Some(copied));
        }
        let source = self.source;
        let Some(target) = source.objects.get(&id) else {
            log::debug!("Reference {} {} R is undefined; copying as null", id.0, id.1);
            return Ok(None);
        };

        let copied_id = self.output.new_object_id();
        self.remapped.insert(id, copied_id);

        let copied = self.copy(target)?;
        self.output.objects.insert(copied_id, copied);
        Ok(Some(copied_id))
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Result<Dictionary> {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter().filter(|(key, _)| !is_backlink(dict, key)) {
            copied.set(key.clone(), self.copy(value)?);
        }
        Ok(copied)
    }
}
