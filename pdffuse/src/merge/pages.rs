//! Page tree helpers.
//!
//! Pages moved into a new tree lose the attributes they inherited from
//! their old ancestors, so those are copied onto the page first.

use std::collections::HashSet;

use lopdf::{Document, Object, ObjectId};

use crate::error::{PdfFuseError, Result};

/// Page attributes a page may inherit from its `Pages` ancestors.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Collect inheritable attributes the page lacks but an ancestor defines.
///
/// The nearest ancestor wins. Broken or cyclic parent chains end the walk.
pub(crate) fn inherited_attributes(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<(&'static [u8], Object)>> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| PdfFuseError::merge_failed(format!("Page {page_id:?} is unreadable: {e}")))?;

    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut visited = HashSet::from([page_id]);
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(id) = parent
        && !missing.is_empty()
        && visited.insert(id)
    {
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(found)
}

/// Move a page under `parent`, keeping what it inherited.
pub(crate) fn adopt_page(doc: &mut Document, page_id: ObjectId, parent: ObjectId) -> Result<()> {
    let inherited = inherited_attributes(doc, page_id)?;

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfFuseError::merge_failed(format!("Page {page_id:?} is unreadable: {e}")))?;

    for (key, value) in inherited {
        page.set(key, value);
    }
    page.set("Parent", Object::Reference(parent));

    Ok(())
}
