//! Interactive form fields.

use lopdf::{Dictionary, Document, Object};

/// Form-wide entries taken from the first input that defines them.
const FORM_DEFAULTS: [&[u8]; 3] = [b"DA", b"DR", b"Q"];

/// Gathers `/AcroForm` fields from each input for the merged catalog.
#[derive(Debug, Default)]
pub(crate) struct FormCollector {
    fields: Vec<Object>,
    defaults: Dictionary,
}

impl FormCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take the form fields of `doc`. Objects must already carry the ids
    /// they will have in the merged document.
    pub(crate) fn collect(&mut self, doc: &Document) {
        let Some(form) = acro_form(doc) else {
            return;
        };

        if let Ok(fields) = form.get(b"Fields")
            && let Ok((_, fields)) = doc.dereference(fields)
            && let Ok(fields) = fields.as_array()
        {
            self.fields.extend(fields.iter().cloned());
        }

        for key in FORM_DEFAULTS {
            if !self.defaults.has(key)
                && let Ok(value) = form.get(key)
            {
                self.defaults.set(key, value.clone());
            }
        }
    }

    /// Number of top-level fields collected.
    pub(crate) fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Build the merged `/AcroForm` dictionary, if any input had fields.
    ///
    /// `NeedAppearances` is set so viewers regenerate field appearances.
    pub(crate) fn into_acro_form(self) -> Option<Dictionary> {
        if self.fields.is_empty() {
            return None;
        }

        let mut form = self.defaults;
        form.set("Fields", Object::Array(self.fields));
        form.set("NeedAppearances", Object::Boolean(true));
        Some(form)
    }
}

fn acro_form(doc: &Document) -> Option<&Dictionary> {
    let form = doc.catalog().ok()?.get(b"AcroForm").ok()?;
    let (_, form) = doc.dereference(form).ok()?;
    form.as_dict().ok()
}
