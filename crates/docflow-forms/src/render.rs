//! Form layout projected from the configuration store.
//!
//! The layout is a disposable snapshot: it is rebuilt from the store on
//! load and never patched in place.

use crate::config::{ConfigStore, FieldType};

/// Checkbox selecting one document type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionEntry {
    /// Element id, `doc1`, `doc2`, ...
    pub checkbox_id: String,
    /// Document type key, the checkbox value
    pub key: String,
    pub name: String,
    /// Section toggled by this checkbox
    pub form_id: String,
}

/// How a field is rendered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlKind {
    TextArea,
    /// `<input type=...>`
    Input(String),
}

impl ControlKind {
    /// Whether clearing the form empties this control. Only text, date and
    /// textarea controls are reset; other input types keep their value.
    pub fn resets_on_clear(&self) -> bool {
        match self {
            Self::TextArea => true,
            Self::Input(ty) => matches!(ty.as_str(), "text" | "date"),
        }
    }
}

/// One labeled control. Controls carry a placeholder hint, never a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Control {
    pub name: String,
    pub label: String,
    pub kind: ControlKind,
    pub placeholder: String,
}

/// The per-document form section
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormSection {
    /// Element id, the document type's formId
    pub form_id: String,
    pub key: String,
    pub heading: String,
    pub controls: Vec<Control>,
}

/// Selection entries and sections, one pair per document type
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormLayout {
    pub entries: Vec<SelectionEntry>,
    pub sections: Vec<FormSection>,
}

impl FormLayout {
    pub fn build(store: &ConfigStore) -> Self {
        let mut layout = Self::default();

        for (index, (key, doc)) in store.document_types().iter().enumerate() {
            layout.entries.push(SelectionEntry {
                checkbox_id: format!("doc{}", index + 1),
                key: key.to_string(),
                name: doc.name.clone(),
                form_id: doc.form_id.clone(),
            });

            let controls = doc
                .fields
                .iter()
                .map(|field| Control {
                    name: field.name.clone(),
                    label: field.label.clone(),
                    kind: match &field.field_type {
                        FieldType::Textarea => ControlKind::TextArea,
                        other => ControlKind::Input(other.as_str().to_string()),
                    },
                    placeholder: field.placeholder.clone().unwrap_or_default(),
                })
                .collect();

            layout.sections.push(FormSection {
                form_id: doc.form_id.clone(),
                key: key.to_string(),
                heading: format!("{}の追加情報", doc.name),
                controls,
            });
        }

        tracing::debug!(sections = layout.sections.len(), "form layout built");
        layout
    }

    pub fn entry(&self, key: &str) -> Option<&SelectionEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn section(&self, key: &str) -> Option<&FormSection> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
