//! Configuration editor.
//!
//! Edits happen on an [`EditBuffer`] opened from the store. Structural edits
//! (add/remove document type or field) only touch the buffer; a commit
//! validates the whole buffer at once and produces the replacement
//! document-type map together with a report of the rows it dropped.

use chrono::Utc;
use std::fmt;
use std::str::FromStr;

use crate::config::{ConfigStore, DocumentType, Field, FieldType, WebhookConfig};
use crate::ordered::OrderedMap;

/// Name given to a freshly added document type
pub const NEW_DOCUMENT_NAME: &str = "新規書類";
/// Form id given to a freshly added document type
pub const NEW_DOCUMENT_FORM_ID: &str = "new-form";

/// Editable field row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldDraft {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub placeholder: String,
}

/// Editable document type block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentDraft {
    /// Store key; not editable
    pub key: String,
    pub name: String,
    pub form_id: String,
    pub fields: Vec<FieldDraft>,
}

/// Row left out of a commit because a required value was empty
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DroppedRow {
    DocumentType { key: String, name: String },
    Field { document: String, index: usize },
}

impl fmt::Display for DroppedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentType { key, name } if name.is_empty() => write!(f, "書類タイプ {}", key),
            Self::DocumentType { name, .. } => write!(f, "書類タイプ「{}」", name),
            Self::Field { document, index } => write!(f, "「{}」のフィールド{}", document, index + 1),
        }
    }
}

/// Outcome of committing the document types
#[derive(Clone, Debug, PartialEq)]
pub struct CommitReport {
    pub document_types: OrderedMap<DocumentType>,
    pub dropped: Vec<DroppedRow>,
}

impl CommitReport {
    /// Replace the store's document types with the committed ones
    pub fn apply(&self, store: &mut ConfigStore) {
        store.replace_document_types(self.document_types.clone());
    }

    /// Warning listing the dropped rows, if any
    pub fn warning(&self) -> Option<String> {
        if self.dropped.is_empty() {
            return None;
        }
        let rows: Vec<String> = self.dropped.iter().map(ToString::to_string).collect();
        Some(format!("未入力の項目があるため保存されなかった行: {}", rows.join(", ")))
    }
}

/// Action requested from the settings view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorAction {
    AddDocumentType,
    RemoveDocumentType(usize),
    AddField(usize),
    RemoveField(usize, usize),
    SaveDocumentTypes,
    SaveWebhook,
}

impl FromStr for EditorAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let verb = parts.next().unwrap_or_default();
        let mut index = || -> Result<usize, String> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| format!("missing index in action '{}'", s))
        };
        match verb {
            "add-doc" => Ok(Self::AddDocumentType),
            "remove-doc" => Ok(Self::RemoveDocumentType(index()?)),
            "add-field" => Ok(Self::AddField(index()?)),
            "remove-field" => {
                let doc = index()?;
                Ok(Self::RemoveField(doc, index()?))
            }
            "save-docs" => Ok(Self::SaveDocumentTypes),
            "save-webhook" => Ok(Self::SaveWebhook),
            _ => Err(format!("unknown editor action '{}'", s)),
        }
    }
}

impl fmt::Display for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddDocumentType => write!(f, "add-doc"),
            Self::RemoveDocumentType(i) => write!(f, "remove-doc:{}", i),
            Self::AddField(i) => write!(f, "add-field:{}", i),
            Self::RemoveField(i, j) => write!(f, "remove-field:{}:{}", i, j),
            Self::SaveDocumentTypes => write!(f, "save-docs"),
            Self::SaveWebhook => write!(f, "save-webhook"),
        }
    }
}

// =============================================================================
// Posted control names
// =============================================================================

pub fn document_input_name(doc: usize, attr: &str) -> String {
    format!("doc-{}-{}", doc, attr)
}

pub fn field_input_name(doc: usize, field: usize, attr: &str) -> String {
    format!("doc-{}-field-{}-{}", doc, field, attr)
}

pub const WEBHOOK_URL_INPUT: &str = "webhook-url";
pub const WEBHOOK_TOKEN_INPUT: &str = "webhook-token";

enum Target<'a> {
    Document(usize, &'a str),
    Field(usize, usize, &'a str),
}

fn parse_target(name: &str) -> Option<Target<'_>> {
    let rest = name.strip_prefix("doc-")?;
    let (doc, rest) = rest.split_once('-')?;
    let doc = doc.parse().ok()?;
    match rest.strip_prefix("field-") {
        Some(rest) => {
            let (field, attr) = rest.split_once('-')?;
            Some(Target::Field(doc, field.parse().ok()?, attr))
        }
        None => Some(Target::Document(doc, rest)),
    }
}

// =============================================================================
// Buffer
// =============================================================================

/// Editable copy of the configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditBuffer {
    documents: Vec<DocumentDraft>,
    webhook: WebhookConfig,
}

impl EditBuffer {
    pub fn open(store: &ConfigStore) -> Self {
        let documents = store
            .document_types()
            .iter()
            .map(|(key, doc)| DocumentDraft {
                key: key.to_string(),
                name: doc.name.clone(),
                form_id: doc.form_id.clone(),
                fields: doc
                    .fields
                    .iter()
                    .map(|f| FieldDraft {
                        name: f.name.clone(),
                        label: f.label.clone(),
                        field_type: f.field_type.clone(),
                        placeholder: f.placeholder.clone().unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();
        Self { documents, webhook: store.webhook().clone() }
    }

    pub fn documents(&self) -> &[DocumentDraft] {
        &self.documents
    }

    pub fn webhook(&self) -> &WebhookConfig {
        &self.webhook
    }

    /// Append a blank document type keyed `doc-<unix millis>`
    pub fn add_document_type(&mut self) -> &DocumentDraft {
        let mut key = format!("doc-{}", Utc::now().timestamp_millis());
        let base = key.clone();
        let mut n = 1;
        while self.documents.iter().any(|d| d.key == key) {
            n += 1;
            key = format!("{}-{}", base, n);
        }
        self.documents.push(DocumentDraft {
            key,
            name: NEW_DOCUMENT_NAME.to_string(),
            form_id: NEW_DOCUMENT_FORM_ID.to_string(),
            fields: vec![],
        });
        &self.documents[self.documents.len() - 1]
    }

    pub fn remove_document_type(&mut self, index: usize) -> Option<DocumentDraft> {
        (index < self.documents.len()).then(|| self.documents.remove(index))
    }

    /// Append a blank field row; false when the document index is stale
    pub fn add_field(&mut self, doc: usize) -> bool {
        match self.documents.get_mut(doc) {
            Some(draft) => {
                draft.fields.push(FieldDraft::default());
                true
            }
            None => false,
        }
    }

    pub fn remove_field(&mut self, doc: usize, field: usize) -> Option<FieldDraft> {
        let draft = self.documents.get_mut(doc)?;
        (field < draft.fields.len()).then(|| draft.fields.remove(field))
    }

    /// Copy posted control values into the buffer. Unknown or stale names
    /// are ignored.
    pub fn apply_form(&mut self, pairs: &[(String, String)]) {
        for (name, value) in pairs {
            match name.as_str() {
                WEBHOOK_URL_INPUT => self.webhook.url = value.clone(),
                WEBHOOK_TOKEN_INPUT => self.webhook.token = value.clone(),
                _ => match parse_target(name) {
                    Some(Target::Document(doc, attr)) => {
                        let Some(draft) = self.documents.get_mut(doc) else { continue };
                        match attr {
                            "name" => draft.name = value.clone(),
                            "formId" => draft.form_id = value.clone(),
                            _ => {}
                        }
                    }
                    Some(Target::Field(doc, field, attr)) => {
                        let Some(row) = self.documents.get_mut(doc).and_then(|d| d.fields.get_mut(field)) else {
                            continue;
                        };
                        match attr {
                            "name" => row.name = value.clone(),
                            "label" => row.label = value.clone(),
                            "type" => row.field_type = FieldType::from(value.clone()),
                            "placeholder" => row.placeholder = value.clone(),
                            _ => {}
                        }
                    }
                    None => {}
                },
            }
        }
    }

    /// Derive the document-type map from the buffer.
    ///
    /// Fields without a name or label and document types without a name or
    /// form id are left out and listed in the report.
    pub fn commit_document_types(&self) -> CommitReport {
        let mut document_types = OrderedMap::new();
        let mut dropped = Vec::new();

        for draft in &self.documents {
            if draft.name.is_empty() || draft.form_id.is_empty() {
                dropped.push(DroppedRow::DocumentType { key: draft.key.clone(), name: draft.name.clone() });
                continue;
            }

            let mut fields = Vec::with_capacity(draft.fields.len());
            for (index, row) in draft.fields.iter().enumerate() {
                if row.name.is_empty() || row.label.is_empty() {
                    dropped.push(DroppedRow::Field { document: draft.name.clone(), index });
                    continue;
                }
                fields.push(Field {
                    name: row.name.clone(),
                    label: row.label.clone(),
                    field_type: row.field_type.clone(),
                    placeholder: (!row.placeholder.is_empty()).then(|| row.placeholder.clone()),
                });
            }

            document_types.insert(
                draft.key.clone(),
                DocumentType { name: draft.name.clone(), form_id: draft.form_id.clone(), fields },
            );
        }

        if !dropped.is_empty() {
            tracing::warn!(dropped = dropped.len(), "incomplete editor rows left out of the configuration");
        }
        CommitReport { document_types, dropped }
    }

    pub fn commit_webhook(&self) -> WebhookConfig {
        self.webhook.clone()
    }
}
