//! Configuration store
//!
//! Document types and the webhook target, loaded from a JSON resource and
//! exported back in the same shape.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{FormsError, Result};
use crate::ordered::OrderedMap;

// =============================================================================
// Core Types
// =============================================================================

/// An explicit `null` falls back to the default, like an absent key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level shape of `config.json`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Webhook target
    #[serde(default, deserialize_with = "null_as_default")]
    pub webhook: WebhookConfig,
    /// Document types keyed by their identifier, in file order
    #[serde(default, deserialize_with = "null_as_default")]
    pub document_types: OrderedMap<DocumentType>,
}

/// A selectable category of form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    /// Display label
    pub name: String,
    /// Id of the rendered form section
    pub form_id: String,
    /// Ordered fields
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
}

impl DocumentType {
    /// New document type without fields
    pub fn new(name: impl Into<String>, form_id: impl Into<String>) -> Self {
        Self { name: name.into(), form_id: form_id.into(), fields: vec![] }
    }

    /// Builder-style field append
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// One input of a document form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Lookup and payload key, unique within its document type
    pub name: String,
    /// Display label
    pub label: String,
    /// Control type
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub field_type: FieldType,
    /// Hint shown in the empty control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Field {
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self { name: name.into(), label: label.into(), field_type: FieldType::Text, placeholder: None }
    }

    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self { field_type: FieldType::Textarea, ..Self::text(name, label) }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// Field control type.
///
/// `text` and `textarea` are the editor's choices; any other value is kept
/// verbatim and rendered as an `<input>` of that type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Input(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Input(kind) => kind,
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" | "" => Self::Text,
            "textarea" => Self::Textarea,
            _ => Self::Input(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Webhook target. An empty url means "unconfigured".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Forwarded verbatim in every payload
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self { url: url.into(), token: token.into() }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Non-fatal consistency finding
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigIssue {
    /// Two document types render into the same section id
    DuplicateFormId { form_id: String, keys: Vec<String> },
    /// Field name repeated inside one document type
    DuplicateFieldName { key: String, field: String },
    /// Document type without a name or form id
    IncompleteDocumentType { key: String },
    /// Field without a name or label
    IncompleteField { key: String, index: usize },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFormId { form_id, keys } => {
                write!(f, "formId '{}' is shared by {}", form_id, keys.join(", "))
            }
            Self::DuplicateFieldName { key, field } => {
                write!(f, "{}: field name '{}' is not unique", key, field)
            }
            Self::IncompleteDocumentType { key } => write!(f, "{}: missing name or formId", key),
            Self::IncompleteField { key, index } => {
                write!(f, "{}: field #{} is missing a name or label", key, index + 1)
            }
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Owned, in-memory configuration.
///
/// Mutations stay in memory until [`ConfigStore::export`] is called and the
/// result is written somewhere by the caller.
#[derive(Clone, Debug, Default)]
pub struct ConfigStore {
    settings: Settings,
}

impl ConfigStore {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Load from a JSON file, falling back to an empty configuration on any
    /// read or parse failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(store) => {
                tracing::info!(
                    path = %path.display(),
                    document_types = store.settings.document_types.len(),
                    "configuration loaded"
                );
                store
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "configuration unavailable, using defaults");
                Self::default()
            }
        }
    }

    /// Strict load used by tooling
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(content).map_err(|e| FormsError::ConfigParse(e.to_string()))?;
        Ok(Self { settings })
    }

    /// Pretty-printed JSON in the shape accepted by [`ConfigStore::from_json`]
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.settings).map_err(|e| FormsError::Serialize(e.to_string()))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn webhook(&self) -> &WebhookConfig {
        &self.settings.webhook
    }

    pub fn document_types(&self) -> &OrderedMap<DocumentType> {
        &self.settings.document_types
    }

    pub fn document_type(&self, key: &str) -> Option<&DocumentType> {
        self.settings.document_types.get(key)
    }

    pub fn add_document_type(&mut self, key: impl Into<String>, doc: DocumentType) {
        self.settings.document_types.insert(key, doc);
    }

    pub fn remove_document_type(&mut self, key: &str) -> Option<DocumentType> {
        self.settings.document_types.remove(key)
    }

    /// Append a field; returns false when the document type does not exist
    pub fn add_field(&mut self, key: &str, field: Field) -> bool {
        match self.settings.document_types.get_mut(key) {
            Some(doc) => {
                doc.fields.push(field);
                true
            }
            None => false,
        }
    }

    pub fn remove_field(&mut self, key: &str, index: usize) -> Option<Field> {
        let doc = self.settings.document_types.get_mut(key)?;
        if index < doc.fields.len() {
            Some(doc.fields.remove(index))
        } else {
            None
        }
    }

    pub fn update_webhook(&mut self, webhook: WebhookConfig) {
        self.settings.webhook = webhook;
    }

    pub fn replace_document_types(&mut self, document_types: OrderedMap<DocumentType>) {
        self.settings.document_types = document_types;
    }

    /// Consistency findings that do not prevent loading
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut form_ids: OrderedMap<Vec<String>> = OrderedMap::new();

        for (key, doc) in self.settings.document_types.iter() {
            if doc.name.is_empty() || doc.form_id.is_empty() {
                issues.push(ConfigIssue::IncompleteDocumentType { key: key.to_string() });
            }
            if !doc.form_id.is_empty() {
                match form_ids.get_mut(&doc.form_id) {
                    Some(keys) => keys.push(key.to_string()),
                    None => {
                        form_ids.insert(doc.form_id.clone(), vec![key.to_string()]);
                    }
                }
            }

            let mut seen = HashSet::new();
            for (index, field) in doc.fields.iter().enumerate() {
                if field.name.is_empty() || field.label.is_empty() {
                    issues.push(ConfigIssue::IncompleteField { key: key.to_string(), index });
                } else if !seen.insert(field.name.as_str()) {
                    issues.push(ConfigIssue::DuplicateFieldName {
                        key: key.to_string(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        for (form_id, keys) in form_ids {
            if keys.len() > 1 {
                issues.push(ConfigIssue::DuplicateFormId { form_id, keys });
            }
        }
        issues
    }
}

impl From<Settings> for ConfigStore {
    fn from(settings: Settings) -> Self {
        Self::new(settings)
    }
}
