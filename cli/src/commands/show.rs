//! Show command

use anyhow::Context;
use docflow_forms::{ConfigStore, DocumentType, Settings};
use std::path::Path;
use tabled::Tabled;

use super::mask;
use crate::output::OutputFormat;

#[derive(Debug, Tabled)]
pub struct DocumentRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub key: String,
    pub name: String,
    #[tabled(rename = "form id")]
    pub form_id: String,
    pub fields: String,
}

impl DocumentRow {
    fn new(position: usize, key: &str, doc: &DocumentType) -> Self {
        let fields = doc
            .fields
            .iter()
            .map(|f| format!("{} ({}, {})", f.name, f.label, f.field_type))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            position,
            key: key.to_string(),
            name: doc.name.clone(),
            form_id: doc.form_id.clone(),
            fields,
        }
    }
}

pub fn rows(store: &ConfigStore) -> Vec<DocumentRow> {
    store
        .document_types()
        .iter()
        .enumerate()
        .map(|(i, (key, doc))| DocumentRow::new(i + 1, key, doc))
        .collect()
}

/// Settings for json/yaml output, with the webhook token masked
pub fn structured(store: &ConfigStore) -> Settings {
    let mut settings = store.settings().clone();
    if !settings.webhook.token.is_empty() {
        settings.webhook.token = mask(&settings.webhook.token);
    }
    settings
}

pub fn handle(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let store = ConfigStore::try_load(path).with_context(|| format!("loading {}", path.display()))?;
    println!("{}", format.render(&rows(&store), &structured(&store))?);

    if format == OutputFormat::Table {
        let webhook = store.webhook();
        if webhook.is_configured() {
            println!("webhook: {} (token: {})", webhook.url, mask(&webhook.token));
        } else {
            println!("webhook: (not set)");
        }
    }
    Ok(())
}
