//! Init command

use anyhow::{bail, Context};
use colored::Colorize;
use docflow_forms::{ConfigStore, DocumentType, Field, WebhookConfig};
use std::fs;
use std::path::Path;

/// Starter configuration with two document types
pub fn sample() -> ConfigStore {
    let mut store = ConfigStore::default();
    store.add_document_type(
        "contract",
        DocumentType::new("契約書", "contract-form")
            .with_field(Field::text("contract-title", "契約件名").with_placeholder("例: 業務委託契約"))
            .with_field(Field::text("contract-amount", "契約金額").with_placeholder("例: 1,000,000円"))
            .with_field(Field::textarea("contract-terms", "特記事項")),
    );
    store.add_document_type(
        "invoice",
        DocumentType::new("請求書", "invoice-form")
            .with_field(Field::text("invoice-number", "請求番号").with_placeholder("例: INV-0001"))
            .with_field(Field {
                name: "invoice-due".into(),
                label: "支払期日".into(),
                field_type: "date".to_string().into(),
                placeholder: None,
            }),
    );
    store.update_webhook(WebhookConfig::new("", ""));
    store
}

pub fn handle(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let json = sample().export()?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("{} Sample configuration written to {}", "✓".green().bold(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_consistent() {
        let store = sample();
        assert!(store.issues().is_empty());
        assert_eq!(store.document_type("invoice").unwrap().fields[1].field_type.as_str(), "date");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        handle(&path, false).unwrap();
        let written = ConfigStore::try_load(&path).unwrap();
        assert_eq!(written.document_types().len(), 2);

        fs::write(&path, "{}").unwrap();
        assert!(handle(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        handle(&path, true).unwrap();
        assert!(ConfigStore::try_load(&path).unwrap().document_type("contract").is_some());
    }
}
