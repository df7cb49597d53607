//! Check command

use anyhow::Context;
use colored::Colorize;
use docflow_forms::ConfigStore;
use std::path::Path;

/// Findings that do not make the configuration unusable
pub fn findings(store: &ConfigStore) -> Vec<String> {
    let mut findings: Vec<String> = store.issues().iter().map(ToString::to_string).collect();
    if !store.webhook().is_configured() {
        findings.push("webhook url is empty; submissions will be refused".into());
    }
    if store.document_types().is_empty() {
        findings.push("no document types configured".into());
    }
    findings
}

pub fn handle(path: &Path) -> anyhow::Result<()> {
    let store = match ConfigStore::try_load(path) {
        Ok(store) => store,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), path.display());
            return Err(e).with_context(|| format!("{} is not a valid configuration", path.display()));
        }
    };

    let findings = findings(&store);
    for finding in &findings {
        println!("{} {}", "!".yellow().bold(), finding);
    }

    let summary = format!(
        "{}: {} document type(s), {} warning(s)",
        path.display(),
        store.document_types().len(),
        findings.len()
    );
    if findings.is_empty() {
        println!("{} {}", "✓".green().bold(), summary);
    } else {
        println!("{} {}", "✓".yellow().bold(), summary);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_findings() {
        let store = ConfigStore::from_json(
            r#"{
                "webhook": { "url": "" },
                "documentTypes": {
                    "a": { "name": "A", "formId": "same", "fields": [{ "name": "x", "label": "" }] },
                    "b": { "name": "B", "formId": "same" }
                }
            }"#,
        )
        .unwrap();

        let findings = findings(&store);
        assert_eq!(findings.len(), 3);
        assert!(findings.iter().any(|f| f.contains("field #1")));
        assert!(findings.iter().any(|f| f.contains("'same' is shared by a, b")));
        assert!(findings.iter().any(|f| f.contains("webhook url is empty")));
    }

    #[test]
    fn test_handle_fails_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(handle(&path).is_err());
        assert!(handle(&dir.path().join("absent.json")).is_err());
    }
}
