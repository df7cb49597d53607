//! Export command

use anyhow::Context;
use docflow_forms::ConfigStore;
use std::fs;
use std::path::Path;

pub fn handle(path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let store = ConfigStore::try_load(path).with_context(|| format!("loading {}", path.display()))?;
    let json = store.export()?;
    match output {
        Some(out) => {
            fs::write(out, &json).with_context(|| format!("writing {}", out.display()))?;
            eprintln!("Exported {} document type(s) to {}", store.document_types().len(), out.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_normalizes_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("config.json");
        let output = dir.path().join("out.json");
        fs::write(&input, r#"{"documentTypes":{"nda":{"name":"NDA","formId":"nda-form"}}}"#).unwrap();

        handle(&input, Some(&output)).unwrap();

        let exported: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(exported["webhook"]["url"], "");
        assert_eq!(exported["webhook"]["token"], "");
        assert_eq!(exported["documentTypes"]["nda"]["fields"], serde_json::json!([]));
    }
}
