//! Output formatting

use clap::ValueEnum;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

impl OutputFormat {
    /// Render rows; `structured` is what json and yaml serialize
    pub fn render<R: Tabled, S: Serialize>(&self, rows: &[R], structured: &S) -> anyhow::Result<String> {
        Ok(match self {
            OutputFormat::Json => serde_json::to_string_pretty(structured)?,
            OutputFormat::Yaml => serde_yaml::to_string(structured)?,
            OutputFormat::Table => Table::new(rows).with(Style::rounded()).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        key: &'static str,
    }

    #[test]
    fn test_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("YAML".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render() {
        let rows = [Row { key: "contract" }];
        let table = OutputFormat::Table.render(&rows, &rows).unwrap();
        assert!(table.contains("key"));
        assert!(table.contains("contract"));

        let json = OutputFormat::Json.render(&rows, &rows).unwrap();
        assert!(json.contains("\"key\": \"contract\""));

        let yaml = OutputFormat::Yaml.render(&rows, &rows).unwrap();
        assert!(yaml.contains("key: contract"));
    }
}
