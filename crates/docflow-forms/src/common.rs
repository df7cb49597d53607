//! Common fields shared by every document type

use chrono::{Datelike, NaiveDate};

/// Name of the creation date field
pub const DATE_FIELD: &str = "common-date";

/// Rendered in place of an empty date
pub const EMPTY_DATE: &str = "__________";

/// Suffix of the key carrying the unformatted date
pub const RAW_SUFFIX: &str = "_raw";

/// Kind of a common control
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommonKind {
    Date,
    Text,
}

/// A field collected once per submission, regardless of the selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommonField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: CommonKind,
    pub placeholder: &'static str,
}

/// Visual group of common fields
#[derive(Clone, Copy, Debug)]
pub struct CommonGroup {
    /// `None` for the ungrouped leading row
    pub heading: Option<&'static str>,
    pub fields: &'static [CommonField],
}

const fn text(name: &'static str, label: &'static str, placeholder: &'static str) -> CommonField {
    CommonField { name, label, kind: CommonKind::Text, placeholder }
}

/// The common section: creation date and the two parties
pub const COMMON_GROUPS: &[CommonGroup] = &[
    CommonGroup {
        heading: None,
        fields: &[CommonField { name: DATE_FIELD, label: "作成日", kind: CommonKind::Date, placeholder: "" }],
    },
    CommonGroup {
        heading: Some("当事者A"),
        fields: &[
            text("common-party1-name", "氏名・名称", "例: 株式会社○○ または 山田 太郎"),
            text("common-party1-address", "住所", "例: 東京都渋谷区..."),
            text("common-party1-contact", "連絡先", "例: TEL: 03-1234-5678"),
        ],
    },
    CommonGroup {
        heading: Some("当事者B"),
        fields: &[
            text("common-party2-name", "氏名・名称", "例: 株式会社△△ または 佐藤 花子"),
            text("common-party2-address", "住所", "例: 東京都新宿区..."),
            text("common-party2-contact", "連絡先", "例: TEL: 03-9876-5432"),
        ],
    },
];

/// All common fields in render order
pub fn common_fields() -> impl Iterator<Item = &'static CommonField> {
    COMMON_GROUPS.iter().flat_map(|g| g.fields.iter())
}

/// Format an ISO date (`YYYY-MM-DD`) as `YYYY年M月D日`.
///
/// Empty input yields [`EMPTY_DATE`]; a value that is not an ISO date is
/// returned unchanged.
pub fn format_japanese_date(value: &str) -> String {
    if value.is_empty() {
        return EMPTY_DATE.to_string();
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => format!("{}年{}月{}日", date.year(), date.month(), date.day()),
        Err(_) => {
            tracing::debug!(value, "unparseable common date passed through");
            value.to_string()
        }
    }
}

/// ISO value of a date input
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_japanese_date() {
        assert_eq!(format_japanese_date("2024-03-05"), "2024年3月5日");
        assert_eq!(format_japanese_date("2023-12-31"), "2023年12月31日");
        assert_eq!(format_japanese_date(""), "__________");
        assert_eq!(format_japanese_date("soon"), "soon");
    }

    #[test]
    fn test_common_fields_layout() {
        let names: Vec<_> = common_fields().map(|f| f.name).collect();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], DATE_FIELD);
        assert_eq!(common_fields().filter(|f| f.kind == CommonKind::Date).count(), 1);
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(iso_date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()), "2024-03-05");
    }
}
