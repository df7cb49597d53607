//! Form state and the visibility controller.
//!
//! Holds what the user has entered and selected. Section visibility and
//! submit enablement are derived from the selection on every read, so they
//! can never disagree with it.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use crate::common::{self, CommonKind};
use crate::ordered::OrderedMap;
use crate::render::{FormLayout, FormSection};

/// Name of the selection checkboxes in a posted form
pub const SELECTION_INPUT: &str = "doc";

/// Posted name of a per-document control
pub fn section_input_name(key: &str, field: &str) -> String {
    format!("doc[{}][{}]", key, field)
}

fn parse_section_input(name: &str) -> Option<(&str, &str)> {
    let inner = name.strip_prefix("doc[")?.strip_suffix(']')?;
    inner.split_once("][")
}

/// Form section visibility
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Active,
}

/// Kind of result shown under the form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultKind {
    Pending,
    Success,
    Failure,
}

/// Result panel content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultPanel {
    pub kind: ResultKind,
    pub text: String,
}

impl ResultPanel {
    pub fn pending() -> Self {
        Self { kind: ResultKind::Pending, text: "Webhookに送信中...".into() }
    }
}

/// User input and selection
#[derive(Clone, Debug)]
pub struct FormState {
    checked: HashSet<String>,
    common: OrderedMap<String>,
    values: HashMap<String, OrderedMap<String>>,
    result: Option<ResultPanel>,
}

impl FormState {
    /// Fresh state with the date field set to `today`
    pub fn new(today: NaiveDate) -> Self {
        let mut common = OrderedMap::new();
        for field in common::common_fields() {
            let value = match field.kind {
                CommonKind::Date => common::iso_date(today),
                CommonKind::Text => String::new(),
            };
            common.insert(field.name, value);
        }
        Self { checked: HashSet::new(), common, values: HashMap::new(), result: None }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn set_checked(&mut self, key: &str, checked: bool) {
        if checked {
            self.checked.insert(key.to_string());
        } else {
            self.checked.remove(key);
        }
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.checked.contains(key)
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    /// A section is active iff its checkbox is checked
    pub fn visibility(&self, key: &str) -> Visibility {
        if self.is_checked(key) {
            Visibility::Active
        } else {
            Visibility::Hidden
        }
    }

    /// Active sections in layout order
    pub fn active_sections<'a>(&self, layout: &'a FormLayout) -> Vec<&'a FormSection> {
        layout.sections.iter().filter(|s| self.is_checked(&s.key)).collect()
    }

    /// Enabled iff at least one document type is selected
    pub fn submit_enabled(&self) -> bool {
        !self.checked.is_empty()
    }

    // =========================================================================
    // Values
    // =========================================================================

    pub fn common_value(&self, name: &str) -> &str {
        self.common.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set_common(&mut self, name: &str, value: impl Into<String>) {
        self.common.insert(name, value.into());
    }

    pub fn value(&self, key: &str, field: &str) -> &str {
        self.values
            .get(key)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_value(&mut self, key: &str, field: &str, value: impl Into<String>) {
        self.values.entry(key.to_string()).or_default().insert(field, value.into());
    }

    /// Synchronize with a fully posted form.
    ///
    /// Unchecked checkboxes are absent from a post, so the selection is
    /// replaced rather than merged. Names unknown to the layout are ignored.
    pub fn apply_input(&mut self, layout: &FormLayout, pairs: &[(String, String)]) {
        self.checked.clear();
        for (name, value) in pairs {
            if name == SELECTION_INPUT {
                if layout.entry(value).is_some() {
                    self.checked.insert(value.clone());
                }
            } else if let Some((key, field)) = parse_section_input(name) {
                let known = layout
                    .section(key)
                    .is_some_and(|s| s.controls.iter().any(|c| c.name == field));
                if known {
                    self.set_value(key, field, value.clone());
                }
            } else if self.common.contains_key(name) {
                self.common.insert(name.as_str(), value.clone());
            }
        }
    }

    // =========================================================================
    // Result panel
    // =========================================================================

    pub fn result(&self) -> Option<&ResultPanel> {
        self.result.as_ref()
    }

    pub fn show_result(&mut self, panel: ResultPanel) {
        self.result = Some(panel);
    }

    /// Reset after a submission.
    ///
    /// Per-document text, date and textarea inputs are emptied, common text
    /// fields are kept, the date goes back to `today`, every selection is
    /// unchecked and the result panel is hidden.
    pub fn clear(&mut self, layout: &FormLayout, today: NaiveDate) {
        for section in &layout.sections {
            let Some(fields) = self.values.get_mut(&section.key) else { continue };
            for control in section.controls.iter().filter(|c| c.kind.resets_on_clear()) {
                if let Some(value) = fields.get_mut(&control.name) {
                    value.clear();
                }
            }
        }
        self.common.insert(common::DATE_FIELD, common::iso_date(today));
        self.checked.clear();
        self.result = None;
    }
}
