//! Data collection from the current form state.
//!
//! Both passes are pure reads; nothing is cached between submissions.

use chrono::{DateTime, Utc};

use crate::common::{self, CommonKind};
use crate::config::ConfigStore;
use crate::ordered::OrderedMap;
use crate::payload::{DocumentSubmission, SubmissionPayload};
use crate::render::FormLayout;
use crate::state::FormState;

/// Read every common field. Dates yield the localized string plus the raw
/// value under `<name>_raw`.
pub fn collect_common(state: &FormState) -> OrderedMap<String> {
    let mut data = OrderedMap::new();
    for field in common::common_fields() {
        let value = state.common_value(field.name);
        match field.kind {
            CommonKind::Date => {
                data.insert(field.name, common::format_japanese_date(value));
                data.insert(format!("{}{}", field.name, common::RAW_SUFFIX), value.to_string());
            }
            CommonKind::Text => {
                data.insert(field.name, value.to_string());
            }
        }
    }
    data
}

/// Capture every control of each active section, verbatim.
///
/// Selections whose document type is gone from the live store are skipped.
pub fn collect_documents(layout: &FormLayout, state: &FormState, store: &ConfigStore) -> Vec<DocumentSubmission> {
    let mut documents = Vec::new();
    for entry in layout.entries.iter().filter(|e| state.is_checked(&e.key)) {
        let Some(config) = store.document_type(&entry.key) else {
            tracing::warn!(key = %entry.key, "selected document type no longer configured, skipping");
            continue;
        };
        let Some(section) = layout.section(&entry.key) else {
            continue;
        };

        let data = section
            .controls
            .iter()
            .map(|control| (control.name.as_str(), state.value(&entry.key, &control.name).to_string()))
            .collect();

        documents.push(DocumentSubmission {
            doc_type: entry.key.clone(),
            name: config.name.clone(),
            config: config.clone(),
            data,
        });
    }
    documents
}

/// Assemble the full payload at `now`
pub fn build_payload(
    layout: &FormLayout,
    state: &FormState,
    store: &ConfigStore,
    now: DateTime<Utc>,
) -> SubmissionPayload {
    SubmissionPayload::new(
        store.webhook().token.clone(),
        now,
        collect_common(state),
        collect_documents(layout, state, store),
    )
}
