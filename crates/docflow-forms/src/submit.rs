//! Submission client
//!
//! Precondition checks, the single-flight gate and the webhook POST.

use chrono::{DateTime, Local, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::collect;
use crate::config::ConfigStore;
use crate::error::{FormsError, Result};
use crate::payload::SubmissionPayload;
use crate::render::FormLayout;
use crate::state::{FormState, ResultKind, ResultPanel};

/// Reason a submission is refused before any network call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precondition {
    WebhookUnconfigured,
    NothingSelected,
    /// Another submission is still in flight
    Busy,
}

impl Precondition {
    /// User-facing notice
    pub fn notice(&self) -> &'static str {
        match self {
            Self::WebhookUnconfigured => "Webhook URLが設定されていません。設定タブで設定してください。",
            Self::NothingSelected => "書類を選択してください。",
            Self::Busy => "送信中です。完了するまでお待ちください。",
        }
    }
}

/// Check preconditions in order and assemble the payload.
///
/// The webhook URL is checked first; the selection is checked on the
/// collected documents, so selections removed from the store count as
/// unselected.
pub fn prepare(
    layout: &FormLayout,
    state: &FormState,
    store: &ConfigStore,
    now: DateTime<Utc>,
) -> Result<SubmissionPayload> {
    if !store.webhook().is_configured() {
        return Err(FormsError::Precondition(Precondition::WebhookUnconfigured));
    }
    let payload = collect::build_payload(layout, state, store, now);
    if payload.documents.is_empty() {
        return Err(FormsError::Precondition(Precondition::NothingSelected));
    }
    Ok(payload)
}

// =============================================================================
// Single-flight gate
// =============================================================================

/// Allows at most one submission in flight
#[derive(Clone, Debug, Default)]
pub struct SubmitGate {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of one submission; releases the gate on drop
#[derive(Debug)]
pub struct SubmitPermit {
    busy: Arc<AtomicBool>,
}

impl SubmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<SubmitPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitPermit { busy: Arc::clone(&self.busy) })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SubmitPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of one delivery attempt
#[derive(Clone, Debug)]
pub enum SubmissionOutcome {
    Delivered {
        payload: SubmissionPayload,
        response: serde_json::Value,
        at: DateTime<Local>,
    },
    Failed {
        payload: SubmissionPayload,
        error: String,
    },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn payload(&self) -> &SubmissionPayload {
        match self {
            Self::Delivered { payload, .. } | Self::Failed { payload, .. } => payload,
        }
    }

    /// Text shown in the result panel
    pub fn summary(&self) -> String {
        match self {
            Self::Delivered { payload, response, at } => format!(
                "✅ 送信成功\n\n送信時刻: {}\n選択された書類: {}\n\nレスポンス:\n{}",
                at.format("%Y/%-m/%-d %-H:%M:%S"),
                payload.document_names().join(", "),
                serde_json::to_string_pretty(response).unwrap_or_default(),
            ),
            Self::Failed { payload, error } => format!(
                "❌ 送信エラー\n\nエラー内容: {}\n\n送信データ:\n{}",
                error,
                payload.to_pretty_json(),
            ),
        }
    }
}

impl From<&SubmissionOutcome> for ResultPanel {
    fn from(outcome: &SubmissionOutcome) -> Self {
        let kind = if outcome.is_success() { ResultKind::Success } else { ResultKind::Failure };
        Self { kind, text: outcome.summary() }
    }
}

/// Acknowledgement substituted for an empty or non-JSON 2xx body
pub fn default_acknowledgement() -> serde_json::Value {
    json!({ "message": "送信成功" })
}

// =============================================================================
// Client
// =============================================================================

/// Webhook HTTP client. No client-side timeout is applied.
#[derive(Clone, Debug)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// POST the payload as JSON and return the parsed response body
    pub async fn post(&self, url: &str, payload: &SubmissionPayload) -> Result<serde_json::Value> {
        let resp = self.client.post(url).json(payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FormsError::Status(status.as_u16()));
        }

        // A 2xx is a success even when its body cannot be read or parsed
        let response = resp
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice(&body).ok())
            .unwrap_or_else(default_acknowledgement);
        Ok(response)
    }

    /// Deliver and fold every failure into the outcome
    pub async fn deliver(&self, url: &str, payload: SubmissionPayload) -> SubmissionOutcome {
        let documents = payload.documents.len();
        match self.post(url, &payload).await {
            Ok(response) => {
                tracing::info!(documents, "submission delivered");
                SubmissionOutcome::Delivered { payload, response, at: Local::now() }
            }
            Err(e) => {
                tracing::error!(documents, error = %e, "submission failed");
                SubmissionOutcome::Failed { payload, error: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentType, Field, WebhookConfig};
    use chrono::NaiveDate;

    fn fixture(url: &str) -> (ConfigStore, FormLayout, FormState) {
        let mut store = ConfigStore::default();
        store.add_document_type("contract", DocumentType::new("契約書", "contract-form").with_field(Field::text("amount", "金額")));
        store.update_webhook(WebhookConfig::new(url, "tok"));
        let layout = FormLayout::build(&store);
        let state = FormState::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        (store, layout, state)
    }

    #[test]
    fn test_unconfigured_webhook_checked_first() {
        let (store, layout, state) = fixture("");
        let err = prepare(&layout, &state, &store, Utc::now()).unwrap_err();
        assert!(matches!(err, FormsError::Precondition(Precondition::WebhookUnconfigured)));
        assert_eq!(err.to_string(), "Webhook URLが設定されていません。設定タブで設定してください。");
    }

    #[test]
    fn test_nothing_selected() {
        let (store, layout, state) = fixture("https://hooks.example.com");
        let err = prepare(&layout, &state, &store, Utc::now()).unwrap_err();
        assert!(matches!(err, FormsError::Precondition(Precondition::NothingSelected)));
    }

    #[test]
    fn test_selection_removed_from_store_counts_as_nothing_selected() {
        let (mut store, layout, mut state) = fixture("https://hooks.example.com");
        state.set_checked("contract", true);
        store.remove_document_type("contract");
        let err = prepare(&layout, &state, &store, Utc::now()).unwrap_err();
        assert!(matches!(err, FormsError::Precondition(Precondition::NothingSelected)));
    }

    #[test]
    fn test_gate_allows_one_in_flight() {
        let gate = SubmitGate::new();
        let permit = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_failure_summary_dumps_payload() {
        let (store, layout, mut state) = fixture("https://hooks.example.com");
        state.set_checked("contract", true);
        state.set_value("contract", "amount", "500");
        let payload = prepare(&layout, &state, &store, Utc::now()).unwrap();
        let outcome = SubmissionOutcome::Failed { payload, error: "HTTP error! status: 500".into() };

        let panel = ResultPanel::from(&outcome);
        assert_eq!(panel.kind, ResultKind::Failure);
        assert!(panel.text.starts_with("❌ 送信エラー"));
        assert!(panel.text.contains("エラー内容: HTTP error! status: 500"));
        assert!(panel.text.contains("\"amount\": \"500\""));
    }
}
