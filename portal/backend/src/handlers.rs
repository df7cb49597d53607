//! Request handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect},
    Form,
};
use chrono::Utc;
use docflow_forms::submit::{self, Precondition};
use docflow_forms::{EditBuffer, EditorAction, FormLayout, ResultPanel};
use handlebars::RenderError;

use crate::views::Notice;
use crate::{today, AppState};

/// Raw posted form: repeated keys and field order are preserved
type Posted = Form<Vec<(String, String)>>;

fn posted_action(pairs: &[(String, String)]) -> Option<&str> {
    pairs.iter().find(|(k, _)| k == "action").map(|(_, v)| v.as_str())
}

/// Rendered page, or 500 when a template fails
type Page = Result<Html<String>, StatusCode>;

fn page(rendered: Result<String, RenderError>) -> Page {
    rendered.map(Html).map_err(|e| {
        tracing::error!(error = %e, "page render failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn health() -> &'static str {
    "OK"
}

// Form tab

async fn render_form(state: &AppState, notices: &[Notice]) -> Page {
    let layout = state.layout.read().await;
    let form = state.form.lock().await;
    page(state.views.form_page(&layout, &form, state.gate.is_busy(), notices))
}

pub async fn form_page(State(state): State<AppState>) -> Page {
    render_form(&state, &[]).await
}

pub async fn form_action(State(state): State<AppState>, Form(pairs): Posted) -> Page {
    let layout = state.layout.read().await.clone();
    state.form.lock().await.apply_input(&layout, &pairs);

    let mut notices = Vec::new();
    match posted_action(&pairs).unwrap_or("select") {
        "submit" => {
            if let Some(notice) = submit_form(&state, &layout).await {
                notices.push(notice);
            }
        }
        "clear" => {
            state.form.lock().await.clear(&layout, today());
            tracing::debug!("form cleared");
        }
        _ => {}
    }
    render_form(&state, &notices).await
}

/// Run one submission. Returns a notice when the submission was refused
/// before reaching the network; delivery results go to the result panel.
async fn submit_form(state: &AppState, layout: &FormLayout) -> Option<Notice> {
    let Some(_permit) = state.gate.try_acquire() else {
        return Some(Notice::error(Precondition::Busy.notice()));
    };

    let (url, payload) = {
        let store = state.store.read().await;
        let form = state.form.lock().await;
        match submit::prepare(layout, &form, &store, Utc::now()) {
            Ok(payload) => (store.webhook().url.clone(), payload),
            Err(e) => {
                tracing::info!(reason = %e, "submission refused");
                return Some(Notice::error(e.to_string()));
            }
        }
    };

    state.form.lock().await.show_result(ResultPanel::pending());
    let outcome = state.client.deliver(&url, payload).await;
    state.form.lock().await.show_result(ResultPanel::from(&outcome));
    None
}

pub async fn reload(State(state): State<AppState>) -> Redirect {
    state.reload().await;
    Redirect::to("/")
}

// Settings tab

pub async fn settings_page(State(state): State<AppState>) -> Page {
    let buffer = EditBuffer::open(&*state.store.read().await);
    let rendered = state.views.settings_page(&buffer, &[], false);
    *state.editor.lock().await = Some(buffer);
    page(rendered)
}

pub async fn settings_action(State(state): State<AppState>, Form(pairs): Posted) -> Page {
    let mut editor = state.editor.lock().await;
    let mut buffer = match editor.take() {
        Some(buffer) => buffer,
        None => EditBuffer::open(&*state.store.read().await),
    };
    buffer.apply_form(&pairs);

    let mut notices = Vec::new();
    let mut export = false;
    match posted_action(&pairs).unwrap_or_default().parse::<EditorAction>() {
        Ok(EditorAction::AddDocumentType) => {
            buffer.add_document_type();
        }
        Ok(EditorAction::RemoveDocumentType(i)) => {
            if let Some(removed) = buffer.remove_document_type(i) {
                tracing::debug!(key = %removed.key, "document type removed from editor");
            }
        }
        Ok(EditorAction::AddField(i)) => {
            buffer.add_field(i);
        }
        Ok(EditorAction::RemoveField(i, j)) => {
            buffer.remove_field(i, j);
        }
        Ok(EditorAction::SaveDocumentTypes) => {
            let report = buffer.commit_document_types();
            report.apply(&mut *state.store.write().await);
            tracing::info!(
                document_types = report.document_types.len(),
                dropped = report.dropped.len(),
                "document types saved"
            );
            notices.push(Notice::success("書類タイプを保存しました。ページを再読み込みして反映してください。"));
            if let Some(warning) = report.warning() {
                notices.push(Notice::warning(warning));
            }
            export = true;
        }
        Ok(EditorAction::SaveWebhook) => {
            state.store.write().await.update_webhook(buffer.commit_webhook());
            tracing::info!(configured = buffer.webhook().is_configured(), "webhook settings saved");
            notices.push(Notice::success("Webhook設定を保存しました。"));
            export = true;
        }
        Err(e) => {
            tracing::warn!(error = %e, "unknown settings action");
            notices.push(Notice::error("不明な操作です。"));
        }
    }

    let rendered = state.views.settings_page(&buffer, &notices, export);
    *editor = Some(buffer);
    page(rendered)
}

pub async fn export_config(State(state): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let json = state.store.read().await.export().map_err(|e| {
        tracing::error!(error = %e, "configuration export failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"config.json\""),
        ],
        json,
    ))
}
