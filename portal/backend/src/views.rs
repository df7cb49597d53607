//! HTML views
//!
//! Pages are handlebars templates rendered on every request from view
//! models built out of the layout, the form state and the editor buffer.
//! Values interpolated with `{{ }}` are HTML-escaped by the engine.

use docflow_forms::common::{CommonKind, COMMON_GROUPS};
use docflow_forms::editor::{self, EditorAction, WEBHOOK_TOKEN_INPUT, WEBHOOK_URL_INPUT};
use docflow_forms::state::{section_input_name, SELECTION_INPUT};
use docflow_forms::{ControlKind, EditBuffer, FieldType, FormLayout, FormState, ResultKind, Visibility};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

const PAGE_TEMPLATE: &str = include_str!("../templates/page.hbs");
const FORM_TEMPLATE: &str = include_str!("../templates/form.hbs");
const SETTINGS_TEMPLATE: &str = include_str!("../templates/settings.hbs");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Banner shown above the active view
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

// =============================================================================
// View models
// =============================================================================

#[derive(Serialize)]
struct PageView<'a> {
    form_tab: bool,
    notices: &'a [Notice],
    body: String,
}

#[derive(Serialize)]
struct EntryView<'a> {
    checkbox_id: &'a str,
    input: &'static str,
    key: &'a str,
    form_id: &'a str,
    name: &'a str,
    checked: bool,
}

#[derive(Serialize)]
struct CommonFieldView<'a> {
    name: &'static str,
    label: &'static str,
    input_type: &'static str,
    value: &'a str,
    placeholder: &'static str,
}

#[derive(Serialize)]
struct CommonGroupView<'a> {
    heading: Option<&'static str>,
    fields: Vec<CommonFieldView<'a>>,
}

#[derive(Serialize)]
struct ControlView<'a> {
    id: String,
    input_name: String,
    label: &'a str,
    textarea: bool,
    input_type: &'a str,
    placeholder: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SectionView<'a> {
    form_id: &'a str,
    heading: &'a str,
    active: bool,
    controls: Vec<ControlView<'a>>,
}

#[derive(Serialize)]
struct ResultView<'a> {
    kind: &'static str,
    text: &'a str,
    clearable: bool,
}

#[derive(Serialize)]
struct FormView<'a> {
    entries: Vec<EntryView<'a>>,
    groups: Vec<CommonGroupView<'a>>,
    sections: Vec<SectionView<'a>>,
    submit_disabled: bool,
    submit_label: &'static str,
    result: Option<ResultView<'a>>,
}

impl<'a> FormView<'a> {
    fn new(layout: &'a FormLayout, state: &'a FormState, submitting: bool) -> Self {
        let entries = layout
            .entries
            .iter()
            .map(|entry| EntryView {
                checkbox_id: &entry.checkbox_id,
                input: SELECTION_INPUT,
                key: &entry.key,
                form_id: &entry.form_id,
                name: &entry.name,
                checked: state.is_checked(&entry.key),
            })
            .collect();

        let groups = COMMON_GROUPS
            .iter()
            .map(|group| CommonGroupView {
                heading: group.heading,
                fields: group
                    .fields
                    .iter()
                    .map(|field| CommonFieldView {
                        name: field.name,
                        label: field.label,
                        input_type: match field.kind {
                            CommonKind::Date => "date",
                            CommonKind::Text => "text",
                        },
                        value: state.common_value(field.name),
                        placeholder: field.placeholder,
                    })
                    .collect(),
            })
            .collect();

        let sections = layout
            .sections
            .iter()
            .map(|section| SectionView {
                form_id: &section.form_id,
                heading: &section.heading,
                active: state.visibility(&section.key) == Visibility::Active,
                controls: section
                    .controls
                    .iter()
                    .map(|control| ControlView {
                        id: format!("{}-{}", section.form_id, control.name),
                        input_name: section_input_name(&section.key, &control.name),
                        label: &control.label,
                        textarea: control.kind == ControlKind::TextArea,
                        input_type: match &control.kind {
                            ControlKind::TextArea => "",
                            ControlKind::Input(ty) => ty.as_str(),
                        },
                        placeholder: &control.placeholder,
                        value: state.value(&section.key, &control.name),
                    })
                    .collect(),
            })
            .collect();

        let result = state.result().map(|panel| ResultView {
            kind: match panel.kind {
                ResultKind::Pending => "pending",
                ResultKind::Success => "success",
                ResultKind::Failure => "failure",
            },
            text: &panel.text,
            clearable: panel.kind == ResultKind::Success,
        });

        Self {
            entries,
            groups,
            sections,
            submit_disabled: !state.submit_enabled() || submitting,
            submit_label: if submitting { "送信中..." } else { "Webhookに送信" },
            result,
        }
    }
}

#[derive(Serialize)]
struct OptionView {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Serialize)]
struct FieldRowView<'a> {
    name: &'a str,
    name_input: String,
    label: &'a str,
    label_input: String,
    type_input: String,
    options: Vec<OptionView>,
    placeholder: &'a str,
    placeholder_input: String,
    remove: String,
}

#[derive(Serialize)]
struct DocumentBlockView<'a> {
    key: &'a str,
    name: &'a str,
    name_input: String,
    form_id: &'a str,
    form_id_input: String,
    fields: Vec<FieldRowView<'a>>,
    add_field: String,
    remove: String,
    confirm: String,
}

#[derive(Serialize)]
struct WebhookView<'a> {
    url: &'a str,
    url_input: &'static str,
    token: &'a str,
    token_input: &'static str,
    save: String,
}

#[derive(Serialize)]
struct SettingsView<'a> {
    webhook: WebhookView<'a>,
    documents: Vec<DocumentBlockView<'a>>,
    add_document: String,
    save_documents: String,
    export: bool,
}

/// Editor choices plus any other configured type, kept selectable
fn field_type_options(current: &FieldType) -> Vec<OptionView> {
    let mut options: Vec<OptionView> = [("text", "テキスト"), ("textarea", "テキストエリア")]
        .into_iter()
        .map(|(value, label)| OptionView {
            value: value.to_string(),
            label: label.to_string(),
            selected: current.as_str() == value,
        })
        .collect();
    if let FieldType::Input(other) = current {
        options.push(OptionView { value: other.clone(), label: other.clone(), selected: true });
    }
    options
}

impl<'a> SettingsView<'a> {
    fn new(buffer: &'a EditBuffer, export: bool) -> Self {
        let webhook = buffer.webhook();
        let documents = buffer
            .documents()
            .iter()
            .enumerate()
            .map(|(i, doc)| DocumentBlockView {
                key: &doc.key,
                name: &doc.name,
                name_input: editor::document_input_name(i, "name"),
                form_id: &doc.form_id,
                form_id_input: editor::document_input_name(i, "formId"),
                fields: doc
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(j, field)| FieldRowView {
                        name: &field.name,
                        name_input: editor::field_input_name(i, j, "name"),
                        label: &field.label,
                        label_input: editor::field_input_name(i, j, "label"),
                        type_input: editor::field_input_name(i, j, "type"),
                        options: field_type_options(&field.field_type),
                        placeholder: &field.placeholder,
                        placeholder_input: editor::field_input_name(i, j, "placeholder"),
                        remove: EditorAction::RemoveField(i, j).to_string(),
                    })
                    .collect(),
                add_field: EditorAction::AddField(i).to_string(),
                remove: EditorAction::RemoveDocumentType(i).to_string(),
                confirm: format!("「{}」を削除しますか？", doc.name),
            })
            .collect();

        Self {
            webhook: WebhookView {
                url: &webhook.url,
                url_input: WEBHOOK_URL_INPUT,
                token: &webhook.token,
                token_input: WEBHOOK_TOKEN_INPUT,
                save: EditorAction::SaveWebhook.to_string(),
            },
            documents,
            add_document: EditorAction::AddDocumentType.to_string(),
            save_documents: EditorAction::SaveDocumentTypes.to_string(),
            export,
        }
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Registered page templates
pub struct Views {
    handlebars: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut hb = Handlebars::new();
        hb.register_template_string("page", PAGE_TEMPLATE)?;
        hb.register_template_string("form", FORM_TEMPLATE)?;
        hb.register_template_string("settings", SETTINGS_TEMPLATE)?;
        Ok(Self { handlebars: hb })
    }

    fn page(&self, form_tab: bool, notices: &[Notice], body: String) -> Result<String, RenderError> {
        self.handlebars.render("page", &PageView { form_tab, notices, body })
    }

    /// The "form" tab: selection, common section, document sections, result
    pub fn form_page(
        &self,
        layout: &FormLayout,
        state: &FormState,
        submitting: bool,
        notices: &[Notice],
    ) -> Result<String, RenderError> {
        let body = self.handlebars.render("form", &FormView::new(layout, state, submitting))?;
        self.page(true, notices, body)
    }

    /// The "settings" tab. With `export` set the page triggers the
    /// configuration download on load.
    pub fn settings_page(&self, buffer: &EditBuffer, notices: &[Notice], export: bool) -> Result<String, RenderError> {
        let body = self.handlebars.render("settings", &SettingsView::new(buffer, export))?;
        self.page(false, notices, body)
    }
}
