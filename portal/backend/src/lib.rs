//! docflow Portal
//!
//! Rust/Axum server for the document form portal: the "form" tab renders
//! the configured document types and forwards submissions to the webhook,
//! the "settings" tab edits and exports the configuration.

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use docflow_forms::{ConfigStore, EditBuffer, FormLayout, FormState, SubmitGate, WebhookClient};
use handlebars::TemplateError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod views;

use views::Views;

/// Shared portal state.
///
/// The layout is a snapshot of the store taken at load time; saving in the
/// editor changes the store but not the layout until [`AppState::reload`].
#[derive(Clone)]
pub struct AppState {
    pub config_path: Arc<PathBuf>,
    pub store: Arc<RwLock<ConfigStore>>,
    pub layout: Arc<RwLock<FormLayout>>,
    pub form: Arc<Mutex<FormState>>,
    pub editor: Arc<Mutex<Option<EditBuffer>>>,
    pub client: WebhookClient,
    pub gate: SubmitGate,
    pub views: Arc<Views>,
}

impl AppState {
    /// Load the configuration resource, build the initial layout and
    /// register the page templates
    pub fn load(config_path: impl AsRef<Path>, client: WebhookClient) -> Result<Self, TemplateError> {
        let views = Views::new()?;
        let config_path = config_path.as_ref().to_path_buf();
        let store = ConfigStore::load(&config_path);
        for issue in store.issues() {
            tracing::warn!(%issue, "configuration issue");
        }
        let layout = FormLayout::build(&store);

        Ok(Self {
            config_path: Arc::new(config_path),
            store: Arc::new(RwLock::new(store)),
            layout: Arc::new(RwLock::new(layout)),
            form: Arc::new(Mutex::new(FormState::new(today()))),
            editor: Arc::new(Mutex::new(None)),
            client,
            gate: SubmitGate::new(),
            views: Arc::new(views),
        })
    }

    /// Re-read the configuration resource and regenerate everything derived
    /// from it. In-progress input is discarded.
    pub async fn reload(&self) {
        let store = ConfigStore::load(self.config_path.as_path());
        let layout = FormLayout::build(&store);
        *self.store.write().await = store;
        *self.layout.write().await = layout;
        *self.form.lock().await = FormState::new(today());
        *self.editor.lock().await = None;
        tracing::info!(path = %self.config_path.display(), "configuration reloaded");
    }
}

/// Local calendar date used for the date field default
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Build the portal router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Form tab
        .route("/", get(handlers::form_page))
        .route("/form", post(handlers::form_action))
        .route("/reload", post(handlers::reload))
        // Settings tab
        .route("/settings", get(handlers::settings_page).post(handlers::settings_action))
        .route("/settings/export", get(handlers::export_config))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
