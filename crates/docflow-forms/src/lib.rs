//! docflow Forms
//!
//! Schema-driven document forms: a configuration of document types is
//! projected into selectable form sections, user input is collected into a
//! submission payload and forwarded to a webhook.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │  ConfigStore     │───▶│  FormLayout  │───▶│  FormState       │
//! │  (config.json)   │    │  (render)    │    │  (visibility)    │
//! └──────────────────┘    └──────────────┘    └──────────────────┘
//!          ▲                                           │
//!          │                                           ▼
//! ┌──────────────────┐                        ┌──────────────────┐
//! │  EditBuffer      │                        │  collect         │
//! │  (settings tab)  │                        │  + WebhookClient │
//! └──────────────────┘                        └──────────────────┘
//! ```
//!
//! The store is the single source of truth. The layout is rebuilt from it
//! on load only; the editor commits into the store and exports, it never
//! touches the layout.

pub mod collect;
pub mod common;
pub mod config;
pub mod editor;
pub mod error;
pub mod ordered;
pub mod payload;
pub mod render;
pub mod state;
pub mod submit;

pub use config::{ConfigIssue, ConfigStore, DocumentType, Field, FieldType, Settings, WebhookConfig};
pub use editor::{CommitReport, DroppedRow, EditBuffer, EditorAction};
pub use error::{FormsError, Result};
pub use ordered::OrderedMap;
pub use payload::{DocumentSubmission, SubmissionPayload};
pub use render::{Control, ControlKind, FormLayout, FormSection, SelectionEntry};
pub use state::{FormState, ResultKind, ResultPanel, Visibility};
pub use submit::{Precondition, SubmissionOutcome, SubmitGate, SubmitPermit, WebhookClient};
