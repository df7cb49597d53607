//! CLI Commands

pub mod check;
pub mod export;
pub mod init;
pub mod prefs;
pub mod show;

/// Mask an opaque secret for display
pub fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".into();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}
