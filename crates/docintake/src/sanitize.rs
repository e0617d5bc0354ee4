//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Logs are shared with operators; uploads belong to employees. These
//! functions keep full paths and complete user ids out of spans.

use std::path::Path;

use uuid::Uuid;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Keeps the first UUID group for correlation: `123e4567-****`.
pub fn redact_user_id(user_id: &Uuid) -> String {
    let hyphenated = user_id.hyphenated().to_string();
    let prefix = hyphenated.split('-').next().unwrap_or_default();
    format!("{}-****", prefix)
}
