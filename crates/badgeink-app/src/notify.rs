//! User-facing notifications for export results.

use serde::Serialize;

use crate::export::{ExportError, ExportOutcome, ShareResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A short toast: title plus one line of detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    fn new(level: NotificationLevel, title: &str, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.into(),
        }
    }

    /// Toast for an export outcome.
    pub fn for_outcome(outcome: &ExportOutcome) -> Self {
        use NotificationLevel::*;

        match outcome {
            ExportOutcome::NotReady => Self::new(
                Info,
                "Image not ready",
                "Wait for the photo and badge to finish loading.",
            ),
            ExportOutcome::Shared { .. } => {
                Self::new(Success, "Shared successfully!", "Image shared to your selected app")
            }
            ExportOutcome::Downloaded {
                share_fallback: Some(ShareResult::Failed(_)),
                filename,
                ..
            } => Self::new(
                Warning,
                "Sharing failed",
                format!("Unable to share. {} was downloaded instead.", filename),
            ),
            ExportOutcome::Downloaded { location, .. } => {
                Self::new(Success, "Image downloaded!", format!("Check {}", location))
            }
            ExportOutcome::Failed {
                error: ExportError::Encode(message),
            } => Self::new(Error, "Couldn't create image", message.clone()),
            ExportOutcome::Failed { error } => Self::new(Error, "Download failed", error.to_string()),
        }
    }
}
