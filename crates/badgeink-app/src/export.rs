//! Exporting the composite: share when the platform can, download otherwise.

use badgeink_core::BoxFuture;
use badgeink_render::RenderError;
use serde::Serialize;
use thiserror::Error;

use crate::editor::BadgeEditor;
use crate::notify::Notification;

/// MIME type of every exported file.
pub const PNG_MIME: &str = "image/png";

/// Export errors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum ExportError {
    #[error("The image is still loading")]
    NotReady,
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Download failed: {0}")]
    Download(String),
}

impl From<RenderError> for ExportError {
    fn from(err: RenderError) -> Self {
        ExportError::Encode(err.to_string())
    }
}

/// An encoded composite ready to hand to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportFile {
    pub fn png(filename: String, bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            filename,
            mime_type: PNG_MIME,
            bytes,
            width,
            height,
        }
    }
}

/// File plus the title and text offered to a share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub file: ExportFile,
    pub title: String,
    pub text: String,
}

/// How a share attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum ShareResult {
    Shared,
    /// The user dismissed the share sheet.
    Declined,
    /// The platform cannot share this file.
    Unsupported,
    Failed(String),
}

/// A platform share facility.
pub trait ShareTarget {
    /// Whether `file` can be shared at all.
    fn can_share(&self, file: &ExportFile) -> bool;

    /// Offer the file to the user.
    fn share<'a>(&'a self, request: &'a ExportRequest) -> BoxFuture<'a, ShareResult>;
}

/// A platform download facility.
pub trait DownloadTarget {
    /// Save the file and describe where it went.
    fn download(&self, file: &ExportFile) -> Result<String, ExportError>;
}

/// Result of one export action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// The composite was not ready. Nothing was shared or saved.
    NotReady,
    Shared {
        filename: String,
    },
    Downloaded {
        filename: String,
        location: String,
        /// Why sharing was skipped, when sharing was attempted or requested.
        share_fallback: Option<ShareResult>,
    },
    Failed {
        error: ExportError,
    },
}

impl ExportOutcome {
    pub(crate) fn from_error(error: ExportError) -> Self {
        match error {
            ExportError::NotReady => {
                log::info!("Export refused, composite not ready");
                ExportOutcome::NotReady
            }
            error => {
                log::error!("Export failed: {}", error);
                ExportOutcome::Failed { error }
            }
        }
    }

    /// Whether the composite reached the user.
    pub fn is_success(&self) -> bool {
        matches!(self, ExportOutcome::Shared { .. } | ExportOutcome::Downloaded { .. })
    }

    /// User-facing notification for this outcome.
    pub fn notification(&self) -> Notification {
        Notification::for_outcome(self)
    }
}

/// Runs share and download actions against platform targets.
pub struct ExportService<'a> {
    share: Option<&'a dyn ShareTarget>,
    download: &'a dyn DownloadTarget,
}

impl<'a> ExportService<'a> {
    /// Service that can only download.
    pub fn new(download: &'a dyn DownloadTarget) -> Self {
        Self {
            share: None,
            download,
        }
    }

    /// Add a share facility, tried before downloading.
    pub fn with_share(mut self, share: &'a dyn ShareTarget) -> Self {
        self.share = Some(share);
        self
    }

    /// Share the composite, falling back to a download.
    pub async fn share(&self, editor: &BadgeEditor) -> ExportOutcome {
        match editor.export_request() {
            Ok(request) => self.deliver(request).await,
            Err(error) => ExportOutcome::from_error(error),
        }
    }

    /// Download the composite without offering to share.
    pub fn download(&self, editor: &BadgeEditor) -> ExportOutcome {
        match editor.export_request() {
            Ok(request) => self.save(&request.file, None),
            Err(error) => ExportOutcome::from_error(error),
        }
    }

    /// Share a prepared request, falling back to a download.
    ///
    /// Split out so hosts can encode under a short borrow of the editor and
    /// await the share sheet afterwards.
    pub async fn deliver(&self, request: ExportRequest) -> ExportOutcome {
        let result = match self.share {
            Some(share) if share.can_share(&request.file) => share.share(&request).await,
            _ => ShareResult::Unsupported,
        };
        if result == ShareResult::Shared {
            log::info!("Shared {}", request.file.filename);
            return ExportOutcome::Shared {
                filename: request.file.filename,
            };
        }
        log::warn!("Share did not complete ({:?}), downloading instead", result);
        self.save(&request.file, Some(result))
    }

    fn save(&self, file: &ExportFile, share_fallback: Option<ShareResult>) -> ExportOutcome {
        match self.download.download(file) {
            Ok(location) => {
                log::info!("Saved {} ({} bytes) to {}", file.filename, file.bytes.len(), location);
                ExportOutcome::Downloaded {
                    filename: file.filename.clone(),
                    location,
                    share_fallback,
                }
            }
            Err(error) => {
                log::error!("Export failed: {}", error);
                ExportOutcome::Failed { error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::tests::ready_editor;
    use badgeink_core::EditorConfig;
    use std::cell::{Cell, RefCell};

    struct FakeShare {
        supported: bool,
        result: ShareResult,
        calls: Cell<usize>,
        last_text: RefCell<Option<String>>,
    }

    impl FakeShare {
        fn new(supported: bool, result: ShareResult) -> Self {
            Self {
                supported,
                result,
                calls: Cell::new(0),
                last_text: RefCell::new(None),
            }
        }
    }

    impl ShareTarget for FakeShare {
        fn can_share(&self, file: &ExportFile) -> bool {
            self.supported && file.mime_type == PNG_MIME
        }

        fn share<'a>(&'a self, request: &'a ExportRequest) -> BoxFuture<'a, ShareResult> {
            self.calls.set(self.calls.get() + 1);
            *self.last_text.borrow_mut() = Some(request.text.clone());
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    #[derive(Default)]
    struct FakeDownload {
        saved: RefCell<Vec<(String, &'static str, usize)>>,
        fail: bool,
    }

    impl DownloadTarget for FakeDownload {
        fn download(&self, file: &ExportFile) -> Result<String, ExportError> {
            if self.fail {
                return Err(ExportError::Download("disk full".to_string()));
            }
            self.saved
                .borrow_mut()
                .push((file.filename.clone(), file.mime_type, file.bytes.len()));
            Ok("downloads".to_string())
        }
    }

    #[test]
    fn test_not_ready_has_no_side_effects() {
        let editor = BadgeEditor::new(EditorConfig::default()).unwrap();
        let share = FakeShare::new(true, ShareResult::Shared);
        let download = FakeDownload::default();
        let service = ExportService::new(&download).with_share(&share);

        assert_eq!(pollster::block_on(service.share(&editor)), ExportOutcome::NotReady);
        assert_eq!(service.download(&editor), ExportOutcome::NotReady);
        assert_eq!(share.calls.get(), 0);
        assert!(download.saved.borrow().is_empty());
    }

    #[test]
    fn test_share_success_skips_download() {
        let editor = ready_editor();
        let share = FakeShare::new(true, ShareResult::Shared);
        let download = FakeDownload::default();
        let service = ExportService::new(&download).with_share(&share);

        let outcome = pollster::block_on(service.share(&editor));

        assert_eq!(
            outcome,
            ExportOutcome::Shared {
                filename: "Cafe-badge.png".to_string()
            }
        );
        assert_eq!(share.last_text.borrow().as_deref(), Some("Check out Cafe!"));
        assert!(download.saved.borrow().is_empty());
    }

    #[test]
    fn test_no_share_target_downloads_png() {
        let editor = ready_editor();
        let download = FakeDownload::default();
        let service = ExportService::new(&download);

        let outcome = pollster::block_on(service.share(&editor));

        assert!(outcome.is_success());
        let saved = download.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "Cafe-badge.png");
        assert_eq!(saved[0].1, "image/png");
        assert!(saved[0].2 > 0);
        assert!(matches!(
            outcome,
            ExportOutcome::Downloaded {
                share_fallback: Some(ShareResult::Unsupported),
                ..
            }
        ));
    }

    #[test]
    fn test_unsupported_file_not_offered() {
        let editor = ready_editor();
        let share = FakeShare::new(false, ShareResult::Shared);
        let download = FakeDownload::default();
        let service = ExportService::new(&download).with_share(&share);

        pollster::block_on(service.share(&editor));

        assert_eq!(share.calls.get(), 0);
        assert_eq!(download.saved.borrow().len(), 1);
    }

    #[test]
    fn test_share_failure_falls_back() {
        let editor = ready_editor();
        let share = FakeShare::new(true, ShareResult::Failed("permission denied".into()));
        let download = FakeDownload::default();
        let service = ExportService::new(&download).with_share(&share);

        let outcome = pollster::block_on(service.share(&editor));

        assert_eq!(share.calls.get(), 1);
        assert_eq!(
            outcome,
            ExportOutcome::Downloaded {
                filename: "Cafe-badge.png".to_string(),
                location: "downloads".to_string(),
                share_fallback: Some(ShareResult::Failed("permission denied".into())),
            }
        );
    }

    #[test]
    fn test_declined_share_falls_back() {
        let editor = ready_editor();
        let share = FakeShare::new(true, ShareResult::Declined);
        let download = FakeDownload::default();
        let service = ExportService::new(&download).with_share(&share);

        let outcome = pollster::block_on(service.share(&editor));

        assert!(outcome.is_success());
        assert_eq!(download.saved.borrow().len(), 1);
    }

    #[test]
    fn test_direct_download_never_shares() {
        let editor = ready_editor();
        let share = FakeShare::new(true, ShareResult::Shared);
        let download = FakeDownload::default();
        let service = ExportService::new(&download).with_share(&share);

        let outcome = service.download(&editor);

        assert_eq!(share.calls.get(), 0);
        assert!(matches!(
            outcome,
            ExportOutcome::Downloaded {
                share_fallback: None,
                ..
            }
        ));
    }

    #[test]
    fn test_download_error_reported() {
        let editor = ready_editor();
        let download = FakeDownload {
            fail: true,
            ..FakeDownload::default()
        };
        let service = ExportService::new(&download);

        let outcome = service.download(&editor);

        assert!(!outcome.is_success());
        assert!(matches!(
            outcome,
            ExportOutcome::Failed {
                error: ExportError::Download(_)
            }
        ));
    }

    #[test]
    fn test_outcome_serializes_with_status() {
        let outcome = ExportOutcome::Shared {
            filename: "a-badge.png".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "shared");
        assert_eq!(json["filename"], "a-badge.png");
    }
}
