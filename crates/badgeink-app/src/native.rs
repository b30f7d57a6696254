//! Native share and download targets.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use arboard::{Clipboard, ImageData};
use badgeink_core::BoxFuture;
use badgeink_render::decode_image;

use crate::export::{DownloadTarget, ExportError, ExportFile, ExportRequest, PNG_MIME, ShareResult, ShareTarget};

/// Writes exported files into a directory.
///
/// Existing files are never overwritten; a numbered name is picked instead,
/// the way browsers do for downloads.
#[derive(Debug, Clone)]
pub struct DirectoryDownload {
    dir: PathBuf,
}

impl DirectoryDownload {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The user's downloads folder, falling back to the home directory.
    pub fn default_location() -> Result<Self, ExportError> {
        dirs::download_dir()
            .or_else(dirs::home_dir)
            .map(Self::new)
            .ok_or_else(|| ExportError::Download("no downloads directory found".to_string()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, filename: &str) -> PathBuf {
        let safe = sanitize_filename(filename);
        let candidate = self.dir.join(&safe);
        if !candidate.exists() {
            return candidate;
        }
        let (stem, ext) = match safe.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
            _ => (safe.clone(), String::new()),
        };
        (1..)
            .map(|n| self.dir.join(format!("{} ({}){}", stem, n, ext)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

/// Replace characters that are unsafe in file names.
fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim().trim_start_matches('.');
    if safe.is_empty() {
        "badge.png".to_string()
    } else {
        safe.to_string()
    }
}

impl DownloadTarget for DirectoryDownload {
    fn download(&self, file: &ExportFile) -> Result<String, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            ExportError::Download(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;
        let path = self.file_path(&file.filename);
        fs::write(&path, &file.bytes)
            .map_err(|e| ExportError::Download(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path.display().to_string())
    }
}

/// "Shares" by placing the composite on the system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipboardShare;

impl ClipboardShare {
    pub fn new() -> Self {
        Self
    }

    fn copy(file: &ExportFile) -> Result<(), String> {
        let image = decode_image(&file.bytes).map_err(|e| e.to_string())?;
        let (width, height) = image.dimensions();
        let mut clipboard = Clipboard::new().map_err(|e| e.to_string())?;
        clipboard
            .set_image(ImageData {
                width: width as usize,
                height: height as usize,
                bytes: Cow::Owned(image.into_raw()),
            })
            .map_err(|e| e.to_string())
    }
}

impl ShareTarget for ClipboardShare {
    fn can_share(&self, file: &ExportFile) -> bool {
        file.mime_type == PNG_MIME
    }

    fn share<'a>(&'a self, request: &'a ExportRequest) -> BoxFuture<'a, ShareResult> {
        Box::pin(async move {
            match Self::copy(&request.file) {
                Ok(()) => {
                    log::info!("Copied {} to the clipboard", request.file.filename);
                    ShareResult::Shared
                }
                Err(e) => ShareResult::Failed(e),
            }
        })
    }
}
