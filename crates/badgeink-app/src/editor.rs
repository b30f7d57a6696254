//! Badge editor state: drag input, image loading and compositing for one subject.

use badgeink_core::{
    BadgePosition, ConfigError, DragTracker, EditorConfig, ImageSource, InputEvent, LoadError,
    LoadPhase, LoadResult, LoadStep, LoadSynchronizer, LoadTicket, Subject, display_badge_rect,
};
use badgeink_render::{
    PaintContext, RasterCompositor, RasterSurface, RenderError, Renderer, RgbaImage, decode_image,
    fit_to,
};
use kurbo::Rect;
use thiserror::Error;

use crate::export::{ExportError, ExportFile, ExportRequest};

/// Editor construction errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Interactive compositing state for one screen.
///
/// Owns the drag session and the raster surface. The composite only becomes
/// exportable after both images decoded and the first full paint happened.
pub struct BadgeEditor {
    config: EditorConfig,
    subject: Option<Subject>,
    position: BadgePosition,
    drag: DragTracker,
    /// Decoded layers, already scaled to surface and badge size.
    loader: LoadSynchronizer<RgbaImage>,
    compositor: RasterCompositor,
    ready: bool,
}

impl BadgeEditor {
    /// Create an editor with no subject selected.
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        let compositor = RasterCompositor::new(config.surface_width, config.surface_height)?;
        Ok(Self {
            position: config.start_position(),
            drag: DragTracker::with_bounds(config.bounds),
            config,
            subject: None,
            loader: LoadSynchronizer::new(),
            compositor,
            ready: false,
        })
    }

    /// Select a subject, superseding any previous one.
    ///
    /// Resets position, drag and readiness. The returned ticket must accompany
    /// both load completions; completions for older tickets are ignored.
    pub fn select_subject(&mut self, subject: Subject) -> LoadTicket {
        log::info!("Selected subject {} ({})", subject.id, subject.name);
        self.subject = Some(subject);
        self.position = self.config.start_position();
        self.drag.reset();
        self.ready = false;
        self.compositor.clear();
        self.loader.begin()
    }

    /// Report the subject image bytes.
    ///
    /// Returns the badge reference to fetch next, or `None` if the completion
    /// was stale or the subject failed to load.
    pub fn subject_image_loaded(&mut self, ticket: LoadTicket, result: LoadResult<Vec<u8>>) -> Option<String> {
        if !self.loader.is_current(ticket) {
            log::debug!("Ignoring subject image for superseded load (gen {})", ticket.generation());
            return None;
        }
        let (width, height) = (self.config.surface_width, self.config.surface_height);
        let layer = result.and_then(|bytes| decode_layer(&bytes, width, height));
        match self.loader.subject_loaded(ticket, layer) {
            LoadStep::FetchBadge => Some(self.config.badge_image.clone()),
            _ => None,
        }
    }

    /// Report the badge image bytes.
    ///
    /// On success paints the first composite and returns `true`; the editor is
    /// then ready for export.
    pub fn badge_image_loaded(&mut self, ticket: LoadTicket, result: LoadResult<Vec<u8>>) -> bool {
        if !self.loader.is_current(ticket) {
            log::debug!("Ignoring badge image for superseded load (gen {})", ticket.generation());
            return false;
        }
        let size = self.config.badge_size;
        let layer = result.and_then(|bytes| decode_layer(&bytes, size, size));
        match self.loader.badge_loaded(ticket, layer) {
            LoadStep::Decoded => {
                self.ready = self.repaint();
                if self.ready {
                    log::info!("Composite ready");
                }
                self.ready
            }
            _ => false,
        }
    }

    /// Fetch and decode the current subject's image and then the badge.
    ///
    /// Returns whether the composite became ready.
    pub async fn load_images(&mut self, ticket: LoadTicket, source: &dyn ImageSource) -> bool {
        let Some(subject_ref) = self.subject.as_ref().map(|s| s.image_url.clone()) else {
            return false;
        };
        let bytes = source.fetch(&subject_ref).await;
        let Some(badge_ref) = self.subject_image_loaded(ticket, bytes) else {
            return false;
        };
        let bytes = source.fetch(&badge_ref).await;
        self.badge_image_loaded(ticket, bytes)
    }

    /// Select `subject` and load both images from `source`.
    pub async fn load_subject(&mut self, subject: Subject, source: &dyn ImageSource) -> bool {
        let ticket = self.select_subject(subject);
        self.load_images(ticket, source).await
    }

    /// Feed one pointer or touch event. `container` is the on-screen reference
    /// rectangle in client coordinates.
    ///
    /// Returns `true` when the badge moved. Once ready, each move repaints.
    pub fn handle_input(&mut self, event: &InputEvent, container: Rect) -> bool {
        match self.drag.handle(event, container) {
            Some(position) => {
                self.position = position;
                if self.ready {
                    self.repaint();
                }
                true
            }
            None => false,
        }
    }

    fn repaint(&mut self) -> bool {
        let Some((subject, badge)) = self.loader.images() else {
            return false;
        };
        self.compositor
            .paint(&PaintContext::new(subject, badge, self.position, self.config.badge_size));
        true
    }

    /// Build the PNG export file, refusing until the composite is ready.
    pub fn prepare_export(&self, filename_base: &str) -> Result<ExportFile, ExportError> {
        if !self.ready {
            return Err(ExportError::NotReady);
        }
        let surface = self.compositor.surface();
        let bytes = surface.encode_png()?;
        Ok(ExportFile::png(
            self.config.download_filename(filename_base),
            bytes,
            surface.width(),
            surface.height(),
        ))
    }

    /// Export file plus share title and text for the current subject.
    pub fn export_request(&self) -> Result<ExportRequest, ExportError> {
        let base = self
            .subject
            .as_ref()
            .map(|s| s.filename_base().to_string())
            .ok_or(ExportError::NotReady)?;
        let file = self.prepare_export(&base)?;
        Ok(ExportRequest {
            file,
            text: self.config.share_text_for(&base),
            title: base,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    pub fn position(&self) -> BadgePosition {
        self.position
    }

    /// Fixed badge edge length in pixels.
    pub fn badge_size(&self) -> u32 {
        self.config.badge_size
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Whether the composite may be exported.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn load_phase(&self) -> LoadPhase {
        self.loader.phase()
    }

    /// Why loading stopped, if it failed.
    pub fn load_failure(&self) -> Option<&LoadError> {
        self.loader.failure()
    }

    /// The export raster.
    pub fn surface(&self) -> &RasterSurface {
        self.compositor.surface()
    }

    /// Number of full paints since the editor was created.
    pub fn paint_count(&self) -> u64 {
        self.compositor.paint_count()
    }

    /// Where to draw the badge overlay inside the on-screen container.
    pub fn display_badge_rect(&self, container: Rect) -> Rect {
        display_badge_rect(container, self.position, self.config.badge_size)
    }
}

/// Decode and scale a layer once so repaints don't resample.
fn decode_layer(bytes: &[u8], width: u32, height: u32) -> LoadResult<RgbaImage> {
    let image = decode_image(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
    Ok(fit_to(&image, width, height).into_owned())
}
