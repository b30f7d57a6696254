//! WebAssembly entry point and browser bindings.
//!
//! JavaScript owns the DOM. It reports the container's bounding rectangle and
//! forwards pointer/touch coordinates; this side does loading, compositing,
//! sharing and downloading.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use badgeink_core::{BoxFuture, EditorConfig, InputEvent, LoadError, LoadResult, LoadTicket, Subject};
use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use kurbo::{Point, Rect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::editor::BadgeEditor;
use crate::export::{
    DownloadTarget, ExportError, ExportFile, ExportOutcome, ExportRequest, ExportService,
    ShareResult, ShareTarget,
};
use crate::host::{Route, resolve_route};

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Fetch a URL's body.
async fn fetch_bytes(url: &str) -> LoadResult<Vec<u8>> {
    let window = web_sys::window().ok_or_else(|| LoadError::Io("No window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| LoadError::Io(js_error(&e)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|e| LoadError::Io(js_error(&e)))?;
    if !response.ok() {
        return Err(match response.status() {
            404 => LoadError::NotFound(url.to_string()),
            status => LoadError::Io(format!("HTTP {} for {}", status, url)),
        });
    }
    let buffer = response.array_buffer().map_err(|e| LoadError::Io(js_error(&e)))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| LoadError::Io(js_error(&e)))?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

fn to_js_file(file: &ExportFile) -> Result<web_sys::File, JsValue> {
    let parts = Array::of1(&Uint8Array::from(file.bytes.as_slice()));
    let options = web_sys::FilePropertyBag::new();
    options.set_type(file.mime_type);
    web_sys::File::new_with_u8_array_sequence_and_options(&parts, &file.filename, &options)
}

/// `navigator.share` with files, looked up dynamically since not every
/// browser has it.
struct WebShare;

impl WebShare {
    fn navigator() -> Option<JsValue> {
        web_sys::window().map(|w| w.navigator().into())
    }

    fn method(navigator: &JsValue, name: &str) -> Option<Function> {
        Reflect::get(navigator, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn share_data(file: &ExportFile, title: Option<&str>, text: Option<&str>) -> Result<Object, JsValue> {
        let data = Object::new();
        Reflect::set(&data, &"files".into(), &Array::of1(&to_js_file(file)?))?;
        if let Some(title) = title {
            Reflect::set(&data, &"title".into(), &title.into())?;
        }
        if let Some(text) = text {
            Reflect::set(&data, &"text".into(), &text.into())?;
        }
        Ok(data)
    }
}

fn is_abort(err: &JsValue) -> bool {
    Reflect::get(err, &"name".into())
        .ok()
        .and_then(|name| name.as_string())
        .is_some_and(|name| name == "AbortError")
}

impl ShareTarget for WebShare {
    fn can_share(&self, file: &ExportFile) -> bool {
        let Some(navigator) = Self::navigator() else {
            return false;
        };
        if Self::method(&navigator, "share").is_none() {
            return false;
        }
        let Some(can_share) = Self::method(&navigator, "canShare") else {
            return false;
        };
        Self::share_data(file, None, None)
            .and_then(|data| can_share.call1(&navigator, &data))
            .map(|ok| ok.is_truthy())
            .unwrap_or(false)
    }

    fn share<'a>(&'a self, request: &'a ExportRequest) -> BoxFuture<'a, ShareResult> {
        Box::pin(async move {
            let Some(navigator) = Self::navigator() else {
                return ShareResult::Unsupported;
            };
            let Some(share) = Self::method(&navigator, "share") else {
                return ShareResult::Unsupported;
            };
            let promise = Self::share_data(&request.file, Some(&request.title), Some(&request.text))
                .and_then(|data| share.call1(&navigator, &data))
                .and_then(|value| value.dyn_into::<Promise>());
            let promise = match promise {
                Ok(promise) => promise,
                Err(e) => return ShareResult::Failed(js_error(&e)),
            };
            match JsFuture::from(promise).await {
                Ok(_) => ShareResult::Shared,
                Err(e) if is_abort(&e) => ShareResult::Declined,
                Err(e) => ShareResult::Failed(js_error(&e)),
            }
        })
    }
}

/// Download through a temporary object URL and an anchor click.
struct AnchorDownload;

impl AnchorDownload {
    fn trigger(file: &ExportFile) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;

        let parts = Array::of1(&Uint8Array::from(file.bytes.as_slice()));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(file.mime_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;

        let anchor = document
            .create_element("a")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| JsValue::from_str("Failed to create anchor"))?;
        anchor.set_href(&url);
        anchor.set_download(&file.filename);
        anchor.click();

        web_sys::Url::revoke_object_url(&url)?;
        Ok(())
    }
}

impl DownloadTarget for AnchorDownload {
    fn download(&self, file: &ExportFile) -> Result<String, ExportError> {
        Self::trigger(file).map_err(|e| ExportError::Download(js_error(&e)))?;
        Ok("your downloads folder".to_string())
    }
}

fn outcome_to_js(outcome: &ExportOutcome) -> JsValue {
    #[derive(serde::Serialize)]
    struct Report<'a> {
        outcome: &'a ExportOutcome,
        notification: crate::notify::Notification,
    }

    let report = Report {
        outcome,
        notification: outcome.notification(),
    };
    serde_wasm_bindgen::to_value(&report).unwrap_or_else(|e| {
        log::error!("Failed to convert export outcome: {}", e);
        JsValue::NULL
    })
}

/// Browser handle around one [`BadgeEditor`].
#[wasm_bindgen]
pub struct BadgeEditorHandle {
    editor: Rc<RefCell<BadgeEditor>>,
    container: Cell<Rect>,
}

#[wasm_bindgen]
impl BadgeEditorHandle {
    /// Create an editor from an optional JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<BadgeEditorHandle, JsValue> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(to_js)?,
            None => EditorConfig::default(),
        };
        let editor = BadgeEditor::new(config).map_err(to_js)?;
        let container = Rect::from_origin_size(Point::ZERO, editor.config().surface_size());
        Ok(Self {
            editor: Rc::new(RefCell::new(editor)),
            container: Cell::new(container),
        })
    }

    /// Open the editor for the JSON navigation state and start loading.
    ///
    /// Returns the route to redirect to when there is no usable subject.
    pub fn open(&self, state_json: Option<String>) -> Option<String> {
        let subject = state_json.and_then(|json| match Subject::from_json(&json) {
            Ok(subject) => Some(subject),
            Err(e) => {
                log::warn!("Ignoring malformed navigation state: {}", e);
                None
            }
        });
        let route = resolve_route(subject, self.editor.borrow().config());
        match route {
            Route::Edit(subject) => {
                let url = subject.image_url.clone();
                let ticket = self.editor.borrow_mut().select_subject(subject);
                spawn_load(self.editor.clone(), ticket, url);
                None
            }
            Route::Redirect(route) => Some(route),
        }
    }

    /// Record the container's client rectangle (`getBoundingClientRect`).
    #[wasm_bindgen(js_name = setContainer)]
    pub fn set_container(&self, left: f64, top: f64, width: f64, height: f64) {
        self.container
            .set(Rect::from_origin_size(Point::new(left, top), (width, height)));
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f64, y: f64) -> bool {
        self.input(Some(InputEvent::pointer_down(Point::new(x, y))))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) -> bool {
        self.input(Some(InputEvent::pointer_move(Point::new(x, y))))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, x: f64, y: f64) -> bool {
        self.input(Some(InputEvent::pointer_up(Point::new(x, y))))
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&self, x: f64, y: f64) -> bool {
        self.input(Some(InputEvent::pointer_leave(Point::new(x, y))))
    }

    /// First touch point only; pass the coordinates of `touches[0]`.
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&self, x: f64, y: f64) -> bool {
        self.input(InputEvent::touch_start(&[Point::new(x, y)]))
    }

    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&self, x: f64, y: f64) -> bool {
        self.input(InputEvent::touch_move(&[Point::new(x, y)]))
    }

    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&self, x: f64, y: f64) -> bool {
        self.input(Some(InputEvent::touch_end(Point::new(x, y))))
    }

    #[wasm_bindgen(getter, js_name = positionX)]
    pub fn position_x(&self) -> f64 {
        self.editor.borrow().position().x()
    }

    #[wasm_bindgen(getter, js_name = positionY)]
    pub fn position_y(&self) -> f64 {
        self.editor.borrow().position().y()
    }

    #[wasm_bindgen(getter, js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.editor.borrow().is_ready()
    }

    #[wasm_bindgen(getter, js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.editor.borrow().is_dragging()
    }

    /// Overlay rectangle as `[left, top, width, height]` relative to the container.
    #[wasm_bindgen(js_name = badgeRect)]
    pub fn badge_rect(&self) -> Vec<f64> {
        let container = self.container.get();
        let local = Rect::from_origin_size(Point::ZERO, container.size());
        let rect = self.editor.borrow().display_badge_rect(local);
        vec![rect.x0, rect.y0, rect.width(), rect.height()]
    }

    #[wasm_bindgen(getter, js_name = surfaceWidth)]
    pub fn surface_width(&self) -> u32 {
        self.editor.borrow().surface().width()
    }

    #[wasm_bindgen(getter, js_name = surfaceHeight)]
    pub fn surface_height(&self) -> u32 {
        self.editor.borrow().surface().height()
    }

    /// RGBA pixels of the composite, for `ImageData`.
    pub fn pixels(&self) -> Vec<u8> {
        self.editor.borrow().surface().as_rgba().to_vec()
    }

    /// Share the composite, downloading if sharing is unavailable or fails.
    ///
    /// Resolves to `{ outcome, notification }`.
    pub fn share(&self) -> Promise {
        // Encode now so no borrow is held across the share sheet
        let request = self.editor.borrow().export_request();
        wasm_bindgen_futures::future_to_promise(async move {
            let download = AnchorDownload;
            let share = WebShare;
            let service = ExportService::new(&download).with_share(&share);
            let outcome = match request {
                Ok(request) => service.deliver(request).await,
                Err(error) => ExportOutcome::from_error(error),
            };
            Ok(outcome_to_js(&outcome))
        })
    }

    /// Download the composite. Returns `{ outcome, notification }`.
    pub fn download(&self) -> JsValue {
        let download = AnchorDownload;
        let outcome = ExportService::new(&download).download(&self.editor.borrow());
        outcome_to_js(&outcome)
    }
}

impl BadgeEditorHandle {
    fn input(&self, event: Option<InputEvent>) -> bool {
        match event {
            Some(event) => self.editor.borrow_mut().handle_input(&event, self.container.get()),
            None => false,
        }
    }
}

fn spawn_load(editor: Rc<RefCell<BadgeEditor>>, ticket: LoadTicket, subject_url: String) {
    wasm_bindgen_futures::spawn_local(async move {
        let bytes = fetch_bytes(&subject_url).await;
        let badge_url = editor.borrow_mut().subject_image_loaded(ticket, bytes);
        let Some(badge_url) = badge_url else {
            return;
        };
        let bytes = fetch_bytes(&badge_url).await;
        editor.borrow_mut().badge_image_loaded(ticket, bytes);
    });
}

/// Initialize logging for the WASM module.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }

    log::info!("Starting BadgeInk (WASM)");
}
