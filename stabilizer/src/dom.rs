//! Browser binding: DOM-backed [`Host`] and a `gloo-timers` driver.
//!
//! ARCHITECTURE
//! ============
//! `DomHost` reads the container's client size and finds the `<video>` (or,
//! failing that, `<canvas>`) the AR library inserted under it. `WebStabilizer`
//! owns the timers and window listeners that drive the core state machine:
//! one `Timeout` chain for poll/confirm ticks, one replaceable `Timeout` for
//! resize debounce, and `resize` + `orientationchange` listeners.
//!
//! Timer callbacks hold only a `Weak` to the shared state, so dropping the
//! `WebStabilizer` (or calling `teardown`) is enough to stop every callback.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo_timers::callback::Timeout;
use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlVideoElement, Window};

use crate::config::StabilizerConfig;
use crate::geometry::{NaturalSize, Size, ViewportSize};
use crate::overlay::{STATE_ATTR, STATE_VISIBLE, ScannerFrame};
use crate::scene::{AssetPaths, SceneConfig};
use crate::stabilizer::{Event, Stabilizer};
use crate::state::StabilizationState;
use crate::surface::{Host, MediaSurface, SurfaceStyle};

const WINDOW_EVENTS: [&str; 2] = ["resize", "orientationchange"];

#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("no global window/document")]
    NoWindow,
    #[error("element not found: {0}")]
    NotFound(String),
    #[error("DOM call failed: {0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<DomError> for JsValue {
    fn from(err: DomError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

// =============================================================================
// HOST
// =============================================================================

/// The scanner container plus lookups into the library's inserted elements.
pub struct DomHost {
    container: HtmlElement,
}

impl DomHost {
    #[must_use]
    pub fn new(container: HtmlElement) -> Self {
        Self { container }
    }

    fn query(&self, selector: &str) -> Option<HtmlElement> {
        match self.container.query_selector(selector) {
            Ok(Some(el)) => match el.dyn_into::<HtmlElement>() {
                Ok(el) => Some(el),
                Err(_) => None,
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("query_selector({selector}) failed: {err:?}");
                None
            }
        }
    }

    fn scene(&self) -> Option<Element> {
        match self.container.query_selector("a-scene") {
            Ok(scene) => scene,
            Err(err) => {
                log::warn!("scene lookup failed: {err:?}");
                None
            }
        }
    }
}

impl Host for DomHost {
    type Surface = DomSurface;

    fn container_size(&self) -> Option<ViewportSize> {
        let width = u32::try_from(self.container.client_width()).unwrap_or(0);
        let height = u32::try_from(self.container.client_height()).unwrap_or(0);
        Size::new(width, height)
    }

    fn find_surface(&self) -> Option<Self::Surface> {
        self.query("video").or_else(|| self.query("canvas")).map(DomSurface)
    }

    /// Calls `arSource.onResizeElement()` and `arSource.copyElementSizeTo(canvas)`
    /// when the scene's `arjs` system exposes them. Library versions differ,
    /// so absence is normal.
    fn invoke_library_resize(&self) -> bool {
        let Some(scene) = self.scene() else {
            return false;
        };
        let scene = JsValue::from(scene);
        let Some(source) = get_path(&scene, &["systems", "arjs", "_arSession", "arSource"]) else {
            return false;
        };
        let resized = call_method(&source, "onResizeElement", &[]);
        if let Some(canvas) = get_path(&scene, &["renderer", "domElement"]) {
            call_method(&source, "copyElementSizeTo", &[canvas]);
        }
        resized
    }
}

fn get_path(root: &JsValue, path: &[&str]) -> Option<JsValue> {
    let mut current = root.clone();
    for key in path {
        current = match Reflect::get(&current, &JsValue::from_str(key)) {
            Ok(value) if !value.is_undefined() && !value.is_null() => value,
            _ => return None,
        };
    }
    Some(current)
}

fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> bool {
    let Some(method) = get_path(target, &[name]) else {
        return false;
    };
    let Ok(method) = method.dyn_into::<Function>() else {
        return false;
    };
    let result = match args {
        [] => method.call0(target),
        [a] => method.call1(target, a),
        _ => method.apply(target, &args.iter().collect::<js_sys::Array>()),
    };
    if let Err(err) = result {
        log::warn!("library hook {name} threw: {err:?}");
        return false;
    }
    true
}

/// A `<video>` or `<canvas>` owned by the AR library.
#[derive(Clone)]
pub struct DomSurface(HtmlElement);

impl MediaSurface for DomSurface {
    fn natural_size(&self) -> Option<NaturalSize> {
        if let Some(video) = self.0.dyn_ref::<HtmlVideoElement>() {
            return Size::new(video.video_width(), video.video_height());
        }
        if let Some(canvas) = self.0.dyn_ref::<HtmlCanvasElement>() {
            return Size::new(canvas.width(), canvas.height());
        }
        None
    }

    fn apply_style(&self, style: &SurfaceStyle) {
        let css = self.0.style();
        for (prop, value) in style.declarations() {
            if let Err(err) = css.set_property_with_priority(prop, &value, "important") {
                log::warn!("failed to set {prop}: {err:?}");
            }
        }
    }
}

// =============================================================================
// DRIVER
// =============================================================================

type EventCallback = Box<dyn FnMut(&Event)>;

struct Inner {
    stabilizer: Stabilizer<DomHost>,
    overlay: Option<HtmlElement>,
    tick_timer: Option<Timeout>,
    debounce_timer: Option<Timeout>,
    on_event: Option<EventCallback>,
}

/// Drives a [`Stabilizer`] from browser timers and window events.
pub struct WebStabilizer {
    inner: Rc<RefCell<Inner>>,
    window: Window,
    listener: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

impl WebStabilizer {
    /// Start stabilizing the feed under `container`. `overlay` gets
    /// `data-state="visible"` when the stabilizer reveals it.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no window or a listener cannot be attached.
    pub fn mount(
        container: HtmlElement,
        overlay: Option<HtmlElement>,
        config: StabilizerConfig,
    ) -> Result<Self, DomError> {
        let window = web_sys::window().ok_or(DomError::NoWindow)?;
        let inner = Rc::new(RefCell::new(Inner {
            stabilizer: Stabilizer::new(DomHost::new(container), config.or_default_if_invalid()),
            overlay,
            tick_timer: None,
            debounce_timer: None,
            on_event: None,
        }));

        let listener = resize_listener(Rc::downgrade(&inner));
        for name in WINDOW_EVENTS {
            window.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
        }

        let events = inner.borrow_mut().stabilizer.stabilize();
        dispatch(&inner, &events);
        schedule_tick(&inner);

        Ok(Self { inner, window, listener: Some(listener) })
    }

    /// Observe every event the state machine emits.
    pub fn on_event(&self, callback: impl FnMut(&Event) + 'static) {
        self.inner.borrow_mut().on_event = Some(Box::new(callback));
    }

    #[must_use]
    pub fn state(&self) -> StabilizationState {
        self.inner.borrow().stabilizer.state()
    }

    /// Cancel all timers and detach the window listeners. Idempotent.
    pub fn teardown(&mut self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.tick_timer = None;
            inner.debounce_timer = None;
        }
        let Some(listener) = self.listener.take() else {
            return;
        };
        for name in WINDOW_EVENTS {
            if let Err(err) = self
                .window
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
            {
                log::warn!("failed to detach {name} listener: {err:?}");
            }
        }
        log::debug!("stabilizer torn down");
    }
}

impl Drop for WebStabilizer {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

fn schedule_tick(inner: &Rc<RefCell<Inner>>) {
    let delay = inner.borrow().stabilizer.next_delay();
    let Some(delay) = delay else {
        inner.borrow_mut().tick_timer = None;
        return;
    };
    let weak = Rc::downgrade(inner);
    let timer = Timeout::new(millis(delay), move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let events = inner.borrow_mut().stabilizer.tick();
        dispatch(&inner, &events);
        schedule_tick(&inner);
    });
    inner.borrow_mut().tick_timer = Some(timer);
}

fn resize_listener(weak: Weak<RefCell<Inner>>) -> Closure<dyn FnMut(web_sys::Event)> {
    Closure::new(move |_event: web_sys::Event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let debounce = {
            let mut guard = inner.borrow_mut();
            // The old cycle's retry timer must not fire into the new one.
            guard.tick_timer = None;
            guard.stabilizer.config().resize_debounce()
        };
        let weak = Rc::downgrade(&inner);
        let timer = Timeout::new(millis(debounce), move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let events = inner.borrow_mut().stabilizer.on_resize();
            dispatch(&inner, &events);
            schedule_tick(&inner);
        });
        inner.borrow_mut().debounce_timer = Some(timer);
    })
}

fn dispatch(inner: &Rc<RefCell<Inner>>, events: &[Event]) {
    if events.is_empty() {
        return;
    }
    let (overlay, callback) = {
        let mut guard = inner.borrow_mut();
        (guard.overlay.clone(), guard.on_event.take())
    };
    for event in events {
        if let Event::OverlayRevealed { reason } = event {
            log::info!("revealing scanner overlay ({reason:?})");
            if let Some(overlay) = &overlay {
                if let Err(err) = overlay.set_attribute(STATE_ATTR, STATE_VISIBLE) {
                    log::warn!("failed to reveal overlay: {err:?}");
                }
            }
        }
    }
    if let Some(mut callback) = callback {
        for event in events {
            callback(event);
        }
        let mut guard = inner.borrow_mut();
        if guard.on_event.is_none() {
            guard.on_event = Some(callback);
        }
    }
}

// =============================================================================
// SCANNER MOUNT
// =============================================================================

/// Render the overlay and scene into `container` and return the overlay element.
///
/// # Errors
///
/// Returns an error if the document is unavailable or the markup cannot be inserted.
pub fn render_scanner(
    container: &HtmlElement,
    scene: &SceneConfig,
    assets: &AssetPaths,
    frame: &ScannerFrame,
) -> Result<HtmlElement, DomError> {
    let document: Document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(DomError::NoWindow)?;
    let style = document.create_element("style")?;
    style.set_text_content(Some(&frame.stylesheet()));
    container.set_class_name("ar-container");
    container.set_inner_html(&format!("{}{}", frame.markup(), scene.markup(assets)));
    container.prepend_with_node_1(&style)?;

    container
        .query_selector(".scanner-frame")?
        .ok_or_else(|| DomError::NotFound(".scanner-frame".to_owned()))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| DomError::NotFound(".scanner-frame".to_owned()))
}

/// Handle returned to JavaScript; dropping it (or calling `teardown`) stops
/// the stabilizer.
#[wasm_bindgen]
pub struct ScannerHandle {
    stabilizer: WebStabilizer,
}

#[wasm_bindgen]
impl ScannerHandle {
    /// Current state as a lowercase string.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn state(&self) -> String {
        self.stabilizer.state().as_str().to_owned()
    }

    pub fn teardown(&mut self) {
        self.stabilizer.teardown();
    }
}

/// JS entry point: render the scanner into `#container_id` and stabilize its
/// feed. `config_json` is a [`StabilizerConfig`] object; invalid config falls
/// back to defaults.
///
/// # Errors
///
/// Returns an error if the container is missing or the DOM rejects the markup.
#[wasm_bindgen]
pub fn mount_scanner(container_id: &str, base_url: &str, config_json: &str) -> Result<ScannerHandle, JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("logger already initialised");
    }

    let config = StabilizerConfig::from_json(config_json).unwrap_or_else(|err| {
        log::warn!("invalid stabilizer config, using defaults: {err}");
        StabilizerConfig::default()
    });

    let container = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(DomError::NoWindow)?
        .get_element_by_id(container_id)
        .ok_or_else(|| DomError::NotFound(container_id.to_owned()))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| DomError::NotFound(container_id.to_owned()))?;

    let overlay = render_scanner(&container, &SceneConfig::default(), &AssetPaths::new(base_url), &ScannerFrame::default())?;
    let stabilizer = WebStabilizer::mount(container, Some(overlay), config)?;
    Ok(ScannerHandle { stabilizer })
}
