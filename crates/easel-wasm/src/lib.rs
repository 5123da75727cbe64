//! WASM bridge for Easel — exposes the sketch lifecycle to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Surfaces are real `<canvas>`
//! elements managed through [`dom::DomDisplay`].

mod dom;

use dom::DomDisplay;
use easel_core::{Backend, EaselError, PropertySnapshot, Scalar, SketchConfig};
use easel_sketch::{DisplayHost, RendererRef, Sketch, SurfaceFactory};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

fn to_js(err: EaselError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Renderer constant from JS (`"p2d"` / `"webgl"`); 2D when omitted.
fn backend_arg(renderer: Option<String>) -> Result<Backend, EaselError> {
    renderer
        .as_deref()
        .map_or(Ok(Backend::Rasterized2d), |name| name.parse())
}

fn snapshot_json(snapshot: &PropertySnapshot) -> String {
    let map: serde_json::Map<String, serde_json::Value> = snapshot
        .iter()
        .map(|(key, value)| {
            // CSS color strings for JS; the snapshot itself keeps full precision.
            let value = match value {
                Scalar::Color(c) => serde_json::Value::String(c.to_hex()),
                other => serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
            };
            (key.to_string(), value)
        })
        .collect();
    serde_json::Value::Object(map).to_string()
}

/// Count a frame, then run `draw` with the sketch borrow released so the
/// callback can call back into the sketch. Does nothing without a canvas.
fn frame<H: DisplayHost + SurfaceFactory>(sketch: &RefCell<Sketch<H>>, draw: impl FnOnce()) {
    let has_canvas = {
        let mut sketch = sketch.borrow_mut();
        sketch.redraw();
        sketch.default_renderer().is_some()
    };
    if has_canvas {
        draw();
    }
}

fn resize_and_draw<H: DisplayHost + SurfaceFactory>(
    sketch: &RefCell<Sketch<H>>,
    width: f64,
    height: f64,
    skip_redraw: bool,
    draw: impl FnOnce(),
) -> Result<(), EaselError> {
    sketch.borrow_mut().resize_canvas(width, height, true)?;
    if !skip_redraw {
        frame(sketch, draw);
    }
    Ok(())
}

/// The main WASM-facing sketch.
///
/// Owns the sketch context and its DOM display host. Graphics buffers are
/// handed to JS as [`EaselGraphics`] handles and live as long as JS keeps
/// them. Every method takes `&self`, so the draw callback may call back in.
#[wasm_bindgen]
pub struct EaselSketch {
    sketch: RefCell<Sketch<DomDisplay>>,
    draw: RefCell<Option<js_sys::Function>>,
}

#[wasm_bindgen]
impl EaselSketch {
    /// Create a sketch. `config` is an optional JSON `SketchConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<EaselSketch, JsValue> {
        console_error_panic_hook_setup();
        console_logger_setup();

        let config = match config.as_deref() {
            Some(json) => SketchConfig::from_json(json).map_err(to_js)?,
            None => SketchConfig::default(),
        };
        let sketch = Sketch::new(DomDisplay::new()?, config).map_err(to_js)?;
        Ok(Self {
            sketch: RefCell::new(sketch),
            draw: RefCell::new(None),
        })
    }

    /// Create or re-create the default canvas. Returns its element id.
    #[wasm_bindgen(js_name = createCanvas)]
    pub fn create_canvas(&self, width: f64, height: f64, renderer: Option<String>) -> Result<String, JsValue> {
        let backend = backend_arg(renderer).map_err(to_js)?;
        let canvas = self
            .sketch
            .borrow_mut()
            .create_canvas(width, height, backend)
            .map_err(to_js)?;
        let id = canvas.borrow().id();
        Ok(id.as_str().to_string())
    }

    #[wasm_bindgen(js_name = resizeCanvas)]
    pub fn resize_canvas(&self, width: f64, height: f64, skip_redraw: Option<bool>) -> Result<(), JsValue> {
        resize_and_draw(&self.sketch, width, height, skip_redraw.unwrap_or(false), || {
            self.run_draw()
        })
        .map_err(to_js)
    }

    #[wasm_bindgen(js_name = noCanvas)]
    pub fn no_canvas(&self) {
        self.sketch.borrow_mut().no_canvas();
    }

    #[wasm_bindgen(js_name = createGraphics)]
    pub fn create_graphics(&self, width: f64, height: f64, renderer: Option<String>) -> Result<EaselGraphics, JsValue> {
        let backend = backend_arg(renderer).map_err(to_js)?;
        let renderer = self
            .sketch
            .borrow_mut()
            .create_graphics(width, height, backend)
            .map_err(to_js)?;
        Ok(EaselGraphics { renderer })
    }

    #[wasm_bindgen(js_name = removeGraphics)]
    pub fn remove_graphics(&self, graphics: &EaselGraphics) -> bool {
        self.sketch.borrow_mut().remove_graphics(&graphics.renderer)
    }

    /// Set the default canvas's compositing mode. Returns the canonical
    /// token that was applied.
    #[wasm_bindgen(js_name = blendMode)]
    pub fn blend_mode(&self, mode: &str) -> Result<String, JsValue> {
        let mode = self.sketch.borrow_mut().blend_mode(mode).map_err(to_js)?;
        Ok(mode.token().to_string())
    }

    #[wasm_bindgen(js_name = graphicsBlendMode)]
    pub fn graphics_blend_mode(&self, graphics: &EaselGraphics, mode: &str) -> Result<String, JsValue> {
        let mode = self
            .sketch
            .borrow()
            .graphics_blend_mode(&graphics.renderer, mode)
            .map_err(to_js)?;
        Ok(mode.token().to_string())
    }

    #[wasm_bindgen(js_name = pixelDensity)]
    pub fn pixel_density(&self) -> f64 {
        self.sketch.borrow().pixel_density()
    }

    #[wasm_bindgen(js_name = setPixelDensity)]
    pub fn set_pixel_density(&self, density: f64) -> Result<(), JsValue> {
        self.sketch.borrow_mut().set_pixel_density(density).map_err(to_js)
    }

    /// Register the per-frame draw callback used by `redraw` and by
    /// `resizeCanvas`. It runs after the sketch is released, so it may call
    /// any method on this sketch, `onRedraw` included.
    #[wasm_bindgen(js_name = onRedraw)]
    pub fn on_redraw(&self, callback: js_sys::Function) {
        *self.draw.borrow_mut() = Some(callback);
    }

    pub fn redraw(&self) {
        frame(&self.sketch, || self.run_draw());
    }

    /// End setup and reveal the default canvas.
    #[wasm_bindgen(js_name = finishSetup)]
    pub fn finish_setup(&self) {
        self.sketch.borrow_mut().finish_setup();
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.sketch.borrow().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.sketch.borrow().height()
    }

    #[wasm_bindgen(getter, js_name = frameCount)]
    pub fn frame_count(&self) -> f64 {
        self.sketch.borrow().frame_count() as f64
    }

    /// Scalar drawing state of the default canvas as a JSON object, or
    /// `null` without a canvas.
    #[wasm_bindgen(js_name = canvasState)]
    pub fn canvas_state(&self) -> Option<String> {
        self.sketch
            .borrow()
            .default_renderer()
            .map(|r| snapshot_json(&r.borrow().snapshot()))
    }
}

impl EaselSketch {
    fn run_draw(&self) {
        // Cloned out so the callback can replace itself.
        let callback = self.draw.borrow().clone();
        if let Some(callback) = callback {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                log::error!("draw callback threw: {e:?}");
            }
        }
    }
}

/// JS handle to an offscreen graphics buffer.
#[wasm_bindgen]
pub struct EaselGraphics {
    renderer: RendererRef,
}

#[wasm_bindgen]
impl EaselGraphics {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.renderer.borrow().id().as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.renderer.borrow().width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.renderer.borrow().height()
    }

    #[wasm_bindgen(getter)]
    pub fn renderer(&self) -> String {
        self.renderer.borrow().backend().as_str().to_string()
    }

    #[wasm_bindgen(js_name = blendMode)]
    pub fn blend_mode(&self) -> String {
        self.renderer.borrow().blend_mode().token().to_string()
    }

    /// Scalar drawing state as a JSON object.
    pub fn state(&self) -> String {
        snapshot_json(&self.renderer.borrow().snapshot())
    }
}

// ─── Console plumbing ────────────────────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Easel WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Forwards `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[easel] {}", record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn console_logger_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        static LOGGER: ConsoleLogger = ConsoleLogger;
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Warn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::BlendMode;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn renderer_argument_defaults_to_2d() {
        assert_eq!(backend_arg(None), Ok(Backend::Rasterized2d));
        assert_eq!(backend_arg(Some("webgl".into())), Ok(Backend::Accelerated3d));
        assert!(matches!(
            backend_arg(Some("svg".into())),
            Err(EaselError::Validation { .. })
        ));
    }

    #[test]
    fn snapshot_serializes_as_flat_object() {
        let mut snapshot = PropertySnapshot::default();
        snapshot.push("line_width", 2.5);
        snapshot.push("font", "12px serif");
        snapshot.push("image_smoothing_enabled", Scalar::Bool(false));
        snapshot.push("fill_style", easel_core::Color::from_rgba8(255, 0, 0, 128));

        let json: serde_json::Value = serde_json::from_str(&snapshot_json(&snapshot)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "line_width": 2.5,
                "font": "12px serif",
                "image_smoothing_enabled": false,
                "fill_style": "#FF000080",
            })
        );
    }

    #[test]
    fn draw_callback_can_reenter_the_sketch() {
        let sketch = RefCell::new(Sketch::headless());
        let draws = Cell::new(0);

        frame(&sketch, || draws.set(draws.get() + 1));
        assert_eq!(draws.get(), 0, "no canvas yet");

        sketch
            .borrow_mut()
            .create_canvas(10.0, 10.0, Backend::Rasterized2d)
            .unwrap();
        let mut applied = None;
        frame(&sketch, || applied = Some(sketch.borrow_mut().blend_mode("ADD")));
        assert_eq!(applied, Some(Ok(BlendMode::Add)));
        assert_eq!(sketch.borrow().frame_count(), 1);

        resize_and_draw(&sketch, 20.0, 20.0, false, || {
            draws.set(draws.get() + 1);
            assert_eq!(sketch.borrow().width(), 20);
        })
        .unwrap();
        resize_and_draw(&sketch, 30.0, 30.0, true, || draws.set(draws.get() + 1)).unwrap();
        assert_eq!(draws.get(), 1);
        assert_eq!(sketch.borrow().frame_count(), 2);
    }
}
