//! The sketch context.
//!
//! Display host, renderer registry, default renderer and setup flag all
//! live on one `Sketch` value. Independent sketches never share state.

use crate::host::{DisplayHost, MemoryDisplay, SurfaceFactory};
use crate::registry::{RendererRef, RendererRegistry};
use easel_core::{Arg, FriendlyValidator, NoValidation, ParamValidator, Result, SketchConfig};
use easel_render::Renderer;

/// The client's per-frame drawing routine.
pub trait RedrawTrigger {
    fn redraw(&mut self, renderer: &mut Renderer);
}

impl<F: FnMut(&mut Renderer)> RedrawTrigger for F {
    fn redraw(&mut self, renderer: &mut Renderer) {
        self(renderer)
    }
}

/// A running sketch and the surfaces it manages.
pub struct Sketch<H = MemoryDisplay> {
    pub(crate) host: H,
    pub(crate) config: SketchConfig,
    pub(crate) registry: RendererRegistry,
    pub(crate) default_renderer: Option<RendererRef>,
    pub(crate) setup_done: bool,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixel_density: f64,
    pub(crate) graphics_counter: usize,
    validator: Box<dyn ParamValidator>,
    redraw_hook: Option<Box<dyn RedrawTrigger>>,
    frame_count: u64,
}

impl Sketch<MemoryDisplay> {
    /// A sketch backed by an in-memory display tree.
    pub fn headless() -> Self {
        Self::build(MemoryDisplay::new(), SketchConfig::default())
    }
}

impl<H: DisplayHost + SurfaceFactory> Sketch<H> {
    /// # Errors
    /// Returns `EaselError::Config` if `config` fails its checks.
    pub fn new(host: H, config: SketchConfig) -> Result<Self> {
        config.check()?;
        Ok(Self::build(host, config))
    }

    fn build(host: H, config: SketchConfig) -> Self {
        let validator: Box<dyn ParamValidator> = if config.friendly_errors {
            Box::new(FriendlyValidator)
        } else {
            Box::new(NoValidation)
        };
        Self {
            host,
            pixel_density: config.pixel_density,
            config,
            registry: RendererRegistry::new(),
            default_renderer: None,
            setup_done: false,
            width: 0,
            height: 0,
            graphics_counter: 0,
            validator,
            redraw_hook: None,
            frame_count: 0,
        }
    }

    /// Replace the parameter validator.
    pub fn with_validator(mut self, validator: impl ParamValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Install the per-frame drawing routine run by [`Sketch::redraw`].
    pub fn on_redraw(&mut self, hook: impl RedrawTrigger + 'static) {
        self.redraw_hook = Some(Box::new(hook));
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// The renderer created by `create_canvas`, if any.
    pub fn default_renderer(&self) -> Option<RendererRef> {
        self.default_renderer.clone()
    }

    /// Public sketch width, as last set by `create_canvas`/`resize_canvas`.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_setup_done(&self) -> bool {
        self.setup_done
    }

    // ─── Frame loop ──────────────────────────────────────────────────────

    /// End the setup phase and reveal the default surface if it was hidden
    /// while setup ran.
    pub fn finish_setup(&mut self) {
        if self.setup_done {
            return;
        }
        self.setup_done = true;
        if let Some(renderer) = &self.default_renderer {
            let mut renderer = renderer.borrow_mut();
            if !renderer.surface().visible() {
                renderer.surface_mut().set_visible(true);
                self.host.set_visible(renderer.id(), true);
                log::debug!("setup finished: revealed {:?}", renderer.id());
            }
        }
    }

    /// Run the drawing routine once against the default renderer,
    /// synchronously. Does nothing without a canvas.
    pub fn redraw(&mut self) {
        let Some(renderer) = self.default_renderer.clone() else {
            return;
        };
        if let Some(hook) = self.redraw_hook.as_mut() {
            hook.redraw(&mut renderer.borrow_mut());
        }
        self.frame_count += 1;
    }

    pub(crate) fn validate(&self, call: &str, args: &[Arg<'_>]) -> Result<()> {
        self.validator.validate(call, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Backend, EaselError};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn new_rejects_bad_config() {
        let config = SketchConfig {
            pixel_density: -1.0,
            ..SketchConfig::default()
        };
        assert!(matches!(
            Sketch::new(MemoryDisplay::new(), config),
            Err(EaselError::Config(_))
        ));
    }

    #[test]
    fn redraw_runs_hook_and_counts_frames() {
        let mut sketch = Sketch::headless();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        sketch.on_redraw(move |_: &mut Renderer| seen.set(seen.get() + 1));

        sketch.redraw();
        assert_eq!(calls.get(), 0, "no canvas yet");

        sketch.create_canvas(10.0, 10.0, Backend::Rasterized2d).unwrap();
        sketch.redraw();
        sketch.redraw();
        assert_eq!(calls.get(), 2);
        assert_eq!(sketch.frame_count(), 2);
    }

    #[test]
    fn finish_setup_reveals_default_surface_once() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(10.0, 10.0, Backend::Rasterized2d).unwrap();
        let id = canvas.borrow().id();
        assert!(!canvas.borrow().surface().visible());
        assert_eq!(sketch.host().get(id).map(|n| n.visible), Some(false));

        sketch.finish_setup();
        sketch.finish_setup();

        assert!(sketch.is_setup_done());
        assert!(canvas.borrow().surface().visible());
        assert_eq!(sketch.host().get(id).map(|n| n.visible), Some(true));
    }

    struct RejectAll;

    impl ParamValidator for RejectAll {
        fn validate(&self, call: &str, _args: &[Arg<'_>]) -> Result<()> {
            Err(EaselError::validation(call, "rejected"))
        }
    }

    #[test]
    fn custom_validator_runs_before_mutation() {
        let mut sketch = Sketch::headless().with_validator(RejectAll);
        let err = sketch
            .create_canvas(10.0, 10.0, Backend::Rasterized2d)
            .unwrap_err();
        assert_eq!(err.to_string(), "createCanvas(): rejected");
        assert!(sketch.host().is_empty());
        assert!(sketch.registry().is_empty());
    }

    #[test]
    fn disabled_friendly_errors_skip_validation() {
        let config = SketchConfig {
            friendly_errors: false,
            ..SketchConfig::default()
        };
        let mut sketch = Sketch::new(MemoryDisplay::new(), config).unwrap();
        let canvas = sketch
            .create_canvas(f64::NAN, 20.0, Backend::Rasterized2d)
            .unwrap();
        assert_eq!((canvas.borrow().width(), canvas.borrow().height()), (0, 20));
    }
}
