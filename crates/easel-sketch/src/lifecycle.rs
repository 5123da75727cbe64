//! Canvas lifecycle: creating, replacing, resizing and discarding the
//! default surface, plus offscreen graphics buffers.

use crate::host::{DisplayHost, SurfaceFactory};
use crate::registry::RendererRef;
use crate::sketch::Sketch;
use easel_core::{Arg, Backend, EaselError, Result, SurfaceId, backing_extent, pixel_extent};
use easel_render::Renderer;
use std::cell::RefCell;
use std::rc::Rc;

impl<H: DisplayHost + SurfaceFactory> Sketch<H> {
    // ─── Default canvas ──────────────────────────────────────────────────

    /// Create (or re-create) the default canvas at `width`×`height`.
    ///
    /// A 2D request while a 2D default exists reuses that renderer and its
    /// surface; the call then amounts to a resize that also resets drawing
    /// state. Any other combination tears the previous default down and
    /// builds a fresh surface and renderer. Non-finite or non-positive
    /// dimensions give a zero-area canvas.
    ///
    /// # Errors
    /// Returns `EaselError::Validation` if the arguments are rejected or the
    /// backing store would exceed what `backend` supports; the sketch is
    /// unchanged in that case.
    pub fn create_canvas(&mut self, width: f64, height: f64, backend: Backend) -> Result<RendererRef> {
        self.validate(
            "createCanvas",
            &[Arg::Number(width), Arg::Number(height), Arg::Backend(backend)],
        )?;
        let (w, h) = (pixel_extent(width), pixel_extent(height));
        self.check_extent("createCanvas", backend, (w, h), self.pixel_density)?;
        self.collect_released();

        let renderer = match self.reusable_default(backend) {
            Some(current) => {
                log::debug!("createCanvas: reusing {:?} as a {w}x{h} canvas", current.borrow().id());
                current
            }
            None => self.replace_default(backend),
        };

        {
            let mut r = renderer.borrow_mut();
            if !self.setup_done {
                r.surface_mut().set_visible(false);
            }
            self.host.attach(r.surface(), self.config.container.as_deref());
            r.resize(w, h);
            r.apply_defaults();
            self.host.sync_size(r.surface(), (w, h));
        }
        self.width = w;
        self.height = h;
        Ok(renderer)
    }

    /// Resize the default canvas, carrying its drawing state across the
    /// destructive reallocation, then redraw once unless `skip_redraw`.
    /// Without a canvas this does nothing.
    ///
    /// # Errors
    /// Returns `EaselError::Validation` if the arguments are rejected or the
    /// new backing store is too large; the canvas keeps its size then.
    pub fn resize_canvas(&mut self, width: f64, height: f64, skip_redraw: bool) -> Result<()> {
        self.validate(
            "resizeCanvas",
            &[Arg::Number(width), Arg::Number(height), Arg::Flag(skip_redraw)],
        )?;
        let Some(renderer) = self.default_renderer.clone() else {
            log::debug!("resizeCanvas: no canvas, ignoring");
            return Ok(());
        };
        let (w, h) = (pixel_extent(width), pixel_extent(height));
        let backend = renderer.borrow().backend();
        self.check_extent("resizeCanvas", backend, (w, h), self.pixel_density)?;
        {
            let mut r = renderer.borrow_mut();
            r.resize_preserving(w, h);
            self.host.sync_size(r.surface(), (w, h));
        }
        self.width = w;
        self.height = h;
        if !skip_redraw {
            self.redraw();
        }
        Ok(())
    }

    /// Detach and discard the default canvas. Graphics buffers are left
    /// alone. Calling it again is a no-op.
    pub fn no_canvas(&mut self) {
        match self.default_renderer.clone() {
            Some(renderer) => {
                log::debug!("noCanvas: removing {:?}", renderer.borrow().id());
                self.teardown(&renderer);
            }
            None => log::trace!("noCanvas: no canvas, ignoring"),
        }
    }

    /// Set the sketch's pixel density and reallocate the default canvas at
    /// its current logical size, preserving drawing state.
    ///
    /// # Errors
    /// Returns `EaselError::Validation` unless `density` is finite and
    /// positive and the default canvas still fits at that density.
    pub fn set_pixel_density(&mut self, density: f64) -> Result<()> {
        self.validate("pixelDensity", &[Arg::Number(density)])?;
        if !(density.is_finite() && density > 0.0) {
            return Err(EaselError::validation(
                "pixelDensity",
                format!("density must be a positive number, got {density}"),
            ));
        }
        if let Some(renderer) = &self.default_renderer {
            let r = renderer.borrow();
            self.check_extent("pixelDensity", r.backend(), (r.width(), r.height()), density)?;
        }
        self.pixel_density = density;
        if let Some(renderer) = &self.default_renderer {
            let mut r = renderer.borrow_mut();
            r.set_pixel_density(density);
            self.host.sync_size(r.surface(), (r.width(), r.height()));
        }
        Ok(())
    }

    // ─── Graphics buffers ────────────────────────────────────────────────

    /// Create an offscreen buffer. Always a brand-new hidden surface and
    /// renderer; the default canvas and the sketch's size are untouched.
    ///
    /// The buffer lives as long as the caller holds the returned handle.
    ///
    /// # Errors
    /// Returns `EaselError::Validation` if the arguments are rejected or the
    /// buffer would be too large for `backend`.
    pub fn create_graphics(&mut self, width: f64, height: f64, backend: Backend) -> Result<RendererRef> {
        self.validate(
            "createGraphics",
            &[Arg::Number(width), Arg::Number(height), Arg::Backend(backend)],
        )?;
        let (w, h) = (pixel_extent(width), pixel_extent(height));
        self.check_extent("createGraphics", backend, (w, h), self.pixel_density)?;
        self.collect_released();

        let id = self.next_graphics_id();
        let mut surface = self.host.create_surface(id);
        surface.set_visible(false);
        self.host.attach_offscreen(&surface, self.config.container.as_deref());

        let mut renderer = Renderer::new(surface, backend, false, self.pixel_density);
        renderer.resize(w, h);
        renderer.apply_defaults();
        self.host.sync_size(renderer.surface(), (w, h));

        let renderer = Rc::new(RefCell::new(renderer));
        self.registry.register(&renderer);
        log::debug!("createGraphics: {backend} buffer {id:?}");
        Ok(renderer)
    }

    /// Detach a graphics buffer and drop it from the registry. Returns
    /// whether it was registered. The default canvas is refused; use
    /// [`Sketch::no_canvas`] for that.
    pub fn remove_graphics(&mut self, graphics: &RendererRef) -> bool {
        if graphics.borrow().is_default() {
            log::warn!("removeGraphics: {:?} is the default canvas", graphics.borrow().id());
            return false;
        }
        if !self.registry.remove(graphics) {
            return false;
        }
        self.host.detach(graphics.borrow().id());
        true
    }

    /// Live graphics buffers in creation order.
    pub fn graphics(&self) -> Vec<RendererRef> {
        self.registry
            .live()
            .into_iter()
            .filter(|r| !r.borrow().is_default())
            .collect()
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Reject a logical size whose backing store at `density` the backend
    /// cannot allocate.
    fn check_extent(&self, call: &str, backend: Backend, (w, h): (u32, u32), density: f64) -> Result<()> {
        let (bw, bh) = (backing_extent(w, density), backing_extent(h, density));
        if Renderer::fits(backend, bw, bh) {
            return Ok(());
        }
        Err(EaselError::validation(
            call,
            format!(
                "a {w}x{h} {backend} surface at pixel density {density} needs a {bw}x{bh} \
                 backing store, larger than supported"
            ),
        ))
    }

    fn reusable_default(&self, backend: Backend) -> Option<RendererRef> {
        if backend != Backend::Rasterized2d {
            return None;
        }
        self.default_renderer
            .clone()
            .filter(|r| r.borrow().backend() == Backend::Rasterized2d)
    }

    /// Tear down the current default (if any) and register a fresh default
    /// renderer on a new surface. The old surface is detached before the
    /// new one exists.
    fn replace_default(&mut self, backend: Backend) -> RendererRef {
        let previous = self
            .default_renderer
            .as_ref()
            .map(|r| (r.borrow().id(), r.borrow().backend()));

        let id = match backend {
            Backend::Accelerated3d => {
                let reserved = previous
                    .map(|(id, _)| id)
                    .unwrap_or_else(|| SurfaceId::slot(&self.config.default_id_prefix, 0));
                self.release_surface(reserved);
                reserved
            }
            Backend::Rasterized2d => {
                if let Some(current) = self.default_renderer.clone() {
                    self.teardown(&current);
                }
                self.next_default_id()
            }
        };

        if let Some((old_id, old_backend)) = previous {
            log::warn!(
                "createCanvas: replacing {old_backend} canvas {old_id:?} with a new {backend} \
                 canvas; the previous context and its resources are discarded"
            );
        }

        let surface = self.host.create_surface(id);
        let renderer = Rc::new(RefCell::new(Renderer::new(
            surface,
            backend,
            true,
            self.pixel_density,
        )));
        self.registry.register(&renderer);
        self.default_renderer = Some(Rc::clone(&renderer));
        renderer
    }

    /// Free `id`: tear down the renderer owning it, or detach a surface the
    /// sketch never created.
    fn release_surface(&mut self, id: SurfaceId) {
        if let Some(owner) = self.registry.find(id) {
            self.teardown(&owner);
        } else if self.host.has_surface(id) {
            self.host.detach(id);
            log::debug!("detached foreign surface {id:?}");
        }
    }

    fn teardown(&mut self, renderer: &RendererRef) {
        let id = renderer.borrow().id();
        self.host.detach(id);
        self.registry.remove(renderer);
        if self
            .default_renderer
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, renderer))
        {
            self.default_renderer = None;
        }
    }

    fn is_taken(&self, id: SurfaceId) -> bool {
        self.host.has_surface(id) || self.registry.find(id).is_some()
    }

    /// First `defaultCanvas{i}` not present anywhere.
    fn next_default_id(&self) -> SurfaceId {
        let mut index = 0;
        loop {
            let id = SurfaceId::slot(&self.config.default_id_prefix, index);
            if !self.is_taken(id) {
                return id;
            }
            index += 1;
        }
    }

    fn next_graphics_id(&mut self) -> SurfaceId {
        loop {
            let id = SurfaceId::slot(&self.config.graphics_id_prefix, self.graphics_counter);
            self.graphics_counter += 1;
            if !self.is_taken(id) {
                return id;
            }
        }
    }

    /// Detach surfaces of graphics buffers their owners have dropped.
    fn collect_released(&mut self) {
        for id in self.registry.prune() {
            self.host.detach(id);
            log::debug!("pruned released buffer {id:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::host::MemoryDisplay;
    use crate::sketch::Sketch;
    use easel_core::{Backend, EaselError, SurfaceId};
    use std::rc::Rc;

    #[test]
    fn first_canvas_takes_slot_zero() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(100.0, 50.0, Backend::Rasterized2d).unwrap();
        assert_eq!(canvas.borrow().id(), SurfaceId::intern("defaultCanvas0"));
        assert!(canvas.borrow().is_default());
        assert_eq!((sketch.width(), sketch.height()), (100, 50));
    }

    #[test]
    fn two_dimensional_scan_skips_foreign_ids() {
        let mut display = MemoryDisplay::new();
        display.insert_foreign("defaultCanvas0");
        let mut sketch = Sketch::new(display, Default::default()).unwrap();

        let canvas = sketch.create_canvas(10.0, 10.0, Backend::Rasterized2d).unwrap();

        assert_eq!(canvas.borrow().id(), SurfaceId::intern("defaultCanvas1"));
        assert!(sketch.host().is_attached(SurfaceId::intern("defaultCanvas0")));
    }

    #[test]
    fn accelerated_canvas_evicts_foreign_reserved_surface() {
        let mut display = MemoryDisplay::new();
        display.insert_foreign("defaultCanvas0");
        let mut sketch = Sketch::new(display, Default::default()).unwrap();

        let canvas = sketch.create_canvas(10.0, 10.0, Backend::Accelerated3d).unwrap();

        let id = SurfaceId::intern("defaultCanvas0");
        assert_eq!(canvas.borrow().id(), id);
        assert_eq!(sketch.host().len(), 1);
        assert!(sketch.host().get(id).is_some_and(|n| !n.foreign));
    }

    #[test]
    fn degenerate_dimensions_are_not_errors() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(-5.0, 0.0, Backend::Rasterized2d).unwrap();
        assert!(canvas.borrow().surface().is_degenerate());
        assert_eq!((canvas.borrow().width(), canvas.borrow().height()), (0, 0));
    }

    #[test]
    fn rejected_arguments_leave_sketch_untouched() {
        let mut sketch = Sketch::headless();
        let err = sketch
            .create_canvas(f64::NAN, 10.0, Backend::Rasterized2d)
            .unwrap_err();
        assert!(matches!(err, EaselError::Validation { ref call, .. } if call == "createCanvas"));
        assert!(sketch.default_renderer().is_none());
        assert!(sketch.host().is_empty());
    }

    #[test]
    fn pixel_density_scales_backing_store() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(40.0, 30.0, Backend::Rasterized2d).unwrap();
        sketch.set_pixel_density(2.0).unwrap();

        let id = canvas.borrow().id();
        assert_eq!((canvas.borrow().width(), canvas.borrow().height()), (40, 30));
        let node = sketch.host().get(id).cloned().unwrap();
        assert_eq!((node.width, node.height), (80, 60));
        assert_eq!(node.display_size, (40, 30));
        assert!(sketch.set_pixel_density(0.0).is_err());
        assert_eq!(sketch.pixel_density(), 2.0);
    }

    #[test]
    fn oversized_canvas_is_rejected_without_side_effects() {
        let mut sketch = Sketch::headless();
        let err = sketch
            .create_canvas(1e10, 1e10, Backend::Rasterized2d)
            .unwrap_err();
        assert!(matches!(err, EaselError::Validation { ref call, .. } if call == "createCanvas"));
        assert!(sketch.default_renderer().is_none());
        assert!(sketch.host().is_empty());
        assert!(sketch.registry().is_empty());
    }

    #[test]
    fn oversized_resize_keeps_current_size() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(10.0, 10.0, Backend::Rasterized2d).unwrap();
        assert!(sketch.resize_canvas(1e10, 1e10, true).is_err());
        assert_eq!((canvas.borrow().width(), canvas.borrow().height()), (10, 10));
        assert_eq!((sketch.width(), sketch.height()), (10, 10));
    }

    #[test]
    fn oversized_graphics_are_rejected() {
        let mut sketch = Sketch::headless();
        assert!(sketch.create_graphics(1e10, 4.0, Backend::Rasterized2d).is_err());
        assert!(sketch.create_graphics(20_000.0, 4.0, Backend::Accelerated3d).is_err());
        assert!(sketch.host().is_empty());
    }

    #[test]
    fn density_that_overflows_texture_limits_is_refused() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(5000.0, 10.0, Backend::Accelerated3d).unwrap();
        assert!(sketch.set_pixel_density(2.0).is_err());
        assert_eq!(sketch.pixel_density(), 1.0);
        assert_eq!(canvas.borrow().as_3d().map(|c| c.drawing_buffer_width()), Some(5000));
    }

    #[test]
    fn graphics_are_attached_offscreen() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(10.0, 10.0, Backend::Rasterized2d).unwrap();
        let buffer = sketch.create_graphics(5.0, 5.0, Backend::Rasterized2d).unwrap();
        let node = |id| sketch.host().get(id).map(|n| n.offscreen);
        assert_eq!(node(buffer.borrow().id()), Some(true));
        assert_eq!(node(canvas.borrow().id()), Some(false));
    }

    #[test]
    fn graphics_ids_are_never_reused() {
        let mut sketch = Sketch::headless();
        let first = sketch.create_graphics(5.0, 5.0, Backend::Rasterized2d).unwrap();
        let first_id = first.borrow().id();
        assert!(sketch.remove_graphics(&first));
        let second = sketch.create_graphics(5.0, 5.0, Backend::Rasterized2d).unwrap();

        assert_eq!(first_id, SurfaceId::intern("graphics0"));
        assert_eq!(second.borrow().id(), SurfaceId::intern("graphics1"));
        assert!(!sketch.remove_graphics(&first));
    }

    #[test]
    fn remove_graphics_refuses_default_canvas() {
        let mut sketch = Sketch::headless();
        let canvas = sketch.create_canvas(5.0, 5.0, Backend::Rasterized2d).unwrap();
        assert!(!sketch.remove_graphics(&canvas));
        assert!(sketch.default_renderer().is_some_and(|d| Rc::ptr_eq(&d, &canvas)));
    }
}
