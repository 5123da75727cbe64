//! Browser display host: surfaces are `<canvas>` elements in the page.

use easel_core::{SurfaceHandle, SurfaceId};
use easel_sketch::{DisplayHost, SurfaceFactory};
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement};

const CANVAS_CLASS: &str = "easelCanvas";

/// Display host over a live `web_sys::Document`.
pub struct DomDisplay {
    document: Document,
    canvases: HashMap<SurfaceId, HtmlCanvasElement>,
}

impl DomDisplay {
    pub fn new() -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("easel: no document available"))?;
        Ok(Self {
            document,
            canvases: HashMap::new(),
        })
    }

    fn parent_for(&self, container: Option<&str>) -> Option<Element> {
        container
            .and_then(|id| self.document.get_element_by_id(id))
            .or_else(|| self.document.body().map(Element::from))
    }

    fn new_canvas(&self, id: SurfaceId) -> Result<HtmlCanvasElement, JsValue> {
        let canvas: HtmlCanvasElement = self.document.create_element("canvas")?.dyn_into()?;
        canvas.set_id(id.as_str());
        canvas.class_list().add_1(CANVAS_CLASS)?;
        Ok(canvas)
    }

    /// Append the element for `surface` to its container. appendChild moves
    /// an already attached node.
    fn append(&self, surface: &SurfaceHandle, container: Option<&str>) -> Option<&HtmlCanvasElement> {
        let Some(canvas) = self.canvases.get(&surface.id()) else {
            log::warn!("attach: {:?} has no canvas element", surface.id());
            return None;
        };
        let Some(parent) = self.parent_for(container) else {
            log::warn!("attach: no container for {:?}", surface.id());
            return None;
        };
        if let Err(e) = parent.append_child(canvas) {
            log::warn!("attach {:?}: {e:?}", surface.id());
        }
        Some(canvas)
    }
}

fn set_style(canvas: &HtmlCanvasElement, property: &str, value: &str) {
    if let Err(e) = canvas.style().set_property(property, value) {
        log::warn!("{}: setting {property}: {e:?}", canvas.id());
    }
}

impl DisplayHost for DomDisplay {
    fn attach(&mut self, surface: &SurfaceHandle, container: Option<&str>) {
        if self.append(surface, container).is_some() {
            self.set_visible(surface.id(), surface.visible());
        }
    }

    /// Offscreen buffers are removed from layout entirely; `visibility`
    /// would still reserve their box.
    fn attach_offscreen(&mut self, surface: &SurfaceHandle, container: Option<&str>) {
        if let Some(canvas) = self.append(surface, container) {
            set_style(canvas, "display", "none");
        }
    }

    fn detach(&mut self, id: SurfaceId) -> bool {
        if let Some(canvas) = self.canvases.remove(&id) {
            canvas.remove();
            return true;
        }
        match self.document.get_element_by_id(id.as_str()) {
            Some(element) => {
                element.remove();
                true
            }
            None => false,
        }
    }

    fn set_visible(&mut self, id: SurfaceId, visible: bool) {
        let Some(canvas) = self.canvases.get(&id) else {
            return;
        };
        set_style(canvas, "visibility", if visible { "visible" } else { "hidden" });
    }

    fn sync_size(&mut self, surface: &SurfaceHandle, (width, height): (u32, u32)) {
        if let Some(canvas) = self.canvases.get(&surface.id()) {
            canvas.set_width(surface.width());
            canvas.set_height(surface.height());
            set_style(canvas, "width", &format!("{width}px"));
            set_style(canvas, "height", &format!("{height}px"));
        }
    }
}

impl SurfaceFactory for DomDisplay {
    fn create_surface(&mut self, id: SurfaceId) -> SurfaceHandle {
        match self.new_canvas(id) {
            Ok(canvas) => {
                self.canvases.insert(id, canvas);
            }
            Err(e) => log::error!("create_surface {id:?}: {e:?}"),
        }
        SurfaceHandle::new(id)
    }

    fn has_surface(&self, id: SurfaceId) -> bool {
        self.canvases.contains_key(&id) || self.document.get_element_by_id(id.as_str()).is_some()
    }
}
