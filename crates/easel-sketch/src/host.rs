//! Display-tree collaborators.
//!
//! The sketch never touches visible pixels itself. It asks a [`SurfaceFactory`]
//! for surfaces and tells a [`DisplayHost`] where they live. [`MemoryDisplay`]
//! implements both in memory for headless sketches and tests; the WASM
//! bridge implements them against the browser DOM.

use easel_core::{SurfaceHandle, SurfaceId};

/// The tree that owns visible surfaces.
pub trait DisplayHost {
    /// Insert `surface` under `container` (document root when `None`). If
    /// the surface is already attached it is moved, not duplicated.
    fn attach(&mut self, surface: &SurfaceHandle, container: Option<&str>);

    /// Insert an offscreen buffer. Offscreen surfaces take no part in the
    /// visible layout.
    fn attach_offscreen(&mut self, surface: &SurfaceHandle, container: Option<&str>) {
        self.attach(surface, container);
    }

    /// Remove the surface with `id`. Returns whether it was attached.
    fn detach(&mut self, id: SurfaceId) -> bool;

    fn set_visible(&mut self, id: SurfaceId, visible: bool);

    /// Mirror a surface's size after a resize: the surface carries the
    /// backing size, `logical` the size it is displayed at.
    fn sync_size(&mut self, _surface: &SurfaceHandle, _logical: (u32, u32)) {}
}

/// Allocation and lookup of surfaces by id.
pub trait SurfaceFactory {
    fn create_surface(&mut self, id: SurfaceId) -> SurfaceHandle {
        SurfaceHandle::new(id)
    }

    /// Whether a surface with `id` is present, including surfaces the sketch
    /// did not create.
    fn has_surface(&self, id: SurfaceId) -> bool;
}

// ─── In-memory display ───────────────────────────────────────────────────

/// One node of a [`MemoryDisplay`].
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub id: SurfaceId,
    pub container: Option<String>,
    pub visible: bool,
    /// Backing size in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Displayed size in logical pixels.
    pub display_size: (u32, u32),
    pub offscreen: bool,
    /// Inserted directly rather than through a sketch.
    pub foreign: bool,
}

/// Display tree kept in memory, in attachment order.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    nodes: Vec<DisplayNode>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a surface the sketch did not create, such as a page's own
    /// canvas element that happens to use a reserved id.
    pub fn insert_foreign(&mut self, id: &str) {
        self.nodes.push(DisplayNode {
            id: SurfaceId::intern(id),
            container: None,
            visible: true,
            width: 0,
            height: 0,
            display_size: (0, 0),
            offscreen: false,
            foreign: true,
        });
    }

    pub fn get(&self, id: SurfaceId) -> Option<&DisplayNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_attached(&self, id: SurfaceId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<SurfaceId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn get_mut(&mut self, id: SurfaceId) -> Option<&mut DisplayNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn insert(&mut self, surface: &SurfaceHandle, container: Option<&str>, offscreen: bool) {
        let id = surface.id();
        let previous = self.get(id).map(|n| (n.foreign, n.display_size));
        self.detach(id);
        self.nodes.push(DisplayNode {
            id,
            container: container.map(str::to_string),
            visible: surface.visible(),
            width: surface.width(),
            height: surface.height(),
            display_size: previous.map_or((surface.width(), surface.height()), |(_, size)| size),
            offscreen,
            foreign: previous.is_some_and(|(foreign, _)| foreign),
        });
    }
}

impl DisplayHost for MemoryDisplay {
    fn attach(&mut self, surface: &SurfaceHandle, container: Option<&str>) {
        self.insert(surface, container, false);
    }

    fn attach_offscreen(&mut self, surface: &SurfaceHandle, container: Option<&str>) {
        self.insert(surface, container, true);
    }

    fn detach(&mut self, id: SurfaceId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        before != self.nodes.len()
    }

    fn set_visible(&mut self, id: SurfaceId, visible: bool) {
        if let Some(node) = self.get_mut(id) {
            node.visible = visible;
        }
    }

    fn sync_size(&mut self, surface: &SurfaceHandle, logical: (u32, u32)) {
        if let Some(node) = self.get_mut(surface.id()) {
            node.width = surface.width();
            node.height = surface.height();
            node.display_size = logical;
        }
    }
}

impl SurfaceFactory for MemoryDisplay {
    fn has_surface(&self, id: SurfaceId) -> bool {
        self.is_attached(id)
    }
}
