//! The sketch's element list.
//!
//! Records which renderers are attached, in attachment order. Membership
//! only: entries are weak, so a released offscreen buffer simply stops being
//! live and is pruned on the next [`RendererRegistry::prune`].

use easel_core::SurfaceId;
use easel_render::Renderer;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared handle to a renderer. Sketches are single-threaded.
pub type RendererRef = Rc<RefCell<Renderer>>;

#[derive(Debug)]
struct Entry {
    id: SurfaceId,
    renderer: Weak<RefCell<Renderer>>,
}

impl Entry {
    fn is(&self, renderer: &RendererRef) -> bool {
        std::ptr::eq(self.renderer.as_ptr(), Rc::as_ptr(renderer))
    }
}

#[derive(Debug, Default)]
pub struct RendererRegistry {
    entries: SmallVec<[Entry; 4]>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `renderer`. Registering twice is a no-op.
    pub fn register(&mut self, renderer: &RendererRef) {
        if self.contains(renderer) {
            return;
        }
        let id = renderer.borrow().id();
        self.entries.push(Entry {
            id,
            renderer: Rc::downgrade(renderer),
        });
    }

    /// Remove `renderer`. Returns whether it was registered.
    pub fn remove(&mut self, renderer: &RendererRef) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| !entry.is(renderer));
        before != self.entries.len()
    }

    pub fn contains(&self, renderer: &RendererRef) -> bool {
        self.entries.iter().any(|entry| entry.is(renderer))
    }

    /// Drop entries whose renderer has been released and return their
    /// surface ids, so the caller can detach them.
    pub fn prune(&mut self) -> Vec<SurfaceId> {
        let dead: Vec<SurfaceId> = self
            .entries
            .iter()
            .filter(|entry| entry.renderer.strong_count() == 0)
            .map(|entry| entry.id)
            .collect();
        self.entries.retain(|entry| entry.renderer.strong_count() > 0);
        dead
    }

    /// Live renderers in attachment order.
    pub fn live(&self) -> Vec<RendererRef> {
        self.entries
            .iter()
            .filter_map(|entry| entry.renderer.upgrade())
            .collect()
    }

    /// Live renderer owning the surface `id`.
    pub fn find(&self, id: SurfaceId) -> Option<RendererRef> {
        self.entries
            .iter()
            .filter(|entry| entry.id == id)
            .find_map(|entry| entry.renderer.upgrade())
    }

    /// Number of live renderers.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.renderer.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
