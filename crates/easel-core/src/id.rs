use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for surface ids. Ids are compared far more often
/// than they are created (every registry lookup, every display-tree scan).
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identity of a drawable surface in the display tree, e.g. `defaultCanvas0`.
/// Backed by a 4-byte `Spur`, so it is `Copy` and hashes cheaply.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(Spur);

impl SurfaceId {
    /// Intern a string as a SurfaceId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        SurfaceId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Numbered id slot under `prefix` (`defaultCanvas` + 2 → `defaultCanvas2`).
    pub fn slot(prefix: &str, index: usize) -> Self {
        Self::intern(&format!("{prefix}{index}"))
    }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SurfaceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SurfaceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SurfaceId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let a = SurfaceId::intern("sketch_host");
        let b = SurfaceId::intern("sketch_host");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "sketch_host");
    }

    #[test]
    fn slots_are_numbered() {
        let id = SurfaceId::slot("defaultCanvas", 3);
        assert_eq!(id.as_str(), "defaultCanvas3");
        assert_eq!(id, SurfaceId::intern("defaultCanvas3"));
    }

    #[test]
    fn debug_and_display_differ() {
        let id = SurfaceId::intern("graphics7");
        assert_eq!(format!("{id}"), "graphics7");
        assert_eq!(format!("{id:?}"), "#graphics7");
    }
}
