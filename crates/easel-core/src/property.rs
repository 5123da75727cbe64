//! Scalar context properties and the snapshot/restore pass that carries them
//! across a destructive resize.
//!
//! Resizing a backend context resets it to defaults. Anything a sketch set
//! on the context (stroke color, line width, compositing mode…) is captured
//! first as a [`PropertySnapshot`], then written back with
//! [`restore_snapshot`]. Properties the backend refuses are skipped.

use crate::color::Color;
use crate::error::PropertyError;
use serde::{Deserialize, Serialize};

// ─── Values ──────────────────────────────────────────────────────────────

/// A scalar (non-object, non-callable) context property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Bool(bool),
    Text(String),
    /// Full-precision color. Hex text would round every channel to 8 bits.
    Color(Color),
}

impl Scalar {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// A color, or hex text that parses as one.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Scalar::Color(c) => Some(*c),
            Scalar::Text(s) => Color::from_hex(s),
            _ => None,
        }
    }

    /// Extract a number or report a type mismatch for `key`.
    pub fn expect_number(&self, key: &str) -> Result<f64, PropertyError> {
        self.as_number().ok_or_else(|| mismatch(key, "number"))
    }

    /// Extract a bool or report a type mismatch for `key`.
    pub fn expect_bool(&self, key: &str) -> Result<bool, PropertyError> {
        self.as_bool().ok_or_else(|| mismatch(key, "boolean"))
    }

    /// Extract text or report a type mismatch for `key`.
    pub fn expect_text(&self, key: &str) -> Result<&str, PropertyError> {
        self.as_text().ok_or_else(|| mismatch(key, "string"))
    }

    /// Extract a color or report why `key` cannot take this value.
    pub fn expect_color(&self, key: &str) -> Result<Color, PropertyError> {
        match self {
            Scalar::Text(s) => Color::from_hex(s).ok_or_else(|| PropertyError::InvalidValue {
                key: key.to_string(),
                value: s.clone(),
            }),
            other => other.as_color().ok_or_else(|| mismatch(key, "color")),
        }
    }
}

fn mismatch(key: &str, expected: &'static str) -> PropertyError {
    PropertyError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<Color> for Scalar {
    fn from(c: Color) -> Self {
        Scalar::Color(c)
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────

/// Ordered capture of a context's scalar properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySnapshot {
    entries: Vec<(&'static str, Scalar)>,
}

impl PropertySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl Into<Scalar>) {
        self.entries.push((key, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Scalar)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Context access ──────────────────────────────────────────────────────

/// Reflective access to a backend context's scalar state.
pub trait ScalarProperties {
    /// Capture every scalar property currently set, read-only ones included.
    fn scalar_properties(&self) -> PropertySnapshot;

    /// Write one property.
    fn set_scalar(&mut self, key: &str, value: Scalar) -> Result<(), PropertyError>;

    fn get_scalar(&self, key: &str) -> Option<Scalar> {
        self.scalar_properties().get(key).cloned()
    }
}

/// Best-effort re-application of a snapshot. Returns how many properties
/// were written; refusals are logged and skipped.
pub fn restore_snapshot<C>(ctx: &mut C, snapshot: &PropertySnapshot) -> usize
where
    C: ScalarProperties + ?Sized,
{
    let mut restored = 0;
    for (key, value) in snapshot.iter() {
        match ctx.set_scalar(key, value.clone()) {
            Ok(()) => restored += 1,
            Err(err) => log::debug!("resize: skipped restoring `{key}`: {err}"),
        }
    }
    restored
}
