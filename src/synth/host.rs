//! The editor surface the engine reads from and writes to.

use serde::Serialize;

use crate::errors::HostError;
use crate::types::{BBox, Zoom};

use super::ShapeId;
use super::anchors::ConnectionAnchor;
use super::shapes::{GeometryKind, ShapeKind};

/// An existing shape as the host reports it
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasShape {
    pub id: ShapeId,
    pub geometry: GeometryKind,
    /// Page-space bounding box
    pub bounds: BBox,
}

/// Which end of a directional shape a binding attaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    Start,
    End,
}

/// Attaches `terminal` of shape `from` to `anchor` on shape `to`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub from: ShapeId,
    pub to: ShapeId,
    pub terminal: Terminal,
    pub anchor: ConnectionAnchor,
}

/// Opaque undo checkpoint handed out by [`EditorHost::mark`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryMark(pub u64);

/// Commands and queries the engine needs from the host editor.
///
/// Methods take `&self`: hosts are single-threaded UI surfaces and keep
/// their own interior mutability.
pub trait EditorHost {
    fn zoom(&self) -> Zoom;

    /// Every shape on the current page, in a stable order
    fn shapes(&self) -> Vec<CanvasShape>;

    fn create_shape(&self, shape: &ShapeKind) -> Result<ShapeId, HostError>;

    fn create_binding(&self, binding: &Binding) -> Result<(), HostError>;

    fn delete_shape(&self, id: ShapeId) -> Result<(), HostError>;

    fn mark(&self) -> HistoryMark;

    /// Undo everything since `mark`
    fn bail_to_mark(&self, mark: HistoryMark);
}
