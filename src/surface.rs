//! # The Host Surface Seam
//!
//! The engine never owns a render tree. It reads measured geometry from the
//! host's editing surface and writes exactly two kinds of presentational
//! output back: the page-break overlay and per-marker inline heights. This
//! module is that boundary, expressed as one trait the host implements.
//!
//! Everything is addressed by opaque [`NodeId`] handles in a single shared
//! coordinate space (pixels from the top of the surface). The engine makes
//! no assumption about what a node *is* (DOM element, scene-graph item,
//! retained widget), only that it can be measured and enumerated by role.

use crate::error::SurfaceError;
use crate::overlay::PageBreakOverlay;

/// Opaque handle to a rendered node, minted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Opaque handle to one editing surface instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// A measured bounding box in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
    pub width: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The kinds of nodes the engine queries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Root of an installed page-break overlay.
    OverlayRoot,
    /// One footer+gap+header block inside an overlay.
    BreakerBlock,
    /// An author-inserted manual page-break marker.
    BreakMarker,
}

/// Why a change notification fired.
///
/// The host tags its own transactions so the engine can tell author edits
/// apart from the notifications its own overlay/height writes provoke.
/// This is the out-of-band signal flag from the host editor interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Document content changed (typing, paste, undo/redo).
    Content,
    /// Only presentational decorations changed; no content was touched.
    DecorationsOnly,
}

/// A change notification delivered by the host.
#[derive(Debug, Clone, Copy)]
pub struct Change {
    pub origin: ChangeOrigin,
}

impl Change {
    pub fn content() -> Self {
        Self {
            origin: ChangeOrigin::Content,
        }
    }

    pub fn decorations_only() -> Self {
        Self {
            origin: ChangeOrigin::DecorationsOnly,
        }
    }
}

/// What the engine needs from the host's editing surface.
///
/// Read side: measurement and role queries against the live render tree.
/// Write side: overlay installation and marker inline heights. The write
/// methods are the only way the engine mutates anything, and neither one
/// touches document content; round-tripping a saved document must
/// regenerate both from content and configuration alone.
pub trait EditorSurface {
    /// Identity of this surface, stable for its lifetime.
    fn id(&self) -> SurfaceId;

    /// Bounding box of a rendered node in surface coordinates.
    fn measure(&self, node: NodeId) -> Result<Rect, SurfaceError>;

    /// All nodes of the given role under the surface, in render order.
    fn nodes(&self, role: NodeRole) -> Vec<NodeId>;

    /// Nodes of the given role inside `root`, in render order.
    fn nodes_under(&self, root: NodeId, role: NodeRole) -> Vec<NodeId>;

    /// The nearest enclosing overlay root for `node`, if it sits under one.
    fn overlay_root_for(&self, node: NodeId) -> Option<NodeId>;

    /// Total rendered height of document content, overlay excluded.
    fn content_height(&self) -> f64;

    /// Bottom edge of the last rendered content block, surface coordinates.
    fn content_bottom(&self) -> f64;

    /// Replace the installed page-break overlay wholesale.
    fn install_overlay(&mut self, overlay: PageBreakOverlay);

    /// The inline height last applied to a marker, if any.
    fn applied_height(&self, marker: NodeId) -> Option<f64>;

    /// Write an inline height to a marker.
    fn set_height(&mut self, marker: NodeId, height: f64);
}
