//! # Simulated Editing Surface
//!
//! An in-memory [`EditorSurface`] with the same layout behavior the engine
//! sees in a real host: content blocks flow top to bottom below the leading
//! header band, breaker blocks sit at the offsets the installed overlay
//! prescribes, and marker heights take effect immediately, shifting every
//! block after them exactly as inline heights do in a live render tree.
//!
//! This is the host used by the CLI and the integration tests. It is also
//! a worked reference for real host integrations: every trait method shows
//! what the engine expects the answer to mean.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::PageConfig;
use crate::engine::PaginationEngine;
use crate::error::SurfaceError;
use crate::overlay::PageBreakOverlay;
use crate::reflow::Wake;
use crate::surface::{Change, EditorSurface, NodeId, NodeRole, Rect, SurfaceId};

/// Rendered height of a marker that has no applied inline height yet
/// (the node's natural chrome: icon, label, padding).
const MARKER_NATURAL_HEIGHT: f64 = 40.0;

const SURFACE_WIDTH: f64 = 600.0;

/// One content-level block on the simulated surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimBlock {
    /// An ordinary rendered content block of fixed height.
    Content { height: f64 },
    /// A manual page-break marker. Its height is whatever the engine last
    /// applied, or the natural chrome height before any write.
    Marker {
        #[serde(skip)]
        applied: Option<f64>,
    },
}

impl SimBlock {
    pub fn content(height: f64) -> Self {
        Self::Content { height }
    }

    pub fn marker() -> Self {
        Self::Marker { applied: None }
    }

    fn rendered_height(&self) -> f64 {
        match self {
            Self::Content { height } => *height,
            Self::Marker { applied } => applied.unwrap_or(MARKER_NATURAL_HEIGHT),
        }
    }
}

/// A scenario the CLI can load from JSON: a page setup plus a document
/// described as block heights and break markers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub config: PageConfig,
    pub blocks: Vec<SimBlock>,
}

/// In-memory editing surface.
#[derive(Debug)]
pub struct SimSurface {
    id: SurfaceId,
    blocks: Vec<(NodeId, SimBlock)>,
    overlay: Option<PageBreakOverlay>,
    overlay_root: Option<NodeId>,
    breaker_ids: Vec<NodeId>,
    next_id: u64,
    /// Every `set_height` call, including restores. Tests use this to pin
    /// down the idempotent-write discipline.
    pub write_count: usize,
}

impl SimSurface {
    pub fn new(id: u64, blocks: Vec<SimBlock>) -> Self {
        let mut next_id = 1;
        let blocks = blocks
            .into_iter()
            .map(|b| {
                let id = NodeId(next_id);
                next_id += 1;
                (id, b)
            })
            .collect();
        Self {
            id: SurfaceId(id),
            blocks,
            overlay: None,
            overlay_root: None,
            breaker_ids: Vec::new(),
            next_id,
            write_count: 0,
        }
    }

    /// Marker node ids, in document order.
    pub fn markers(&self) -> Vec<NodeId> {
        self.blocks
            .iter()
            .filter(|(_, b)| matches!(b, SimBlock::Marker { .. }))
            .map(|(id, _)| *id)
            .collect()
    }

    /// The currently installed overlay, if any.
    pub fn overlay(&self) -> Option<&PageBreakOverlay> {
        self.overlay.as_ref()
    }

    /// Append a content block, as an edit would.
    pub fn push_content(&mut self, height: f64) {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.blocks.push((id, SimBlock::content(height)));
    }

    /// Remove the last content-level block.
    pub fn pop_block(&mut self) {
        self.blocks.pop();
    }

    /// Detach a node outright, simulating a concurrent edit removing it
    /// mid-pass.
    pub fn detach(&mut self, node: NodeId) {
        self.blocks.retain(|(id, _)| *id != node);
    }

    fn content_origin(&self) -> f64 {
        self.overlay
            .as_ref()
            .map_or(0.0, |o| o.leading_header.height)
    }

    fn block_rect(&self, node: NodeId) -> Option<Rect> {
        let mut y = self.content_origin();
        for (id, block) in &self.blocks {
            let height = block.rendered_height();
            if *id == node {
                return Some(Rect {
                    top: y,
                    height,
                    width: SURFACE_WIDTH,
                });
            }
            y += height;
        }
        None
    }

    fn breaker_rect(&self, node: NodeId) -> Option<Rect> {
        let overlay = self.overlay.as_ref()?;
        let mut y = 0.0;
        for (structure, id) in overlay.structures.iter().zip(&self.breaker_ids) {
            y += structure.page_box.top_offset;
            if *id == node {
                return Some(Rect {
                    top: y,
                    height: structure.breaker.height,
                    width: SURFACE_WIDTH,
                });
            }
            y += structure.breaker.height;
        }
        None
    }
}

impl EditorSurface for SimSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn measure(&self, node: NodeId) -> Result<Rect, SurfaceError> {
        if self.overlay_root == Some(node) {
            if let Some(overlay) = self.overlay.as_ref() {
                return Ok(Rect {
                    top: 0.0,
                    height: overlay.min_surface_height,
                    width: SURFACE_WIDTH,
                });
            }
        }
        self.breaker_rect(node)
            .or_else(|| self.block_rect(node))
            .ok_or(SurfaceError::Detached(node))
    }

    fn nodes(&self, role: NodeRole) -> Vec<NodeId> {
        match role {
            NodeRole::OverlayRoot => self.overlay_root.into_iter().collect(),
            NodeRole::BreakerBlock => self.breaker_ids.clone(),
            NodeRole::BreakMarker => self.markers(),
        }
    }

    fn nodes_under(&self, root: NodeId, role: NodeRole) -> Vec<NodeId> {
        if self.overlay_root == Some(root) && role == NodeRole::BreakerBlock {
            self.breaker_ids.clone()
        } else {
            Vec::new()
        }
    }

    fn overlay_root_for(&self, _node: NodeId) -> Option<NodeId> {
        // Markers live in document content, outside the overlay subtree;
        // callers fall back to the surface's first overlay root.
        None
    }

    fn content_height(&self) -> f64 {
        self.blocks.iter().map(|(_, b)| b.rendered_height()).sum()
    }

    fn content_bottom(&self) -> f64 {
        self.content_origin() + self.content_height()
    }

    fn install_overlay(&mut self, overlay: PageBreakOverlay) {
        // Old overlay nodes become invalid, as replaced render nodes would.
        let root = NodeId(self.next_id);
        self.next_id += 1;
        self.breaker_ids = overlay
            .structures
            .iter()
            .map(|_| {
                let id = NodeId(self.next_id);
                self.next_id += 1;
                id
            })
            .collect();
        self.overlay_root = Some(root);
        self.overlay = Some(overlay);
    }

    fn applied_height(&self, marker: NodeId) -> Option<f64> {
        self.blocks.iter().find_map(|(id, b)| match b {
            SimBlock::Marker { applied } if *id == marker => *applied,
            _ => None,
        })
    }

    fn set_height(&mut self, marker: NodeId, height: f64) {
        self.write_count += 1;
        for (id, block) in &mut self.blocks {
            if *id == marker {
                if let SimBlock::Marker { applied } = block {
                    *applied = Some(height);
                }
            }
        }
    }
}

/// Drive the engine against a simulated surface until marker heights reach
/// a fixed point, honoring every wake request along the way. Each round
/// after the first is fed as a decorations-only change, the notification a
/// real host fires when the engine's own writes land.
///
/// Returns the number of change rounds it took to settle.
pub fn drive_to_quiescence(
    engine: &mut PaginationEngine,
    surface: &mut SimSurface,
    start: Instant,
) -> usize {
    let mut now = start;
    let mut change = Change::content();

    for round in 1..=16 {
        let mut wake = engine.handle_change(surface, change, now);
        while let Some(w) = wake {
            wake = match w {
                Wake::TimerAt(deadline) => {
                    now = deadline;
                    engine.on_timer(surface, now)
                }
                Wake::Frame => engine.on_frame(surface),
            };
        }
        let stable = engine
            .last_pass_report(surface.id())
            .is_some_and(|r| r.is_stable());
        if stable {
            return round;
        }
        change = Change::decorations_only();
    }
    16
}
