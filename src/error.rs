//! Error types for the pagination engine.
//!
//! There is deliberately only one: measurement against a live render tree
//! can fail when a node is detached mid-pass. Every other failure mode in
//! the engine degrades to a safe fallback (minimum marker height, previous
//! page count) instead of surfacing an error; a visually imperfect page
//! break is preferable to a broken editing surface, so nothing here is ever
//! allowed to propagate out to the host editor.

use crate::surface::NodeId;
use thiserror::Error;

/// A failure reported by the host surface while the engine was reading it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The node was removed from the render tree (e.g. by a concurrent
    /// edit) between being collected and being measured.
    #[error("node {0:?} is no longer attached to the render tree")]
    Detached(NodeId),

    /// The node exists but has no rendered box yet.
    #[error("node {0:?} has not been rendered")]
    NotRendered(NodeId),
}
