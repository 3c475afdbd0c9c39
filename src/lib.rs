//! # Folio
//!
//! A live pagination overlay engine.
//!
//! Most pagination engines own the layout: they decide where every line
//! goes, so page boundaries fall out of the math. Folio works in the
//! opposite direction, inside a live editable surface it does not control.
//! The host renders a continuously-flowing document; Folio **reads the
//! rendered geometry back** and infers pages from it: estimating how many
//! pages the content needs, synthesizing the header bands, footer bands and
//! inter-page gaps at the right offsets, and sizing manual "break here"
//! markers so everything after them starts on a fresh page.
//!
//! Document content is never touched. The engine's only outputs are a
//! presentational overlay tree and per-marker inline heights, and both are
//! regenerated from content and configuration alone; nothing it produces
//! may ever be persisted with the document.
//!
//! ## Architecture
//!
//! ```text
//! Host edit
//!     ↓ change notification
//! [estimate]  incremental page-count estimation with hysteresis
//!     ↓ count changed?
//! [overlay]   wholesale page-break structure synthesis
//!     ↓ (independently, debounced)
//! [reflow]    ordered, idempotent marker height resolution
//!     ↓
//! [surface]   the host seam: measure, query, install, set height
//! ```
//!
//! The engine is host-driven and single-threaded: entry points on
//! [`PaginationEngine`] return [`Wake`] requests (arm a timer, call back
//! next frame) instead of blocking, and the host calls back on its own
//! cooperative scheduler.

pub mod config;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod geometry;
pub mod marker;
pub mod overlay;
pub mod reflow;
pub mod sim;
pub mod surface;

pub use config::PageConfig;
pub use engine::PaginationEngine;
pub use error::SurfaceError;
pub use geometry::PageGeometry;
pub use overlay::{build_overlay, PageBreakOverlay};
pub use reflow::{PassReport, Wake};
pub use surface::{Change, ChangeOrigin, EditorSurface, NodeId, NodeRole, Rect, SurfaceId};
