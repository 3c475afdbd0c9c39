//! # The Reflow Scheduler
//!
//! Resolving one marker's height is easy ([`crate::marker`]). Resolving all
//! of them on a live surface is where the traps are:
//!
//! - Change notifications arrive in bursts (typing, paste, undo). Running a
//!   pass per notification would measure mid-layout garbage. Passes are
//!   debounced behind a short window.
//! - A freshly fired pass can still observe a render that reflects
//!   pre-edit layout. Measurement waits for the *second* of two consecutive
//!   rendering-settlement callbacks; the first may be stale, the second is
//!   not.
//! - Writing a marker's height moves every marker below it. Markers are
//!   resolved strictly in visual top-to-bottom order, each height applied
//!   before the next marker is measured.
//! - Writing a height fires the very change notification that schedules
//!   reflow. The write discipline is idempotent: reset, re-measure, and
//!   write only when the value actually differs, so a stable layout reaches a
//!   fixed point where no write happens and the loop starves out.
//!
//! The scheduler owns no event loop. It hands the host [`Wake`] requests
//! (arm this timer, call me next frame) and the host calls back; everything
//! stays on the host's single cooperative thread.

use std::time::{Duration, Instant};

use crate::geometry::PageGeometry;
use crate::marker::{resolve_marker_height, MIN_MARKER_HEIGHT};
use crate::surface::{EditorSurface, NodeRole};
use log::{debug, trace, warn};

/// Debounce window for coalescing change-notification bursts.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(120);

/// Settlement callbacks to wait for before measuring.
const SETTLEMENT_FRAMES: u8 = 2;

/// A deferred callback the host owes the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Call `on_timer` at or after this deadline. A newer `TimerAt`
    /// replaces any earlier one; stale firings are ignored by deadline.
    TimerAt(Instant),
    /// Call `on_frame` after the next rendering-settlement point.
    Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    PendingDebounce,
    Applying,
}

/// What `on_frame` decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No pass is in flight; the callback was stale.
    NotApplying,
    /// First settlement frame observed; one more is needed.
    AwaitNext,
    /// Layout has settled; run the measurement pass now.
    RunPass,
}

/// Per-surface scheduler state: `Idle -> PendingDebounce -> Applying -> Idle`.
///
/// Created when the first marker mounts under a surface, torn down with the
/// surface. At most one pass is applying at a time; requests that arrive
/// while one is in flight are coalesced, never queued.
#[derive(Debug)]
pub struct ReflowState {
    phase: Phase,
    deadline: Option<Instant>,
    frames_seen: u8,
}

impl Default for ReflowState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReflowState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            deadline: None,
            frames_seen: 0,
        }
    }

    pub fn is_applying(&self) -> bool {
        self.phase == Phase::Applying
    }

    /// A change notification arrived. Resets the debounce window unless a
    /// pass is already applying (that pass will measure post-change layout
    /// anyway, so the request is coalesced into it).
    pub fn request(&mut self, now: Instant) -> Option<Wake> {
        match self.phase {
            Phase::Idle | Phase::PendingDebounce => {
                let deadline = now + DEBOUNCE_WINDOW;
                self.phase = Phase::PendingDebounce;
                self.deadline = Some(deadline);
                trace!("reflow requested, debounce until {:?}", deadline);
                Some(Wake::TimerAt(deadline))
            }
            Phase::Applying => {
                trace!("reflow requested while applying; coalesced");
                None
            }
        }
    }

    /// The debounce timer fired. Stale firings (a newer request re-armed
    /// the window) and firings during an in-flight pass are dropped.
    pub fn on_timer(&mut self, now: Instant) -> Option<Wake> {
        match (self.phase, self.deadline) {
            (Phase::PendingDebounce, Some(deadline)) if now >= deadline => {
                self.phase = Phase::Applying;
                self.deadline = None;
                self.frames_seen = 0;
                debug!("reflow debounce elapsed; awaiting settlement");
                Some(Wake::Frame)
            }
            _ => None,
        }
    }

    /// A rendering-settlement callback arrived.
    pub fn on_frame(&mut self) -> FrameOutcome {
        if self.phase != Phase::Applying {
            return FrameOutcome::NotApplying;
        }
        self.frames_seen += 1;
        if self.frames_seen < SETTLEMENT_FRAMES {
            FrameOutcome::AwaitNext
        } else {
            FrameOutcome::RunPass
        }
    }

    /// Release the applying lock. Must run on every pass exit path,
    /// success or not, or the surface can never reflow again.
    pub fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.deadline = None;
        self.frames_seen = 0;
    }
}

/// Result of one measurement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassReport {
    /// Markers whose applied height actually changed.
    pub changed: usize,
    /// Markers that fell back to the minimum height (missing overlay
    /// context or measurement failure).
    pub degraded: usize,
}

impl PassReport {
    /// True when the pass reached the fixed point: nothing was written.
    pub fn is_stable(&self) -> bool {
        self.changed == 0
    }
}

/// Resolve and apply heights for every marker under the surface, in visual
/// top-to-bottom order. Never propagates an error: a marker that cannot be
/// measured falls back to the minimum height and the pass continues.
pub fn apply_marker_heights(
    surface: &mut impl EditorSurface,
    geometry: &PageGeometry,
) -> PassReport {
    let mut report = PassReport::default();

    // Collect and order by current visual position. A marker that cannot
    // be measured even for ordering degrades immediately.
    let mut ordered = Vec::new();
    for marker in surface.nodes(NodeRole::BreakMarker) {
        match surface.measure(marker) {
            Ok(rect) => ordered.push((marker, rect.top)),
            Err(e) => {
                warn!("marker {:?} unmeasurable, keeping minimum: {}", marker, e);
                let prior = surface.applied_height(marker);
                surface.set_height(marker, MIN_MARKER_HEIGHT);
                report.degraded += 1;
                if prior != Some(MIN_MARKER_HEIGHT) {
                    report.changed += 1;
                }
            }
        }
    }
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1));

    for (marker, _) in ordered {
        let prior = surface.applied_height(marker);

        // Neutral reset before measuring, so the marker's own previous
        // height doesn't distort which page it appears to sit on.
        surface.set_height(marker, MIN_MARKER_HEIGHT);

        let resolved = match resolve_marker_height(surface, marker, geometry) {
            Ok(Some(height)) => height,
            Ok(None) => {
                // No overlay context; stay at the minimum.
                report.degraded += 1;
                if prior != Some(MIN_MARKER_HEIGHT) {
                    report.changed += 1;
                }
                continue;
            }
            Err(e) => {
                warn!("marker {:?} resolution failed, keeping minimum: {}", marker, e);
                report.degraded += 1;
                if prior != Some(MIN_MARKER_HEIGHT) {
                    report.changed += 1;
                }
                continue;
            }
        };

        if prior == Some(resolved) {
            // Byte-for-byte restore; no net change, no notification churn.
            surface.set_height(marker, resolved);
        } else {
            trace!(
                "marker {:?}: {} -> {:.1}",
                marker,
                prior.map_or("unset".to_string(), |h| format!("{h:.1}")),
                resolved
            );
            surface.set_height(marker, resolved);
            report.changed += 1;
        }
    }

    debug!(
        "reflow pass: {} changed, {} degraded",
        report.changed, report.degraded
    );
    report
}
