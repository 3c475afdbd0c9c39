//! # Page-Count Estimation
//!
//! How many pages does the current content need? The obvious answer,
//! dividing total content height by usable page height on every change,
//! thrashes
//! badly while the author types near a page boundary: every keystroke
//! re-derives the count from scratch and sub-pixel layout jitter flips it
//! back and forth, rebuilding the overlay each time.
//!
//! So estimation is incremental. After the overlay exists, only the *gap*
//! between the bottom of the rendered content and the bottom of the last
//! page-break block matters: positive gap means content overflowed and
//! pages are added; a retreat deep enough past a dead zone removes pages.
//! Anything inside the dead zone keeps the current count (hysteresis).
//! The from-scratch division is used exactly once, on cold start.

use crate::config::PageConfig;
use crate::geometry::PageGeometry;
use log::debug;

/// Width of the hysteresis dead zone's near edge, in pixels. A retreat has
/// to get within this distance of a full page before pages are removed.
/// Tunable; empirically chosen.
pub const RETREAT_DEAD_ZONE_MARGIN: f64 = 10.0;

/// What the estimator can see of the installed overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayObservation {
    /// No overlay installed yet; estimate from total content height.
    Absent,
    /// Overlay installed; estimate from the gap past its last breaker.
    Present {
        /// Bottom edge of the last page-break block, surface coordinates.
        last_breaker_bottom: f64,
    },
}

/// Measured content extents, surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentMetrics {
    /// Total rendered height of document content.
    pub content_height: f64,
    /// Bottom edge of the last rendered content block.
    pub content_bottom: f64,
}

/// Estimate the page count for the current layout.
///
/// Idempotent for a stable gap: re-running with unchanged measurements
/// returns the same count, so estimation can fire on every change
/// notification without oscillating.
pub fn estimate_page_count(
    current: usize,
    overlay: OverlayObservation,
    geometry: &PageGeometry,
    config: &PageConfig,
    content: &ContentMetrics,
) -> usize {
    let usable = geometry.usable_content_height;

    let last_breaker_bottom = match overlay {
        OverlayObservation::Absent => {
            // Cold start: no overlay to diff against.
            let pages = (content.content_height / usable).ceil() as usize;
            let pages = pages.max(1);
            debug!(
                "page estimate (cold start): content {:.1}px / usable {:.1}px -> {} page(s)",
                content.content_height, usable, pages
            );
            return pages;
        }
        OverlayObservation::Present {
            last_breaker_bottom,
        } => last_breaker_bottom,
    };

    let gap = content.content_bottom - last_breaker_bottom;

    if gap > 0.0 {
        // Content overflowed the last page.
        let added = (gap / usable).ceil() as usize;
        debug!(
            "page estimate: overflow gap {:.1}px -> +{} page(s), {} total",
            gap,
            added,
            current + added
        );
        return current + added;
    }

    // Content retreated. Only collapse pages once the retreat clears the
    // dead zone; sub-pixel jitter around a boundary must not flip the count.
    if gap <= -(config.page_height - RETREAT_DEAD_ZONE_MARGIN) {
        let removed = (gap / (config.page_height + config.page_gap)).floor();
        let pages = (current as i64 + removed as i64).max(1) as usize;
        debug!(
            "page estimate: retreat gap {:.1}px -> {} page(s), {} total",
            gap, removed, pages
        );
        return pages;
    }

    current
}
