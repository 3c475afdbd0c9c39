//! # Page Geometry
//!
//! Pure derivation from [`PageConfig`] to the two numbers the rest of the
//! engine reasons in: how much content fits on one page, and how tall the
//! synthetic block between two pages is. Nothing here touches the surface;
//! this module is deterministic arithmetic and nothing else.

use crate::config::PageConfig;

/// Derived page measurements, recomputed only when configuration changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Vertical space available to document content on each page.
    ///
    /// Clamped to at least 1 so a misconfigured page (chrome taller than the
    /// page itself) degrades to "everything on tiny pages" instead of
    /// dividing by zero or producing negative page counts.
    pub usable_content_height: f64,

    /// Total height of one page-break block: the footer closing the page
    /// above, the inter-page gap, and the header opening the page below,
    /// margins included.
    pub breaker_block_height: f64,

    /// Offset from the overlay root to the top of page one's content area.
    /// Page one has no breaker above it; the standalone leading header band
    /// occupies exactly this space.
    pub first_page_offset: f64,
}

impl PageGeometry {
    /// Derive geometry from configuration. Pure; no failure modes.
    pub fn derive(config: &PageConfig) -> Self {
        let top = config.top_inset();
        let bottom = config.bottom_inset();
        let usable = (config.page_height - top - bottom).max(1.0);
        Self {
            usable_content_height: usable,
            breaker_block_height: bottom + config.page_gap + top,
            first_page_offset: config.header_height,
        }
    }
}
