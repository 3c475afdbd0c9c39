//! # Page-Break Overlay Synthesis
//!
//! The overlay is the visual fiction of pages: page boxes, footer bands,
//! inter-page gaps, header bands. None of it is document content. It is
//! owned entirely by the engine, handed to the render layer as data, and
//! must never survive into document serialization; a reloaded document
//! regenerates an identical overlay from content and configuration alone.
//!
//! Regeneration is wholesale. Page-count *estimation* is incremental (see
//! [`crate::estimate`]), but once the count changes the old overlay is
//! discarded and a new one built from scratch. Structures are cheap to
//! construct; reasoning about partial diffs of them is strictly harder than
//! rebuilding. That asymmetry is deliberate.
//!
//! Page numbers are never stored. Band text keeps its `{page}` token and
//! resolves it at render time from structure order, so structures stay
//! order-independent data.

use crate::config::{PageConfig, PAGE_TOKEN};
use crate::geometry::PageGeometry;
use serde::Serialize;

/// A band text template. Holds the raw template; `{page}` is substituted
/// when the render layer resolves it against a page number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BandText(pub String);

impl BandText {
    /// Render this template for the given 1-based page number.
    pub fn resolve(&self, page_number: usize) -> String {
        self.0.replace(PAGE_TOKEN, &page_number.to_string())
    }
}

/// A header or footer band: fixed height, left and right text templates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub height: f64,
    pub left: BandText,
    pub right: BandText,
}

/// The visual gap between two pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapBand {
    pub height: f64,
    pub border_size: f64,
    /// Fill and border color (CSS color string).
    pub background: String,
}

/// The empty box standing in for one page's content area. Its top offset
/// is the vertical distance from the previous structure (or the overlay
/// top, for the first structure) to this structure's breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBox {
    pub top_offset: f64,
}

/// One footer + gap + header block separating two pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerBlock {
    /// Total rendered height of this block, margins included. Always equal
    /// to the geometry's `breaker_block_height`.
    pub height: f64,
    /// Closes the page above. Resolves `{page}` to that page's number.
    pub footer: Band,
    pub gap: GapBand,
    /// Opens the page below.
    pub header: Band,
}

/// One repeating page structure: a page box followed by its breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStructure {
    pub page_box: PageBox,
    pub breaker: BreakerBlock,
}

/// The complete synthetic overlay for one surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreakOverlay {
    /// Standalone header for page one, which has no breaker above it to
    /// host one. Rendered once, before the repeating structures.
    pub leading_header: Band,
    /// One structure per page, in page order. Structure `i` closes page
    /// `i + 1` with its footer and opens page `i + 2` with its header.
    pub structures: Vec<PageStructure>,
    /// Standalone footer after the last page's content.
    pub trailing_footer: Band,
    /// Minimum height the host should give the scrollable surface so the
    /// trailing page chrome renders fully.
    pub min_surface_height: f64,
}

impl PageBreakOverlay {
    /// Page number shown by the footer of structure `index` (1-based).
    pub fn footer_page_number(index: usize) -> usize {
        index + 1
    }

    /// Page number shown by the header of structure `index` (1-based).
    pub fn header_page_number(index: usize) -> usize {
        index + 2
    }
}

/// Build the overlay for `page_count` pages. Pure construction; installing
/// the result is the host's job.
pub fn build_overlay(
    page_count: usize,
    geometry: &PageGeometry,
    config: &PageConfig,
) -> PageBreakOverlay {
    let usable = geometry.usable_content_height;

    let header_band = || Band {
        height: config.header_height,
        left: BandText(config.header_left.clone()),
        right: BandText(config.header_right.clone()),
    };
    let footer_band = || Band {
        height: config.footer_height,
        left: BandText(config.footer_left.clone()),
        right: BandText(config.footer_right.clone()),
    };

    let structures = (0..page_count)
        .map(|i| {
            // The first page box also absorbs the leading header's offset;
            // every later one sits below a breaker that already accounts
            // for one header's worth of space.
            let top_offset = if i == 0 {
                config.header_height + usable
            } else {
                usable
            };
            PageStructure {
                page_box: PageBox { top_offset },
                breaker: BreakerBlock {
                    height: geometry.breaker_block_height,
                    footer: footer_band(),
                    gap: GapBand {
                        height: config.page_gap,
                        border_size: config.page_gap_border_size,
                        background: config.page_break_background.clone(),
                    },
                    header: header_band(),
                },
            }
        })
        .collect();

    PageBreakOverlay {
        leading_header: Band {
            height: config.header_height,
            left: BandText(config.header_left.clone()),
            right: BandText(config.header_right.clone()),
        },
        structures,
        trailing_footer: Band {
            height: config.footer_height,
            left: BandText(config.footer_left.clone()),
            right: BandText(config.footer_right.clone()),
        },
        min_surface_height: config.header_height
            + page_count as f64 * (usable + geometry.breaker_block_height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PageGeometry, PageConfig) {
        let config = PageConfig {
            page_height: 800.0,
            header_height: 30.0,
            footer_height: 30.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            content_margin_top: 10.0,
            content_margin_bottom: 10.0,
            footer_left: "Confidential".to_string(),
            footer_right: "Page {page}".to_string(),
            ..Default::default()
        };
        (PageGeometry::derive(&config), config)
    }

    #[test]
    fn builds_exactly_n_structures() {
        let (geometry, config) = setup();
        for n in [1, 3, 12] {
            let overlay = build_overlay(n, &geometry, &config);
            assert_eq!(overlay.structures.len(), n);
        }
    }

    #[test]
    fn every_structure_has_one_footer_and_one_header() {
        let (geometry, config) = setup();
        let overlay = build_overlay(4, &geometry, &config);
        for s in &overlay.structures {
            assert_eq!(s.breaker.footer.height, 30.0);
            assert_eq!(s.breaker.header.height, 30.0);
            assert_eq!(s.breaker.height, geometry.breaker_block_height);
        }
        // Page one's header is the standalone leading band
        assert_eq!(overlay.leading_header.height, 30.0);
        assert_eq!(overlay.trailing_footer.height, 30.0);
    }

    #[test]
    fn first_page_box_absorbs_header_offset() {
        let (geometry, config) = setup();
        let overlay = build_overlay(3, &geometry, &config);
        assert_eq!(
            overlay.structures[0].page_box.top_offset,
            config.header_height + geometry.usable_content_height
        );
        assert_eq!(
            overlay.structures[1].page_box.top_offset,
            geometry.usable_content_height
        );
        assert_eq!(
            overlay.structures[2].page_box.top_offset,
            geometry.usable_content_height
        );
    }

    #[test]
    fn page_numbers_resolve_from_structure_order() {
        let (geometry, config) = setup();
        let overlay = build_overlay(3, &geometry, &config);
        for (i, s) in overlay.structures.iter().enumerate() {
            let n = PageBreakOverlay::footer_page_number(i);
            assert_eq!(s.breaker.footer.right.resolve(n), format!("Page {}", n));
            assert_eq!(s.breaker.footer.left.resolve(n), "Confidential");
        }
        assert_eq!(PageBreakOverlay::footer_page_number(0), 1);
        assert_eq!(PageBreakOverlay::header_page_number(0), 2);
    }

    #[test]
    fn band_text_without_token_is_untouched() {
        let text = BandText("Quarterly Report".to_string());
        assert_eq!(text.resolve(7), "Quarterly Report");
    }

    #[test]
    fn rebuild_is_deterministic() {
        let (geometry, config) = setup();
        assert_eq!(
            build_overlay(5, &geometry, &config),
            build_overlay(5, &geometry, &config)
        );
    }

    #[test]
    fn overlay_serializes_for_the_render_layer() {
        let (geometry, config) = setup();
        let overlay = build_overlay(1, &geometry, &config);
        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json["structures"][0]["breaker"]["footer"]["right"], "Page {page}");
        assert_eq!(json["structures"][0]["breaker"]["gap"]["background"], "#ffffff");
    }
}
