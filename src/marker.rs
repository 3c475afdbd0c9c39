//! # Manual Break Height Resolution
//!
//! A manual page-break marker is an atomic content node with no authored
//! height. To force everything after it onto a fresh page, its rendered
//! height must exactly fill whatever space remains on the page it sits on.
//! That remainder can only be learned from measured geometry: which page is
//! the marker on right now, and how much of that page is already used?
//!
//! Resolution is a read-only computation. Writing the height (and the
//! ordering discipline that makes consecutive markers consistent) belongs
//! to the reflow scheduler in [`crate::reflow`].

use crate::error::SurfaceError;
use crate::geometry::PageGeometry;
use crate::surface::{EditorSurface, NodeId, NodeRole};
use log::trace;

/// Space reserved for the marker's own visual chrome, subtracted from the
/// remaining page space. Tunable; empirically chosen.
pub const PADDING_RESERVE: f64 = 60.0;

/// Floor for resolved marker heights. Must stay positive or the marker
/// collapses and becomes unselectable. An earlier policy used a 50px floor
/// with a decorative icon; current policy is a bare 1px floor.
pub const MIN_MARKER_HEIGHT: f64 = 1.0;

/// Resolve the inline height for one marker.
///
/// Returns `Ok(None)` when no page-break overlay exists yet: geometry is
/// not established, and the caller should keep the marker at its minimum
/// height. Measurement failures (the marker or a breaker vanished mid-pass)
/// surface as errors for the caller to degrade on.
pub fn resolve_marker_height(
    surface: &impl EditorSurface,
    marker: NodeId,
    geometry: &PageGeometry,
) -> Result<Option<f64>, SurfaceError> {
    // The overlay root this marker belongs to; fall back to the surface's
    // first overlay root when the marker isn't nested under one.
    let root = match surface
        .overlay_root_for(marker)
        .or_else(|| surface.nodes(NodeRole::OverlayRoot).into_iter().next())
    {
        Some(root) => root,
        None => return Ok(None),
    };

    let breakers = surface.nodes_under(root, NodeRole::BreakerBlock);
    if breakers.is_empty() {
        return Ok(None);
    }

    let marker_top = surface.measure(marker)?.top;

    // The last breaker at or above the marker tells us which page the
    // marker currently sits on.
    let mut page_breaker_top = None;
    for breaker in &breakers {
        let top = surface.measure(*breaker)?.top;
        if top <= marker_top {
            page_breaker_top = Some(top);
        } else {
            break;
        }
    }

    let content_top = match page_breaker_top {
        Some(top) => top + geometry.breaker_block_height,
        // First page: content starts below the leading header band.
        None => surface.measure(root)?.top + geometry.first_page_offset,
    };

    let used = (marker_top - content_top).max(0.0);
    let remaining = geometry.usable_content_height - used;
    let height = (remaining - PADDING_RESERVE).max(MIN_MARKER_HEIGHT);
    trace!(
        "marker {:?}: top {:.1}, page content top {:.1}, used {:.1} -> height {:.1}",
        marker,
        marker_top,
        content_top,
        used,
        height
    );
    Ok(Some(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::overlay::build_overlay;
    use crate::sim::{SimBlock, SimSurface};

    fn setup(blocks: Vec<SimBlock>, pages: usize) -> (SimSurface, PageGeometry) {
        let config = PageConfig {
            page_height: 800.0,
            header_height: 30.0,
            footer_height: 30.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            content_margin_top: 10.0,
            content_margin_bottom: 10.0,
            ..Default::default()
        };
        let geometry = PageGeometry::derive(&config);
        let mut surface = SimSurface::new(1, blocks);
        if pages > 0 {
            surface.install_overlay(build_overlay(pages, &geometry, &config));
        }
        (surface, geometry)
    }

    #[test]
    fn no_overlay_resolves_to_none() {
        let (surface, geometry) = setup(vec![SimBlock::marker()], 0);
        let marker = surface.markers()[0];
        assert_eq!(resolve_marker_height(&surface, marker, &geometry), Ok(None));
    }

    #[test]
    fn marker_at_page_top_claims_full_usable_height() {
        // usable 680, reserve 60 -> 620
        let (surface, geometry) = setup(vec![SimBlock::marker()], 1);
        let marker = surface.markers()[0];
        let height = resolve_marker_height(&surface, marker, &geometry).unwrap();
        assert_eq!(height, Some(620.0));
    }

    #[test]
    fn used_space_shrinks_resolved_height() {
        let (surface, geometry) =
            setup(vec![SimBlock::content(200.0), SimBlock::marker()], 1);
        let marker = surface.markers()[0];
        let height = resolve_marker_height(&surface, marker, &geometry).unwrap();
        // 680 - 200 - 60 = 420
        assert_eq!(height, Some(420.0));
    }

    #[test]
    fn resolved_height_is_monotonic_in_used_space() {
        // All values keep the marker on page one, so used space on that
        // page equals the content height above it.
        let mut previous = f64::INFINITY;
        for used in [0.0, 100.0, 300.0, 600.0, 650.0] {
            let (surface, geometry) =
                setup(vec![SimBlock::content(used), SimBlock::marker()], 2);
            let marker = surface.markers()[0];
            let height = resolve_marker_height(&surface, marker, &geometry)
                .unwrap()
                .unwrap();
            assert!(
                height <= previous,
                "height must never grow as used space grows"
            );
            assert!(height >= MIN_MARKER_HEIGHT);
            previous = height;
        }
    }

    #[test]
    fn nearly_full_page_floors_at_minimum() {
        let (surface, geometry) =
            setup(vec![SimBlock::content(670.0), SimBlock::marker()], 1);
        let marker = surface.markers()[0];
        let height = resolve_marker_height(&surface, marker, &geometry).unwrap();
        // 680 - 670 - 60 < 1 -> floor
        assert_eq!(height, Some(MIN_MARKER_HEIGHT));
    }

    #[test]
    fn marker_past_first_breaker_resolves_against_second_page() {
        // 1000px of content pushes the marker past the first breaker
        // (which sits at header + usable = 710). Resolution must measure
        // the remainder of page two, not page one.
        let (surface, geometry) =
            setup(vec![SimBlock::content(1000.0), SimBlock::marker()], 2);
        let marker = surface.markers()[0];
        let height = resolve_marker_height(&surface, marker, &geometry)
            .unwrap()
            .unwrap();
        // marker top 1030, page two content top 710 + 160 = 870,
        // used 160 -> 680 - 160 - 60 = 460
        assert_eq!(height, 460.0);
    }

    #[test]
    fn detached_marker_surfaces_an_error() {
        let (surface, geometry) = setup(vec![SimBlock::marker()], 1);
        let bogus = NodeId(9999);
        assert!(resolve_marker_height(&surface, bogus, &geometry).is_err());
    }
}
