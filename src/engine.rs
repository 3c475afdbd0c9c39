//! # Engine Orchestration
//!
//! Wires the pieces together per surface: a change notification comes in,
//! the page count is re-estimated, the overlay is rebuilt if the count
//! moved, and a reflow pass is scheduled for the manual break markers.
//!
//! The engine is host-driven. It never spawns threads or owns timers; each
//! entry point may hand back a [`Wake`] request that the host honors on its
//! own cooperative scheduler. One notification callback runs to completion
//! before the next, so overlay regeneration and marker reflow are never
//! active concurrently.

use std::collections::HashMap;
use std::time::Instant;

use crate::config::PageConfig;
use crate::estimate::{estimate_page_count, ContentMetrics, OverlayObservation};
use crate::geometry::PageGeometry;
use crate::overlay::build_overlay;
use crate::reflow::{apply_marker_heights, FrameOutcome, PassReport, ReflowState, Wake};
use crate::surface::{Change, ChangeOrigin, EditorSurface, NodeRole, SurfaceId};
use log::{debug, warn};

/// Engine-side state for one mounted surface.
#[derive(Debug)]
struct SurfaceState {
    page_count: usize,
    overlay_present: bool,
    reflow: ReflowState,
    last_pass: Option<PassReport>,
}

impl SurfaceState {
    fn new() -> Self {
        Self {
            page_count: 0,
            overlay_present: false,
            reflow: ReflowState::new(),
            last_pass: None,
        }
    }
}

/// The pagination layout engine. One instance serves any number of editing
/// surfaces, each keyed by its [`SurfaceId`]; configuration and derived
/// geometry are shared and immutable for the engine's lifetime.
#[derive(Debug)]
pub struct PaginationEngine {
    config: PageConfig,
    geometry: PageGeometry,
    surfaces: HashMap<SurfaceId, SurfaceState>,
}

impl PaginationEngine {
    pub fn new(config: PageConfig) -> Self {
        let geometry = PageGeometry::derive(&config);
        Self {
            config,
            geometry,
            surfaces: HashMap::new(),
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Register a surface. Optional: `handle_change` mounts lazily; this
    /// exists for hosts that want state ready before the first edit.
    pub fn mount(&mut self, id: SurfaceId) {
        self.surfaces.entry(id).or_insert_with(SurfaceState::new);
    }

    /// Tear down all engine state for a surface. Pending wakes for it
    /// become no-ops.
    pub fn destroy(&mut self, id: SurfaceId) {
        self.surfaces.remove(&id);
    }

    /// Current page count for a mounted surface, once estimated.
    pub fn page_count(&self, id: SurfaceId) -> Option<usize> {
        let state = self.surfaces.get(&id)?;
        state.overlay_present.then_some(state.page_count)
    }

    /// Report from the most recent completed reflow pass.
    pub fn last_pass_report(&self, id: SurfaceId) -> Option<PassReport> {
        self.surfaces.get(&id)?.last_pass
    }

    /// A change notification from the host. Re-estimates the page count,
    /// rebuilds the overlay if it moved, and schedules a reflow pass.
    ///
    /// Decoration-only notifications are this engine's own writes echoing
    /// back when they arrive while a pass is applying, or trailing one
    /// that just reached its fixed point (hosts may deliver them after the
    /// pass released the lock). Both are dropped; that is what breaks the
    /// write-notify-write cycle. Only a content edit re-arms reflow once a
    /// surface has settled.
    pub fn handle_change(
        &mut self,
        surface: &mut impl EditorSurface,
        change: Change,
        now: Instant,
    ) -> Option<Wake> {
        let id = surface.id();
        let state = self.surfaces.entry(id).or_insert_with(SurfaceState::new);

        if change.origin == ChangeOrigin::DecorationsOnly
            && (state.reflow.is_applying()
                || state.last_pass.is_some_and(|r| r.is_stable()))
        {
            return None;
        }

        self.repaginate(surface);
        self.surfaces.get_mut(&id)?.reflow.request(now)
    }

    /// The debounce timer the engine asked for fired.
    pub fn on_timer(&mut self, surface: &mut impl EditorSurface, now: Instant) -> Option<Wake> {
        self.surfaces.get_mut(&surface.id())?.reflow.on_timer(now)
    }

    /// A rendering-settlement callback the engine asked for arrived. On the
    /// second consecutive one, the measurement pass runs.
    pub fn on_frame(&mut self, surface: &mut impl EditorSurface) -> Option<Wake> {
        let id = surface.id();
        let outcome = self.surfaces.get_mut(&id)?.reflow.on_frame();
        match outcome {
            FrameOutcome::NotApplying => None,
            FrameOutcome::AwaitNext => Some(Wake::Frame),
            FrameOutcome::RunPass => {
                let report = apply_marker_heights(surface, &self.geometry);

                // Release the lock before anything else; the pass is done
                // whatever happens next.
                if let Some(state) = self.surfaces.get_mut(&id) {
                    state.reflow.finish();
                    state.last_pass = Some(report);
                }

                // Applied heights grow content; the page count may have
                // moved with it.
                if !report.is_stable() {
                    self.repaginate(surface);
                }
                None
            }
        }
    }

    /// Re-estimate the page count and rebuild the overlay when it changes.
    /// Estimation is incremental; overlay regeneration is wholesale.
    fn repaginate(&mut self, surface: &mut impl EditorSurface) {
        let id = surface.id();
        let Some(state) = self.surfaces.get_mut(&id) else {
            return;
        };

        let content = ContentMetrics {
            content_height: surface.content_height(),
            content_bottom: surface.content_bottom(),
        };

        let breakers = surface.nodes(NodeRole::BreakerBlock);
        let observation = match breakers.last() {
            Some(&last) if state.overlay_present => match surface.measure(last) {
                Ok(rect) => OverlayObservation::Present {
                    last_breaker_bottom: rect.bottom(),
                },
                Err(e) => {
                    // Keep the previous page count rather than guessing
                    // from a half-updated render tree.
                    warn!("last breaker unmeasurable, keeping {} page(s): {}", state.page_count, e);
                    return;
                }
            },
            _ => OverlayObservation::Absent,
        };

        let new_count = estimate_page_count(
            state.page_count,
            observation,
            &self.geometry,
            &self.config,
            &content,
        );

        if !state.overlay_present || new_count != state.page_count {
            debug!(
                "surface {:?}: page count {} -> {}, rebuilding overlay",
                id, state.page_count, new_count
            );
            surface.install_overlay(build_overlay(new_count, &self.geometry, &self.config));
            state.page_count = new_count;
            state.overlay_present = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBlock, SimSurface};

    fn config_680() -> PageConfig {
        PageConfig {
            page_height: 800.0,
            header_height: 30.0,
            footer_height: 30.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            content_margin_top: 10.0,
            content_margin_bottom: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn first_change_bootstraps_the_overlay() {
        let mut engine = PaginationEngine::new(config_680());
        let mut surface = SimSurface::new(1, vec![SimBlock::content(2050.0)]);
        let wake = engine.handle_change(&mut surface, Change::content(), Instant::now());
        assert!(matches!(wake, Some(Wake::TimerAt(_))));
        // ceil(2050 / 680) = 4
        assert_eq!(engine.page_count(surface.id()), Some(4));
        assert_eq!(surface.overlay().unwrap().structures.len(), 4);
    }

    #[test]
    fn stable_content_keeps_the_overlay_instance_count() {
        let mut engine = PaginationEngine::new(config_680());
        let mut surface = SimSurface::new(1, vec![SimBlock::content(1000.0)]);
        let now = Instant::now();
        engine.handle_change(&mut surface, Change::content(), now);
        let count = engine.page_count(surface.id());
        engine.handle_change(&mut surface, Change::content(), now);
        engine.handle_change(&mut surface, Change::decorations_only(), now);
        assert_eq!(engine.page_count(surface.id()), count);
    }

    #[test]
    fn growing_content_adds_pages_incrementally() {
        let mut engine = PaginationEngine::new(config_680());
        let mut surface = SimSurface::new(1, vec![SimBlock::content(1000.0)]);
        let now = Instant::now();
        engine.handle_change(&mut surface, Change::content(), now);
        assert_eq!(engine.page_count(surface.id()), Some(2));

        surface.push_content(900.0);
        engine.handle_change(&mut surface, Change::content(), now);
        assert!(engine.page_count(surface.id()).unwrap() > 2);
    }

    #[test]
    fn destroy_forgets_the_surface() {
        let mut engine = PaginationEngine::new(config_680());
        let mut surface = SimSurface::new(1, vec![SimBlock::content(100.0)]);
        let now = Instant::now();
        engine.handle_change(&mut surface, Change::content(), now);
        engine.destroy(surface.id());
        assert_eq!(engine.page_count(surface.id()), None);
        // A stale timer for the destroyed surface is a no-op.
        assert_eq!(engine.on_timer(&mut surface, now), None);
        assert_eq!(engine.on_frame(&mut surface), None);
    }

    #[test]
    fn decoration_echo_during_apply_is_dropped() {
        let mut engine = PaginationEngine::new(config_680());
        let mut surface = SimSurface::new(1, vec![SimBlock::content(200.0), SimBlock::marker()]);
        let now = Instant::now();
        let wake = engine.handle_change(&mut surface, Change::content(), now);
        let Some(Wake::TimerAt(deadline)) = wake else {
            panic!("expected a debounce timer");
        };
        assert_eq!(engine.on_timer(&mut surface, deadline), Some(Wake::Frame));
        // Pass is now applying; its own write echo must not reschedule.
        assert_eq!(
            engine.handle_change(&mut surface, Change::decorations_only(), deadline),
            None
        );
        // A real content edit mid-pass is coalesced into the in-flight pass.
        assert_eq!(
            engine.handle_change(&mut surface, Change::content(), deadline),
            None
        );
    }
}
