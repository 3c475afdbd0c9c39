//! # Folio CLI
//!
//! Runs the pagination engine against a simulated surface described as
//! JSON and prints the resulting pagination: page count, overlay
//! structures, and resolved marker heights.
//!
//! Usage:
//!   folio scenario.json
//!   echo '{ ... }' | folio
//!   folio --example > scenario.json

use std::env;
use std::fs;
use std::io::{self, Read};
use std::time::Instant;

use folio::sim::{drive_to_quiescence, Scenario, SimSurface};
use folio::{EditorSurface, PaginationEngine};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_scenario_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    let scenario: Scenario = match serde_json::from_str(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("✗ Failed to parse scenario: {}", e);
            std::process::exit(1);
        }
    };

    let mut engine = PaginationEngine::new(scenario.config.clone());
    let mut surface = SimSurface::new(1, scenario.blocks);
    let rounds = drive_to_quiescence(&mut engine, &mut surface, Instant::now());

    let marker_heights: Vec<Option<f64>> = surface
        .markers()
        .iter()
        .map(|m| surface.applied_height(*m))
        .collect();

    let report = serde_json::json!({
        "pageCount": engine.page_count(surface.id()),
        "usableContentHeight": engine.geometry().usable_content_height,
        "breakerBlockHeight": engine.geometry().breaker_block_height,
        "settledAfterRounds": rounds,
        "markerHeights": marker_heights,
        "overlay": surface.overlay(),
    });
    println!("{}", serde_json::to_string_pretty(&report).expect("report serializes"));
    eprintln!(
        "✓ Paginated into {} page(s) after {} round(s)",
        engine.page_count(surface.id()).unwrap_or(0),
        rounds
    );
}

fn example_scenario_json() -> &'static str {
    r##"{
  "config": {
    "pageHeight": 800,
    "pageGap": 50,
    "headerHeight": 30,
    "footerHeight": 30,
    "marginTop": 20,
    "marginBottom": 20,
    "contentMarginTop": 10,
    "contentMarginBottom": 10,
    "headerLeft": "Quarterly Report",
    "footerRight": "Page {page}"
  },
  "blocks": [
    { "type": "content", "height": 420 },
    { "type": "marker" },
    { "type": "content", "height": 900 },
    { "type": "content", "height": 310 },
    { "type": "marker" },
    { "type": "content", "height": 150 }
  ]
}
"##
}
