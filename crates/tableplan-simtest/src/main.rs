//! Tableplan Headless Placement Harness
//!
//! Validates the placement engine end-to-end without any UI. Runs entirely
//! in-process — no windowing, no file dialogs, no rendering.
//!
//! Usage:
//!   cargo run -p tableplan-simtest
//!   cargo run -p tableplan-simtest -- --verbose

use tableplan_core::engine::{
    EngineConfig, MoveOutcome, PlacementEngine, PlacementRequest, SearchLimits,
};
use tableplan_core::manifest::{self, kinds};
use tableplan_core::worker::spawn_placement;
use tableplan_logic::grid::Cell;
use tableplan_logic::reachability::{all_seats_reachable, reachable_from};
use tableplan_logic::shapes::Template;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Tableplan Placement Harness ===\n");

    let mut results = Vec::new();

    // 1. Furniture manifest and variant generation
    results.extend(validate_manifest(verbose));

    // 2. Open-room placement (every kind, several seeds)
    results.extend(validate_open_room_placement(verbose));

    // 3. Exhaustion on an over-constrained room
    results.extend(validate_exhaustion(verbose));

    // 4. Crowded rooms: rearrangement keeps layouts consistent
    results.extend(validate_crowded_rooms(verbose));

    // 5. Wall editing and resize behavior
    results.extend(validate_wall_editing(verbose));

    // 6. Manual relocation
    results.extend(validate_manual_moves(verbose));

    // 7. Snapshot round-trip
    results.extend(validate_persistence(verbose));

    // 8. Background worker
    results.extend(validate_worker(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        if !r.passed {
            println!("FAIL  {} — {}", r.name, r.detail);
        } else if verbose {
            println!("ok    {} — {}", r.name, r.detail);
        }
    }
    println!("\n{} passed, {} failed, {} total", passed, failed, total);
    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Shared checks ───────────────────────────────────────────────────────

/// Committed layout invariants: footprints disjoint and in lockstep with
/// the grid, entrance uncovered, every seat adjacent to reachable floor.
fn layout_violation(engine: &PlacementEngine) -> Option<String> {
    let grid = engine.grid()?;
    let layout = engine.layout();
    let mut occupied = std::collections::HashSet::new();
    for inst in &layout.instances {
        for (x, y, cell) in inst.footprint() {
            if !occupied.insert((x, y)) {
                return Some(format!("footprints overlap at ({}, {})", x, y));
            }
            if grid.get(x, y) != Ok(cell) {
                return Some(format!("grid diverges from layout at ({}, {})", x, y));
            }
        }
    }
    if occupied.contains(&(layout.entrance_x, layout.entrance_y)) {
        return Some("furniture covers the entrance".to_string());
    }
    let seats = layout.seats();
    let reachable = reachable_from(grid, layout.entrance_x, layout.entrance_y);
    if !all_seats_reachable(&seats, &reachable) {
        return Some(format!("unreachable seat in\n{}", grid.render()));
    }
    None
}

fn dump(verbose: bool, engine: &PlacementEngine) {
    if verbose {
        if let Some(grid) = engine.grid() {
            println!("{}\n", grid.render());
        }
    }
}

// ── Sections ────────────────────────────────────────────────────────────

fn validate_manifest(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let manifest = manifest::furniture_manifest();
    results.push(check(
        "manifest: kinds defined",
        manifest.len() >= 3,
        format!("{} kinds", manifest.len()),
    ));

    for spec in &manifest {
        let template = match Template::parse(&spec.pattern) {
            Ok(t) => t,
            Err(e) => {
                results.push(check(
                    &format!("manifest: kind {} parses", spec.kind),
                    false,
                    e.to_string(),
                ));
                continue;
            }
        };
        let variants = template.variants();
        if verbose {
            println!(
                "kind {} '{}': {} variant(s)",
                spec.kind,
                spec.name,
                variants.len()
            );
        }
        results.push(check(
            &format!("manifest: kind {} variants", spec.kind),
            !variants.is_empty() && variants.len() <= 6,
            format!("{} variants", variants.len()),
        ));
    }

    let symmetric = Template::parse(&["S"]).expect("1x1 pattern parses");
    results.push(check(
        "variants: 1x1 symmetric dedups to one",
        symmetric.variants().len() == 1,
        format!("{}", symmetric.variants().len()),
    ));
    results
}

fn validate_open_room_placement(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    for kind in [kinds::CORNER_TABLE, kinds::DOUBLE_TABLE, kinds::SINGLE_TABLE] {
        for seed in [1u64, 2, 3] {
            let mut engine = PlacementEngine::new(EngineConfig {
                limits: SearchLimits::default(),
                seed: Some(seed),
            });
            let outcome = engine.run(&PlacementRequest {
                width: 9,
                height: 7,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![(kind, 3)],
            });
            let name = format!("open room: kind {} seed {}", kind, seed);
            match outcome {
                Ok(o) if o.complete => {
                    dump(verbose, &engine);
                    match layout_violation(&engine) {
                        None => results.push(check(&name, true, "3 placed".into())),
                        Some(v) => results.push(check(&name, false, v)),
                    }
                }
                Ok(o) => results.push(check(
                    &name,
                    false,
                    format!("incomplete: {:?}", o.tallies),
                )),
                Err(e) => results.push(check(&name, false, e.to_string())),
            }
        }
    }
    results
}

fn validate_exhaustion(_verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();

    // A 2x2 cell room walled off except for the entrance can never hold a
    // corner table.
    let mut engine = PlacementEngine::new(EngineConfig {
        limits: SearchLimits {
            direct_attempts: 100,
            kind_attempts: 20,
            rearrange_attempts: 100,
        },
        seed: Some(7),
    });
    engine
        .run(&PlacementRequest {
            width: 2,
            height: 2,
            entrance_x: 0,
            entrance_y: 0,
            counts: vec![],
        })
        .expect("room creation succeeds");
    engine.paint_wall(1, 0);
    engine.paint_wall(0, 1);
    engine.paint_wall(1, 1);
    let outcome = engine
        .run(&PlacementRequest {
            width: 2,
            height: 2,
            entrance_x: 0,
            entrance_y: 0,
            counts: vec![(kinds::CORNER_TABLE, 1)],
        })
        .expect("request itself is valid");
    results.push(check(
        "exhaustion: walled 2x2 reports incomplete",
        !outcome.complete && outcome.tallies[0].placed == 0,
        format!("{:?}", outcome.tallies),
    ));

    // Exhaustion is a reported outcome, not an error, and the room stays
    // usable for the next run. The surviving walls box in the old entrance
    // corner, so enter from the far side.
    let retry = engine.run(&PlacementRequest {
        width: 5,
        height: 5,
        entrance_x: 4,
        entrance_y: 4,
        counts: vec![(kinds::SINGLE_TABLE, 1)],
    });
    results.push(check(
        "exhaustion: engine recovers on the next run",
        matches!(retry, Ok(o) if o.complete),
        "resized room placed one table".into(),
    ));
    results
}

fn validate_crowded_rooms(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let limits = SearchLimits {
        direct_attempts: 300,
        kind_attempts: 60,
        rearrange_attempts: 300,
    };
    for seed in 0..20u64 {
        let mut engine = PlacementEngine::new(EngineConfig {
            limits,
            seed: Some(seed),
        });
        let outcome = engine.run(&PlacementRequest {
            width: 5,
            height: 4,
            entrance_x: 2,
            entrance_y: 0,
            counts: vec![(kinds::CORNER_TABLE, 2), (kinds::SINGLE_TABLE, 2)],
        });
        let name = format!("crowded room: seed {}", seed);
        match outcome {
            Ok(o) => {
                dump(verbose, &engine);
                match layout_violation(&engine) {
                    None => results.push(check(
                        &name,
                        true,
                        format!("complete={}", o.complete),
                    )),
                    Some(v) => results.push(check(&name, false, v)),
                }
            }
            Err(e) => results.push(check(&name, false, e.to_string())),
        }
    }
    results
}

fn validate_wall_editing(_verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = PlacementEngine::new(EngineConfig {
        limits: SearchLimits::default(),
        seed: Some(17),
    });
    engine
        .run(&PlacementRequest {
            width: 6,
            height: 6,
            entrance_x: 0,
            entrance_y: 0,
            counts: vec![],
        })
        .expect("room creation succeeds");

    let painted = engine.paint_wall(4, 4) && engine.paint_wall(5, 5);
    let noop = !engine.paint_wall(4, 4) && !engine.paint_wall(0, 0) && !engine.erase_wall(3, 3);
    results.push(check(
        "walls: paint legal, repaint/entrance/erase-empty are no-ops",
        painted && noop,
        String::new(),
    ));

    // Walls survive a shrink that drops (5,5) but keeps (4,4).
    engine
        .run(&PlacementRequest {
            width: 5,
            height: 5,
            entrance_x: 0,
            entrance_y: 0,
            counts: vec![],
        })
        .expect("resize succeeds");
    let grid = engine.grid().expect("room exists");
    results.push(check(
        "walls: survive resize within overlap",
        grid.get(4, 4) == Ok(Cell::Wall) && !grid.in_bounds(5, 5),
        grid.render(),
    ));

    let erased = engine.erase_wall(4, 4) && !engine.erase_wall(4, 4);
    results.push(check("walls: erase then no-op", erased, String::new()));
    results
}

fn validate_manual_moves(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = PlacementEngine::new(EngineConfig {
        limits: SearchLimits::default(),
        seed: Some(29),
    });
    let outcome = engine
        .run(&PlacementRequest {
            width: 10,
            height: 8,
            entrance_x: 0,
            entrance_y: 0,
            counts: vec![(kinds::DOUBLE_TABLE, 1)],
        })
        .expect("request is valid");
    if !outcome.complete {
        return vec![check("manual move: setup", false, "placement failed".into())];
    }
    dump(verbose, &engine);

    // Sweep every anchor; each attempt must either move cleanly or leave
    // the layout untouched.
    let mut moved = 0;
    let mut rejected = 0;
    let mut violations = 0;
    for y in -1..9 {
        for x in -1..11 {
            let before = engine.layout().clone();
            match engine.move_instance(0, x, y) {
                MoveOutcome::Moved => moved += 1,
                MoveOutcome::RejectedOverlap | MoveOutcome::RejectedSeatAccess => {
                    rejected += 1;
                    if engine.layout() != &before {
                        violations += 1;
                    }
                }
            }
            if layout_violation(&engine).is_some() {
                violations += 1;
            }
        }
    }
    results.push(check(
        "manual move: atomic across full anchor sweep",
        violations == 0 && moved > 0 && rejected > 0,
        format!("{} moved, {} rejected", moved, rejected),
    ));
    results
}

fn validate_persistence(_verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut engine = PlacementEngine::new(EngineConfig {
        limits: SearchLimits::default(),
        seed: Some(31),
    });
    engine
        .run(&PlacementRequest {
            width: 8,
            height: 8,
            entrance_x: 4,
            entrance_y: 7,
            counts: vec![(kinds::CORNER_TABLE, 2), (kinds::DOUBLE_TABLE, 1)],
        })
        .expect("request is valid");

    let mut buffer = Vec::new();
    if let Err(e) = engine.save(&mut buffer) {
        return vec![check("persistence: save", false, e.to_string())];
    }
    let mut loaded = PlacementEngine::new(EngineConfig::default());
    if let Err(e) = loaded.load(&buffer[..]) {
        return vec![check("persistence: load", false, e.to_string())];
    }
    results.push(check(
        "persistence: grid round-trips cell-for-cell",
        loaded.grid() == engine.grid(),
        String::new(),
    ));
    results.push(check(
        "persistence: layout order round-trips",
        loaded.layout() == engine.layout() && loaded.requested() == engine.requested(),
        String::new(),
    ));
    results
}

fn validate_worker(_verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let engine = PlacementEngine::new(EngineConfig {
        limits: SearchLimits::default(),
        seed: Some(37),
    });
    let handle = spawn_placement(
        engine,
        PlacementRequest {
            width: 7,
            height: 7,
            entrance_x: 3,
            entrance_y: 3,
            counts: vec![(kinds::SINGLE_TABLE, 3)],
        },
    );
    let events: Vec<_> = handle.events.iter().collect();
    let (engine, outcome) = handle.join();
    let complete = matches!(outcome, Ok(ref o) if o.complete);
    results.push(check(
        "worker: search completes off-thread",
        complete && layout_violation(&engine).is_none(),
        format!("{} events", events.len()),
    ));
    results.push(check(
        "worker: event stream ends with Finished",
        matches!(
            events.last(),
            Some(tableplan_core::engine::PlacementEvent::Finished { .. })
        ),
        String::new(),
    ));
    results
}
