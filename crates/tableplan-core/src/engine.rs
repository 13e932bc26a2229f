//! Randomized placement search with backtracking rearrangement.
//!
//! The engine owns the grid and layout for the duration of a run and keeps
//! them in lockstep: every speculative paint is validated (placability,
//! then global seat reachability) and either committed or reverted before
//! the next step. When direct placement of an instance exhausts its retry
//! budget, previously placed instances are relocated newest-first to make
//! room; if none can move, the run reports exhaustion with the partial
//! layout intact.
//!
//! The search trades optimality for simplicity — it is a best-effort local
//! search with bounded random retries, not a complete constraint solver.
//! Failure on dense or poorly shaped rooms is expected and reported, never
//! raised as an error.

use crate::layout::{LayoutState, PlacedInstance};
use crate::manifest;
use crate::persistence::{self, SaveError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{Read, Write};
use std::sync::mpsc::Sender;
use tableplan_logic::grid::{Cell, Grid, GridError};
use tableplan_logic::reachability::{all_seats_reachable, reachable_from};
use tableplan_logic::shapes::Template;

/// Retry budgets for the randomized search.
///
/// Named configuration rather than literals so tests can shrink them for
/// fast exhaustion runs.
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    /// Random anchor/variant draws per direct placement attempt.
    pub direct_attempts: u32,
    /// Outer budget of direct attempts (each followed by a rearrangement
    /// on failure) per requested kind.
    pub kind_attempts: u32,
    /// Random re-placements tried for each instance during rearrangement.
    pub rearrange_attempts: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            direct_attempts: 1000,
            kind_attempts: 10_000,
            rearrange_attempts: 10_000,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub limits: SearchLimits,
    /// Random seed for reproducible searches (None = seeded from entropy).
    pub seed: Option<u64>,
}

/// A placement request: room geometry, entrance, and ordered per-kind
/// instance counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
    pub width: i32,
    pub height: i32,
    pub entrance_x: i32,
    pub entrance_y: i32,
    /// (kind, count) pairs, attempted in the given order.
    pub counts: Vec<(u8, u32)>,
}

/// Validation errors detected before any search begins. A failed run
/// leaves the engine's room and layout untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    InvalidDimension { width: i32, height: i32 },
    OutOfBounds { x: i32, y: i32 },
    InvalidEntrance { x: i32, y: i32 },
    UnknownFurnitureKind(u8),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidDimension { width, height } => {
                write!(f, "invalid room dimensions: {}x{}", width, height)
            }
            EngineError::OutOfBounds { x, y } => {
                write!(f, "cell ({}, {}) is outside the room", x, y)
            }
            EngineError::InvalidEntrance { x, y } => {
                write!(f, "entrance ({}, {}) is outside the room or on a wall", x, y)
            }
            EngineError::UnknownFurnitureKind(kind) => {
                write!(f, "unknown furniture kind {}", kind)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<GridError> for EngineError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::InvalidDimension { width, height } => {
                EngineError::InvalidDimension { width, height }
            }
            GridError::OutOfBounds { x, y } => EngineError::OutOfBounds { x, y },
        }
    }
}

/// Progress notifications emitted during a run. Advisory only — consumers
/// redraw or log, they never mutate engine-owned state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementEvent {
    /// An instance was committed to the layout.
    Committed { kind: u8, anchor_x: i32, anchor_y: i32 },
    /// An earlier instance was relocated to unblock the given kind.
    Rearranged { kind: u8 },
    /// The run finished; `complete` mirrors the outcome.
    Finished { complete: bool },
}

/// Per-kind placement tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindTally {
    pub kind: u8,
    pub requested: u32,
    pub placed: u32,
}

/// Result of a placement run. Exhaustion is not an error: `complete` is
/// false and whatever partial layout was achieved stays committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub complete: bool,
    pub tallies: Vec<KindTally>,
}

/// Result of a manual single-instance move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// The new anchor leaves the room or overlaps walls, furniture, or the
    /// entrance.
    RejectedOverlap,
    /// The move would cut a seat off from the entrance.
    RejectedSeatAccess,
}

/// The placement engine. Owns the room grid and layout state; all
/// mutations go through it so the two never diverge.
#[derive(Debug)]
pub struct PlacementEngine {
    grid: Option<Grid>,
    layout: LayoutState,
    requested: Vec<(u8, u32)>,
    limits: SearchLimits,
    rng: StdRng,
    events: Option<Sender<PlacementEvent>>,
}

impl PlacementEngine {
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            grid: None,
            layout: LayoutState::default(),
            requested: Vec::new(),
            limits: config.limits,
            rng,
            events: None,
        }
    }

    /// Rebuild an engine from snapshot parts without re-running the
    /// search. The grid is trusted to already carry the layout's paint.
    pub fn from_parts(
        config: EngineConfig,
        grid: Grid,
        layout: LayoutState,
        requested: Vec<(u8, u32)>,
    ) -> Self {
        let mut engine = Self::new(config);
        engine.grid = Some(grid);
        engine.layout = layout;
        engine.requested = requested;
        engine
    }

    /// Install or remove the progress event sink.
    pub fn set_event_sink(&mut self, events: Option<Sender<PlacementEvent>>) {
        self.events = events;
    }

    /// Read-only view of the room, if one has been created.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Read-only view of the placed furniture.
    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    /// The (kind, count) pairs of the most recent request.
    pub fn requested(&self) -> &[(u8, u32)] {
        &self.requested
    }

    /// Execute a full placement run.
    ///
    /// Creates or resizes the room (walls survive a resize within the
    /// overlapping region), clears prior furniture and the layout, marks
    /// the entrance, then places the requested counts kind by kind.
    pub fn run(&mut self, request: &PlacementRequest) -> Result<PlacementOutcome, EngineError> {
        // Eager validation — nothing is mutated until the whole request
        // checks out.
        if request.width <= 0 || request.height <= 0 {
            return Err(EngineError::InvalidDimension {
                width: request.width,
                height: request.height,
            });
        }
        let mut plan: Vec<(u8, u32, Vec<Template>)> = Vec::with_capacity(request.counts.len());
        for &(kind, count) in &request.counts {
            let base = manifest::base_template(kind)?;
            plan.push((kind, count, base.variants()));
        }
        let (ex, ey) = (request.entrance_x, request.entrance_y);
        if ex < 0 || ex >= request.width || ey < 0 || ey >= request.height {
            return Err(EngineError::InvalidEntrance { x: ex, y: ey });
        }
        // Walls survive the resize, so a wall under the entrance is known
        // before touching the grid.
        if let Some(grid) = &self.grid {
            if grid.get(ex, ey) == Ok(Cell::Wall) {
                return Err(EngineError::InvalidEntrance { x: ex, y: ey });
            }
        }

        // Initialize the room for this run.
        let mut grid = match self.grid.take() {
            None => Grid::new(request.width, request.height)?,
            Some(mut g) => {
                if g.width() != request.width || g.height() != request.height {
                    g.resize(request.width, request.height)?;
                }
                g
            }
        };
        grid.clear_furnishings();
        self.layout.clear();
        self.layout.entrance_x = ex;
        self.layout.entrance_y = ey;
        self.requested = request.counts.clone();
        grid.set(ex, ey, Cell::Entrance)?;

        log::info!(
            "placement run: {}x{} room, entrance ({}, {}), {} kind(s) requested",
            request.width,
            request.height,
            ex,
            ey,
            plan.len()
        );

        let outcome = run_search(
            &mut grid,
            &mut self.layout,
            &mut self.rng,
            &self.limits,
            &self.events,
            &plan,
        );
        self.grid = Some(grid);

        if outcome.complete {
            log::info!(
                "placement run complete: {} instance(s) committed",
                self.layout.instances.len()
            );
        } else {
            let placed: u32 = outcome.tallies.iter().map(|t| t.placed).sum();
            let wanted: u32 = outcome.tallies.iter().map(|t| t.requested).sum();
            log::warn!("placement run exhausted: {} of {} instances placed", placed, wanted);
        }
        emit(&self.events, PlacementEvent::Finished { complete: outcome.complete });
        Ok(outcome)
    }

    /// Move one placed instance to a new anchor.
    ///
    /// Placability is checked against a scratch grid with the instance
    /// erased; only then is the move performed for real and global seat
    /// reachability re-validated. On any rejection the layout is left
    /// exactly as it was. Other instances are never touched and the
    /// rearrangement cascade never triggers — a manual move is local and
    /// predictable.
    ///
    /// Panics if `index` is out of range.
    pub fn move_instance(&mut self, index: usize, new_x: i32, new_y: i32) -> MoveOutcome {
        let original = self.layout.instances[index].clone();
        let grid = self
            .grid
            .as_mut()
            .expect("a placed instance implies the room exists");

        let mut scratch = grid.clone();
        erase(&mut scratch, &original.template, original.anchor_x, original.anchor_y);
        if !placeable(&scratch, &original.template, new_x, new_y) {
            return MoveOutcome::RejectedOverlap;
        }

        erase(grid, &original.template, original.anchor_x, original.anchor_y);
        paint(grid, &original.template, new_x, new_y);
        self.layout.instances[index] = PlacedInstance {
            anchor_x: new_x,
            anchor_y: new_y,
            template: original.template.clone(),
        };

        if seats_reachable(grid, &self.layout) {
            log::debug!("moved instance {} to ({}, {})", index, new_x, new_y);
            return MoveOutcome::Moved;
        }

        erase(grid, &original.template, new_x, new_y);
        paint(grid, &original.template, original.anchor_x, original.anchor_y);
        self.layout.instances[index] = original;
        MoveOutcome::RejectedSeatAccess
    }

    /// Paint a wall at a single cell. Legal only on Empty cells; anything
    /// else (including out of bounds) is a no-op. Returns whether the room
    /// changed.
    pub fn paint_wall(&mut self, x: i32, y: i32) -> bool {
        match self.grid.as_mut() {
            Some(grid) if grid.get(x, y) == Ok(Cell::Empty) => {
                grid.set(x, y, Cell::Wall).expect("bounds checked by get");
                true
            }
            _ => false,
        }
    }

    /// Erase a wall at a single cell. Legal only on Wall cells; anything
    /// else is a no-op. Returns whether the room changed.
    pub fn erase_wall(&mut self, x: i32, y: i32) -> bool {
        match self.grid.as_mut() {
            Some(grid) if grid.get(x, y) == Ok(Cell::Wall) => {
                grid.set(x, y, Cell::Empty).expect("bounds checked by get");
                true
            }
            _ => false,
        }
    }

    /// Serialize the current room and layout.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        let grid = self.grid.as_ref().ok_or(SaveError::NoRoom)?;
        persistence::save_layout(writer, grid, &self.layout, &self.requested)
    }

    /// Replace the engine's room and layout with a saved snapshot.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = persistence::load_layout(reader)?;
        self.grid = Some(loaded.grid);
        self.layout = loaded.layout;
        self.requested = loaded.requested;
        Ok(())
    }
}

fn emit(events: &Option<Sender<PlacementEvent>>, event: PlacementEvent) {
    if let Some(tx) = events {
        // Advisory — a dropped receiver is not the engine's problem.
        let _ = tx.send(event);
    }
}

/// Place all requested kinds in order. Returns per-kind tallies; any
/// exhaustion aborts the remainder of the plan.
fn run_search(
    grid: &mut Grid,
    layout: &mut LayoutState,
    rng: &mut StdRng,
    limits: &SearchLimits,
    events: &Option<Sender<PlacementEvent>>,
    plan: &[(u8, u32, Vec<Template>)],
) -> PlacementOutcome {
    let mut tallies: Vec<KindTally> = Vec::with_capacity(plan.len());
    let mut aborted = false;

    for (kind, count, variants) in plan {
        if aborted {
            tallies.push(KindTally { kind: *kind, requested: *count, placed: 0 });
            continue;
        }
        let mut placed = 0u32;
        let mut attempts = 0u32;
        while placed < *count && attempts < limits.kind_attempts {
            attempts += 1;
            if try_place_once(grid, layout, rng, variants, limits.direct_attempts) {
                placed += 1;
                attempts = 0;
                if let Some(inst) = layout.instances.last() {
                    log::debug!(
                        "committed kind {} at ({}, {})",
                        kind,
                        inst.anchor_x,
                        inst.anchor_y
                    );
                    emit(
                        events,
                        PlacementEvent::Committed {
                            kind: *kind,
                            anchor_x: inst.anchor_x,
                            anchor_y: inst.anchor_y,
                        },
                    );
                }
            } else if rearrange(grid, layout, rng, limits) {
                log::debug!("relocated an earlier instance to unblock kind {}", kind);
                emit(events, PlacementEvent::Rearranged { kind: *kind });
            } else {
                break;
            }
        }
        if placed < *count {
            aborted = true;
        }
        tallies.push(KindTally { kind: *kind, requested: *count, placed });
    }

    let complete = tallies.iter().all(|t| t.placed == t.requested);
    PlacementOutcome { complete, tallies }
}

/// One direct placement attempt: up to `attempts` random anchor/variant
/// draws, each validated by placability and then global seat
/// reachability. The successful instance is committed to the layout.
fn try_place_once(
    grid: &mut Grid,
    layout: &mut LayoutState,
    rng: &mut StdRng,
    variants: &[Template],
    attempts: u32,
) -> bool {
    for _ in 0..attempts {
        let template = &variants[rng.gen_range(0..variants.len())];
        let x = rng.gen_range(0..grid.width());
        let y = rng.gen_range(0..grid.height());
        if !placeable(grid, template, x, y) {
            continue;
        }
        paint(grid, template, x, y);
        layout.instances.push(PlacedInstance {
            anchor_x: x,
            anchor_y: y,
            template: template.clone(),
        });
        if seats_reachable(grid, layout) {
            return true;
        }
        layout.instances.pop();
        erase(grid, template, x, y);
    }
    false
}

/// Backtracking phase: relocate previously placed instances newest-first
/// until one finds a reachable new position. An instance that cannot move
/// is restored to its exact original anchor and ordinal position. Returns
/// false when every placed instance has been tried.
fn rearrange(
    grid: &mut Grid,
    layout: &mut LayoutState,
    rng: &mut StdRng,
    limits: &SearchLimits,
) -> bool {
    for i in (0..layout.instances.len()).rev() {
        let original = layout.instances.remove(i);
        erase(grid, &original.template, original.anchor_x, original.anchor_y);

        for _ in 0..limits.rearrange_attempts {
            let x = rng.gen_range(0..grid.width());
            let y = rng.gen_range(0..grid.height());
            if !placeable(grid, &original.template, x, y) {
                continue;
            }
            paint(grid, &original.template, x, y);
            layout.instances.push(PlacedInstance {
                anchor_x: x,
                anchor_y: y,
                template: original.template.clone(),
            });
            if seats_reachable(grid, layout) {
                return true;
            }
            layout.instances.pop();
            erase(grid, &original.template, x, y);
        }

        paint(grid, &original.template, original.anchor_x, original.anchor_y);
        layout.instances.insert(i, original);
    }
    false
}

/// Footprint fits the room and every non-Empty template cell lands on an
/// Empty grid cell. The entrance cell is non-Empty, so furniture can never
/// cover it.
fn placeable(grid: &Grid, template: &Template, x: i32, y: i32) -> bool {
    if x < 0 || y < 0 || x + template.width() > grid.width() || y + template.height() > grid.height()
    {
        return false;
    }
    template
        .cells()
        .all(|(dx, dy, cell)| cell == Cell::Empty || grid.get(x + dx, y + dy) == Ok(Cell::Empty))
}

fn paint(grid: &mut Grid, template: &Template, x: i32, y: i32) {
    for (dx, dy, cell) in template.cells() {
        if cell != Cell::Empty {
            grid.set(x + dx, y + dy, cell).expect("footprint verified in bounds");
        }
    }
}

fn erase(grid: &mut Grid, template: &Template, x: i32, y: i32) {
    for (dx, dy, cell) in template.cells() {
        if cell != Cell::Empty {
            grid.set(x + dx, y + dy, Cell::Empty).expect("footprint verified in bounds");
        }
    }
}

/// Global reachability check over the entire current seat set. Earlier
/// seats can be cut off by a newly painted instance, so every commit
/// re-validates all of them.
fn seats_reachable(grid: &Grid, layout: &LayoutState) -> bool {
    let seats = layout.seats();
    if seats.is_empty() {
        return true;
    }
    let reachable = reachable_from(grid, layout.entrance_x, layout.entrance_y);
    all_seats_reachable(&seats, &reachable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::kinds;
    use std::collections::HashSet;
    use std::sync::mpsc;

    fn seeded(seed: u64) -> EngineConfig {
        EngineConfig {
            limits: SearchLimits::default(),
            seed: Some(seed),
        }
    }

    fn tight_limits() -> SearchLimits {
        SearchLimits {
            direct_attempts: 200,
            kind_attempts: 50,
            rearrange_attempts: 200,
        }
    }

    /// Every committed layout invariant in one place: footprints disjoint,
    /// grid and layout in lockstep, all seats reachable.
    fn assert_layout_valid(engine: &PlacementEngine) {
        let grid = engine.grid().expect("room exists");
        let layout = engine.layout();
        let mut occupied = HashSet::new();
        for inst in &layout.instances {
            for (x, y, cell) in inst.footprint() {
                assert!(
                    occupied.insert((x, y)),
                    "footprints overlap at ({}, {})",
                    x,
                    y
                );
                assert_eq!(
                    grid.get(x, y),
                    Ok(cell),
                    "grid diverges from layout at ({}, {})",
                    x,
                    y
                );
            }
        }
        assert!(
            !occupied.contains(&(layout.entrance_x, layout.entrance_y)),
            "furniture covers the entrance"
        );
        assert!(
            seats_reachable(grid, layout),
            "a committed seat is unreachable:\n{}",
            grid.render()
        );
    }

    #[test]
    fn test_scenario_single_table_in_open_room() {
        let mut engine = PlacementEngine::new(seeded(7));
        let outcome = engine
            .run(&PlacementRequest {
                width: 5,
                height: 5,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![(kinds::SINGLE_TABLE, 1)],
            })
            .unwrap();
        assert!(outcome.complete, "5x5 open room fits one single table");
        assert_eq!(engine.layout().instances.len(), 1);
        assert_layout_valid(&engine);
    }

    #[test]
    fn test_scenario_walled_room_exhausts() {
        let mut engine = PlacementEngine::new(EngineConfig {
            limits: tight_limits(),
            seed: Some(3),
        });
        // Create the 2x2 room first, then wall off everything except the
        // entrance cell.
        engine
            .run(&PlacementRequest {
                width: 2,
                height: 2,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![],
            })
            .unwrap();
        assert!(engine.paint_wall(1, 0));
        assert!(engine.paint_wall(0, 1));
        assert!(engine.paint_wall(1, 1));

        let outcome = engine
            .run(&PlacementRequest {
                width: 2,
                height: 2,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![(kinds::CORNER_TABLE, 1)],
            })
            .unwrap();
        assert!(!outcome.complete, "no legal 2x2 footprint exists");
        assert_eq!(outcome.tallies[0].placed, 0);
        assert!(engine.layout().instances.is_empty());
    }

    #[test]
    fn test_crowded_room_stays_valid_across_seeds() {
        // Dense enough to trigger rearrangement; whether each seed
        // completes or exhausts, the committed layout must hold its
        // invariants.
        for seed in 0..10 {
            let mut engine = PlacementEngine::new(EngineConfig {
                limits: tight_limits(),
                seed: Some(seed),
            });
            let outcome = engine
                .run(&PlacementRequest {
                    width: 4,
                    height: 4,
                    entrance_x: 0,
                    entrance_y: 0,
                    counts: vec![(kinds::CORNER_TABLE, 3)],
                })
                .unwrap();
            for tally in &outcome.tallies {
                assert!(tally.placed <= tally.requested);
            }
            assert_layout_valid(&engine);
        }
    }

    #[test]
    fn test_multiple_kinds_in_request_order() {
        let mut engine = PlacementEngine::new(seeded(11));
        let outcome = engine
            .run(&PlacementRequest {
                width: 10,
                height: 10,
                entrance_x: 5,
                entrance_y: 0,
                counts: vec![
                    (kinds::CORNER_TABLE, 2),
                    (kinds::DOUBLE_TABLE, 2),
                    (kinds::SINGLE_TABLE, 3),
                ],
            })
            .unwrap();
        assert!(outcome.complete);
        assert_eq!(outcome.tallies.len(), 3);
        assert_eq!(outcome.tallies[0].kind, kinds::CORNER_TABLE);
        assert_eq!(engine.layout().instances.len(), 7);
        assert_layout_valid(&engine);
    }

    #[test]
    fn test_zero_count_is_noop() {
        let mut engine = PlacementEngine::new(seeded(1));
        let outcome = engine
            .run(&PlacementRequest {
                width: 3,
                height: 3,
                entrance_x: 1,
                entrance_y: 1,
                counts: vec![(kinds::CORNER_TABLE, 0)],
            })
            .unwrap();
        assert!(outcome.complete);
        assert!(engine.layout().instances.is_empty());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let request = PlacementRequest {
            width: 8,
            height: 8,
            entrance_x: 0,
            entrance_y: 4,
            counts: vec![(kinds::CORNER_TABLE, 2), (kinds::SINGLE_TABLE, 2)],
        };
        let mut a = PlacementEngine::new(seeded(42));
        let mut b = PlacementEngine::new(seeded(42));
        a.run(&request).unwrap();
        b.run(&request).unwrap();
        assert_eq!(a.layout(), b.layout(), "identical seeds reproduce the layout");
    }

    #[test]
    fn test_invalid_dimension_rejected() {
        let mut engine = PlacementEngine::new(seeded(1));
        let err = engine
            .run(&PlacementRequest {
                width: 0,
                height: 5,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![],
            })
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidDimension { width: 0, height: 5 });
    }

    #[test]
    fn test_entrance_out_of_bounds_rejected() {
        let mut engine = PlacementEngine::new(seeded(1));
        let err = engine
            .run(&PlacementRequest {
                width: 4,
                height: 4,
                entrance_x: 4,
                entrance_y: 0,
                counts: vec![],
            })
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidEntrance { x: 4, y: 0 });
    }

    #[test]
    fn test_entrance_on_wall_rejected_without_mutation() {
        let mut engine = PlacementEngine::new(seeded(9));
        engine
            .run(&PlacementRequest {
                width: 4,
                height: 4,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![],
            })
            .unwrap();
        assert!(engine.paint_wall(2, 2));
        let before = engine.layout().clone();

        let err = engine
            .run(&PlacementRequest {
                width: 4,
                height: 4,
                entrance_x: 2,
                entrance_y: 2,
                counts: vec![(kinds::SINGLE_TABLE, 1)],
            })
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidEntrance { x: 2, y: 2 });
        assert_eq!(engine.layout(), &before, "failed validation mutates nothing");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut engine = PlacementEngine::new(seeded(1));
        let err = engine
            .run(&PlacementRequest {
                width: 4,
                height: 4,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![(99, 1)],
            })
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownFurnitureKind(99));
    }

    #[test]
    fn test_walls_survive_rerun_and_resize() {
        let mut engine = PlacementEngine::new(seeded(5));
        engine
            .run(&PlacementRequest {
                width: 4,
                height: 4,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![],
            })
            .unwrap();
        engine.paint_wall(3, 3);
        engine.paint_wall(1, 2);

        // Re-run with a larger room: both walls sit in the overlap.
        engine
            .run(&PlacementRequest {
                width: 6,
                height: 6,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![],
            })
            .unwrap();
        let grid = engine.grid().unwrap();
        assert_eq!(grid.get(3, 3), Ok(Cell::Wall));
        assert_eq!(grid.get(1, 2), Ok(Cell::Wall));

        // Shrink past one wall: only the overlapping wall survives.
        engine
            .run(&PlacementRequest {
                width: 2,
                height: 3,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![],
            })
            .unwrap();
        let grid = engine.grid().unwrap();
        assert_eq!(grid.get(1, 2), Ok(Cell::Wall));
        assert!(!grid.in_bounds(3, 3));
    }

    #[test]
    fn test_wall_editing_noops() {
        let mut engine = PlacementEngine::new(seeded(2));
        assert!(!engine.paint_wall(0, 0), "no room yet");

        engine
            .run(&PlacementRequest {
                width: 3,
                height: 3,
                entrance_x: 1,
                entrance_y: 1,
                counts: vec![],
            })
            .unwrap();
        assert!(!engine.paint_wall(1, 1), "entrance cell is not Empty");
        assert!(!engine.paint_wall(5, 5), "out of bounds is a no-op");
        assert!(!engine.erase_wall(0, 0), "no wall to erase");

        assert!(engine.paint_wall(2, 2));
        assert!(!engine.paint_wall(2, 2), "already a wall");
        assert!(engine.erase_wall(2, 2));
        assert!(!engine.erase_wall(2, 2), "wall already gone");
    }

    #[test]
    fn test_events_mirror_commits() {
        let (tx, rx) = mpsc::channel();
        let mut engine = PlacementEngine::new(seeded(13));
        engine.set_event_sink(Some(tx));
        engine
            .run(&PlacementRequest {
                width: 6,
                height: 6,
                entrance_x: 0,
                entrance_y: 0,
                counts: vec![(kinds::SINGLE_TABLE, 2)],
            })
            .unwrap();
        engine.set_event_sink(None);

        let events: Vec<PlacementEvent> = rx.try_iter().collect();
        let commits = events
            .iter()
            .filter(|e| matches!(e, PlacementEvent::Committed { .. }))
            .count();
        assert_eq!(commits, 2, "one Committed event per instance");
        assert_eq!(
            events.last(),
            Some(&PlacementEvent::Finished { complete: true })
        );
    }

    // ── rearrangement internals ─────────────────────────────────────────

    fn template(pattern: &[&str]) -> Template {
        Template::parse(pattern).unwrap()
    }

    #[test]
    fn test_rearrange_zero_budget_restores_exactly() {
        let mut grid = Grid::new(3, 1).unwrap();
        let t = template(&["Sh"]);
        paint(&mut grid, &t, 0, 0);
        grid.set(2, 0, Cell::Entrance).unwrap();
        let mut layout = LayoutState {
            instances: vec![PlacedInstance {
                anchor_x: 0,
                anchor_y: 0,
                template: t,
            }],
            entrance_x: 2,
            entrance_y: 0,
        };
        let before_grid = grid.clone();
        let before_layout = layout.clone();

        let limits = SearchLimits {
            rearrange_attempts: 0,
            ..SearchLimits::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!rearrange(&mut grid, &mut layout, &mut rng, &limits));
        assert_eq!(grid, before_grid, "grid restored cell-for-cell");
        assert_eq!(layout, before_layout, "instance back at its original anchor");
    }

    #[test]
    fn test_rearrange_no_valid_position_restores_after_trying() {
        // E . . S h — no anchor gives the seat a reachable neighbor, so
        // the instance must come back to (3, 0) after a real search.
        let mut grid = Grid::new(5, 1).unwrap();
        let t = template(&["Sh"]);
        paint(&mut grid, &t, 3, 0);
        grid.set(0, 0, Cell::Entrance).unwrap();
        let mut layout = LayoutState {
            instances: vec![PlacedInstance {
                anchor_x: 3,
                anchor_y: 0,
                template: t,
            }],
            entrance_x: 0,
            entrance_y: 0,
        };
        let before_grid = grid.clone();
        let before_layout = layout.clone();

        let limits = SearchLimits {
            rearrange_attempts: 100,
            ..SearchLimits::default()
        };
        let mut rng = StdRng::seed_from_u64(4);
        assert!(!rearrange(&mut grid, &mut layout, &mut rng, &limits));
        assert_eq!(grid, before_grid);
        assert_eq!(layout, before_layout);
    }

    #[test]
    fn test_rearrange_relocates_when_possible() {
        // E . .
        // S h .
        let mut grid = Grid::new(3, 2).unwrap();
        let t = template(&["Sh"]);
        paint(&mut grid, &t, 0, 1);
        grid.set(0, 0, Cell::Entrance).unwrap();
        let mut layout = LayoutState {
            instances: vec![PlacedInstance {
                anchor_x: 0,
                anchor_y: 1,
                template: t.clone(),
            }],
            entrance_x: 0,
            entrance_y: 0,
        };

        let limits = SearchLimits {
            rearrange_attempts: 200,
            ..SearchLimits::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        assert!(rearrange(&mut grid, &mut layout, &mut rng, &limits));
        assert_eq!(layout.instances.len(), 1);
        let inst = &layout.instances[0];
        for (x, y, cell) in inst.footprint() {
            assert_eq!(grid.get(x, y), Ok(cell));
        }
        assert!(seats_reachable(&grid, &layout));
    }

    // ── manual relocation ───────────────────────────────────────────────

    fn engine_with(grid: Grid, layout: LayoutState) -> PlacementEngine {
        PlacementEngine::from_parts(seeded(0), grid, layout, Vec::new())
    }

    fn horizontal_pair_room() -> PlacementEngine {
        // E . . . .
        // . S h . .
        let mut grid = Grid::new(5, 2).unwrap();
        let t = template(&["Sh"]);
        paint(&mut grid, &t, 1, 1);
        grid.set(0, 0, Cell::Entrance).unwrap();
        engine_with(
            grid,
            LayoutState {
                instances: vec![PlacedInstance {
                    anchor_x: 1,
                    anchor_y: 1,
                    template: t,
                }],
                entrance_x: 0,
                entrance_y: 0,
            },
        )
    }

    #[test]
    fn test_move_instance_success() {
        let mut engine = horizontal_pair_room();
        assert_eq!(engine.move_instance(0, 3, 1), MoveOutcome::Moved);
        let grid = engine.grid().unwrap();
        assert_eq!(grid.get(1, 1), Ok(Cell::Empty), "old cells are cleared");
        assert_eq!(grid.get(2, 1), Ok(Cell::Empty));
        assert_eq!(grid.get(3, 1), Ok(Cell::TableBody));
        assert_eq!(grid.get(4, 1), Ok(Cell::Seat));
        assert_eq!(engine.layout().instances[0].anchor_x, 3);
    }

    #[test]
    fn test_move_instance_rejects_overlap() {
        let mut engine = horizontal_pair_room();
        // Onto the entrance cell.
        assert_eq!(engine.move_instance(0, 0, 0), MoveOutcome::RejectedOverlap);
        // Out of the room.
        assert_eq!(engine.move_instance(0, 4, 1), MoveOutcome::RejectedOverlap);
        assert_eq!(engine.layout().instances[0].anchor_x, 1, "layout unchanged");
    }

    #[test]
    fn test_move_instance_can_reoccupy_own_cells() {
        // A one-cell shift overlaps the instance's current footprint; the
        // scratch-grid check must not count the instance against itself.
        let mut engine = horizontal_pair_room();
        assert_eq!(engine.move_instance(0, 2, 1), MoveOutcome::Moved);
        assert_eq!(engine.layout().instances[0].anchor_x, 2);
    }

    #[test]
    fn test_move_instance_reverts_on_seat_access_failure() {
        // E S . W .
        // . h . W .
        // The pocket right of the wall is placeable but its seat would be
        // sealed off, so the move must revert in full.
        let mut grid = Grid::new(5, 2).unwrap();
        let t = template(&["S", "h"]);
        paint(&mut grid, &t, 1, 0);
        grid.set(0, 0, Cell::Entrance).unwrap();
        grid.set(3, 0, Cell::Wall).unwrap();
        grid.set(3, 1, Cell::Wall).unwrap();
        let mut engine = engine_with(
            grid,
            LayoutState {
                instances: vec![PlacedInstance {
                    anchor_x: 1,
                    anchor_y: 0,
                    template: t,
                }],
                entrance_x: 0,
                entrance_y: 0,
            },
        );

        assert_eq!(engine.move_instance(0, 4, 0), MoveOutcome::RejectedSeatAccess);
        let grid = engine.grid().unwrap();
        assert_eq!(grid.get(1, 0), Ok(Cell::TableBody), "original paint restored");
        assert_eq!(grid.get(1, 1), Ok(Cell::Seat));
        assert_eq!(grid.get(4, 0), Ok(Cell::Empty), "rejected paint removed");
        assert_eq!(grid.get(4, 1), Ok(Cell::Empty));
        assert_eq!(engine.layout().instances[0].anchor_x, 1);
    }
}
