//! The authoritative record of placed furniture.
//!
//! [`LayoutState`] is an ordered sequence of [`PlacedInstance`] — insertion
//! order equals placement order, which the rearrangement phase depends on —
//! plus the entrance coordinates. The engine keeps it in lockstep with the
//! cells painted on the grid; the two never diverge between operations.

use serde::{Deserialize, Serialize};
use tableplan_logic::grid::Cell;
use tableplan_logic::shapes::Template;

/// One committed piece of furniture: a template anchored at its top-left
/// origin in grid coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedInstance {
    pub anchor_x: i32,
    pub anchor_y: i32,
    pub template: Template,
}

impl PlacedInstance {
    /// Grid positions of the instance's non-Empty template cells.
    pub fn footprint(&self) -> Vec<(i32, i32, Cell)> {
        self.template
            .cells()
            .filter(|&(_, _, c)| c != Cell::Empty)
            .map(|(dx, dy, c)| (self.anchor_x + dx, self.anchor_y + dy, c))
            .collect()
    }

    /// Grid positions of the instance's Seat cells.
    pub fn seats(&self) -> Vec<(i32, i32)> {
        self.template
            .seat_offsets()
            .into_iter()
            .map(|(dx, dy)| (self.anchor_x + dx, self.anchor_y + dy))
            .collect()
    }
}

/// Ordered placed instances plus the entrance location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    pub instances: Vec<PlacedInstance>,
    pub entrance_x: i32,
    pub entrance_y: i32,
}

impl LayoutState {
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Grid positions of every seat across all placed instances.
    pub fn seats(&self) -> Vec<(i32, i32)> {
        self.instances.iter().flat_map(|i| i.seats()).collect()
    }
}
