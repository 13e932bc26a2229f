//! Save/Load functionality for room layouts.
//!
//! Uses serde_json for human-readable snapshots of the complete state:
//! room cells, entrance, requested counts, and the ordered placed
//! instances. Loading reproduces the grid and layout verbatim, without
//! re-running the placement search.

use crate::layout::{LayoutState, PlacedInstance};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tableplan_logic::grid::Grid;

/// Version number for the snapshot format (increment when it changes).
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a room and its layout.
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Snapshot format version.
    pub version: u32,
    /// Room dimensions (duplicated from the grid for readability).
    pub width: i32,
    pub height: i32,
    pub entrance_x: i32,
    pub entrance_y: i32,
    /// (kind, count) pairs from the request that produced the layout.
    pub requested: Vec<(u8, u32)>,
    /// Placed instances in placement order.
    pub placed: Vec<PlacedInstance>,
    /// Full cell array, walls and furniture paint included.
    pub grid: Grid,
}

/// Result of loading a snapshot.
pub struct LoadedLayout {
    pub grid: Grid,
    pub layout: LayoutState,
    pub requested: Vec<(u8, u32)>,
}

/// Errors that can occur during save/load.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
    /// Save was requested before any room existed.
    NoRoom,
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Json(e) => write!(f, "serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "snapshot version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::NoRoom => write!(f, "no room to save"),
        }
    }
}

impl std::error::Error for SaveError {}

/// Write a complete snapshot to a writer.
pub fn save_layout<W: Write>(
    writer: W,
    grid: &Grid,
    layout: &LayoutState,
    requested: &[(u8, u32)],
) -> Result<(), SaveError> {
    let data = SaveData {
        version: SAVE_VERSION,
        width: grid.width(),
        height: grid.height(),
        entrance_x: layout.entrance_x,
        entrance_y: layout.entrance_y,
        requested: requested.to_vec(),
        placed: layout.instances.clone(),
        grid: grid.clone(),
    };
    serde_json::to_writer_pretty(writer, &data)?;
    Ok(())
}

/// Read a snapshot from a reader.
pub fn load_layout<R: Read>(reader: R) -> Result<LoadedLayout, SaveError> {
    let data: SaveData = serde_json::from_reader(reader)?;
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(LoadedLayout {
        grid: data.grid,
        layout: LayoutState {
            instances: data.placed,
            entrance_x: data.entrance_x,
            entrance_y: data.entrance_y,
        },
        requested: data.requested,
    })
}
