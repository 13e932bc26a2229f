//! Room furnishing engine.
//!
//! Places tables with attached seating into a rectangular room under two
//! hard constraints: no overlap with walls or other furniture, and every
//! seat reachable from the entrance through open floor. The search is
//! randomized with bounded retries and a backtracking rearrangement phase;
//! it is a best-effort local search, not a complete constraint solver, so
//! exhaustion on dense rooms is an expected, reported outcome.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`manifest`] | Data-driven furniture kind registry (JSON, embedded) |
//! | [`layout`] | Placed instances and the authoritative layout record |
//! | [`engine`] | Randomized placement search, rearrangement, manual moves |
//! | [`worker`] | Background placement thread with progress events |
//! | [`persistence`] | Versioned JSON snapshots of room + layout |

pub mod engine;
pub mod layout;
pub mod manifest;
pub mod persistence;
pub mod worker;
