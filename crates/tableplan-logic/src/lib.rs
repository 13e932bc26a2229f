//! Pure placement logic for tableplan.
//!
//! This crate contains the algorithmic core that is independent of any
//! engine, persistence format, or UI. Functions take plain data and return
//! results, making them unit-testable and portable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`grid`] | Room cell state with bounds-checked accessors |
//! | [`shapes`] | Furniture templates, rotation/mirror transforms, variant sets |
//! | [`reachability`] | BFS from the entrance, seat accessibility checks |

pub mod grid;
pub mod reachability;
pub mod shapes;
