//! Furniture kind registry.
//!
//! Defines the closed set of furniture kinds the engine can place, each a
//! numeric identifier with a base template pattern.
//!
//! Kind data is loaded from `data/furniture_kinds.json` at compile time via
//! `include_str!()`. To add or modify furniture kinds, edit the JSON file —
//! no code changes required.

use crate::engine::EngineError;
use serde::Deserialize;
use tableplan_logic::shapes::Template;

/// Furniture kind identifiers matching `data/furniture_kinds.json`.
pub mod kinds {
    pub const CORNER_TABLE: u8 = 1;
    pub const DOUBLE_TABLE: u8 = 2;
    pub const SINGLE_TABLE: u8 = 3;
}

/// Manifest entry — describes one kind of furniture to instantiate.
///
/// Deserialized from `data/furniture_kinds.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct FurnitureSpec {
    pub kind: u8,
    pub name: String,
    /// Base pattern as symbol rows (`.` empty, `S` table body, `h` seat).
    pub pattern: Vec<String>,
}

/// Returns the complete furniture manifest.
///
/// Loaded from `data/furniture_kinds.json` embedded at compile time.
pub fn furniture_manifest() -> Vec<FurnitureSpec> {
    const KINDS_JSON: &str = include_str!("../../../data/furniture_kinds.json");
    serde_json::from_str(KINDS_JSON).expect("furniture_kinds.json is invalid")
}

/// Base template for a kind, or `UnknownFurnitureKind` if the identifier
/// is not in the manifest.
pub fn base_template(kind: u8) -> Result<Template, EngineError> {
    let manifest = furniture_manifest();
    let spec = manifest
        .iter()
        .find(|s| s.kind == kind)
        .ok_or(EngineError::UnknownFurnitureKind(kind))?;
    Ok(Template::parse(&spec.pattern).expect("furniture pattern in manifest is invalid"))
}
