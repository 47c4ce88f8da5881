//! Spatial computations for canvas layout and tile scheduling
//!
//! This module contains spatial-related functionality including:
//! - Canvas expansion and tile movement primitives
//! - The ordered tile-visit plan
//! - Tile classification against subject boxes

/// Expansion, tile origin and movement primitives
pub mod geometry;
/// Direction-ordered tile plan
pub mod plan;
/// Overlap tests for subject-aware prompting and the skip rule
pub mod regions;

pub use geometry::{Dimensions, Direction, Expansion, Point, Rect};
pub use plan::{PlanKey, TilePlan};
