//! Tile classification against subject boxes and the pasted original

use crate::spatial::geometry::{Dimensions, Expansion, Rect};

/// Whether `tile` shares positive area with any subject box
///
/// Boxes that only touch the tile along an edge do not count.
pub fn overlaps_any(tile: &Rect, subjects: &[Rect]) -> bool {
    subjects.iter().any(|subject| tile.intersects(subject))
}

/// Canvas rectangle occupied by the original image
pub const fn placement_rect(expansion: Expansion, input: Dimensions) -> Rect {
    Rect::from_origin(expansion.origin(), input)
}

/// Whether `tile` lies entirely over the pasted original and needs no generation
pub const fn is_covered_by_original(tile: &Rect, placement: &Rect) -> bool {
    placement.contains(tile)
}

/// Map boxes from original-image coordinates into canvas coordinates
pub fn to_canvas_space(boxes: &[Rect], expansion: Expansion) -> Vec<Rect> {
    boxes
        .iter()
        .map(|rect| rect.offset(expansion.left, expansion.top))
        .collect()
}
