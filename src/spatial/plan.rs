//! Ordered tile-visit plan built from axis rays and their cross-products
//!
//! The plan is grouped by compass key. Each axis ray starts from the initial
//! tile and walks outward until the canvas edge stops it; every diagonal
//! quadrant is the cross-product of one vertical and one horizontal ray.
//! Rays never chain from one another, so e.g. `up` and `down` are
//! independent and diagonals are never produced by moving diagonally.

use crate::io::error::{Result, invalid_parameter};
use crate::spatial::geometry::{Dimensions, Direction, Point, move_tile};
use tracing::debug;

/// Plan group label, in visit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanKey {
    /// The tile centered over the original image
    Init,
    /// Ray above the initial tile
    Up,
    /// Ray left of the initial tile
    Left,
    /// Ray right of the initial tile
    Right,
    /// Ray below the initial tile
    Down,
    /// `up` x `left` cross-product
    UpLeft,
    /// `up` x `right` cross-product
    UpRight,
    /// `down` x `left` cross-product
    DownLeft,
    /// `down` x `right` cross-product
    DownRight,
}

impl PlanKey {
    /// Fixed concatenation order of the flattened visit sequence
    pub const ORDER: [Self; 9] = [
        Self::Init,
        Self::Up,
        Self::Left,
        Self::Right,
        Self::Down,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
    ];

    /// Snake-case name used in logs
    pub const fn label(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Up => "up",
            Self::Left => "left",
            Self::Right => "right",
            Self::Down => "down",
            Self::UpLeft => "up_left",
            Self::UpRight => "up_right",
            Self::DownLeft => "down_left",
            Self::DownRight => "down_right",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Init => 0,
            Self::Up => 1,
            Self::Left => 2,
            Self::Right => 3,
            Self::Down => 4,
            Self::UpLeft => 5,
            Self::UpRight => 6,
            Self::DownLeft => 7,
            Self::DownRight => 8,
        }
    }

    const fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::Up,
            Direction::Left => Self::Left,
            Direction::Right => Self::Right,
            Direction::Down => Self::Down,
        }
    }
}

/// Tile origins grouped by plan key, each group ordered nearest-first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TilePlan {
    groups: [Vec<Point>; 9],
}

impl TilePlan {
    /// Tile origins planned under `key`
    pub fn get(&self, key: PlanKey) -> &[Point] {
        self.groups.get(key.index()).map_or(&[], Vec::as_slice)
    }

    fn group_mut(&mut self, key: PlanKey) -> Option<&mut Vec<Point>> {
        self.groups.get_mut(key.index())
    }

    /// Groups in visit order
    pub fn iter(&self) -> impl Iterator<Item = (PlanKey, &[Point])> + '_ {
        PlanKey::ORDER.iter().map(|&key| (key, self.get(key)))
    }

    /// All tile origins concatenated in visit order
    pub fn visit_order(&self) -> Vec<Point> {
        self.iter()
            .flat_map(|(_, points)| points.iter().copied())
            .collect()
    }

    /// Total number of planned tiles
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Whether no tile is planned
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the full ordered plan around `initial`
///
/// # Errors
///
/// Returns an error if `square` or `step` is zero; a zero step would never
/// reach the canvas edge.
pub fn build_plan(
    initial: Point,
    square: u32,
    step: u32,
    canvas: Dimensions,
) -> Result<TilePlan> {
    if square == 0 {
        return Err(invalid_parameter(
            "square",
            &square,
            &"tile size must be positive",
        ));
    }
    if step == 0 {
        return Err(invalid_parameter("step", &step, &"step must be positive"));
    }

    let mut plan = TilePlan::default();
    if let Some(init) = plan.group_mut(PlanKey::Init) {
        init.push(initial);
    }

    for direction in Direction::ALL {
        let ray = trace_ray(initial, direction, step, square, canvas);
        if let Some(group) = plan.group_mut(PlanKey::from_direction(direction)) {
            *group = ray;
        }
    }

    let quadrants = [
        (PlanKey::UpLeft, PlanKey::Up, PlanKey::Left),
        (PlanKey::UpRight, PlanKey::Up, PlanKey::Right),
        (PlanKey::DownLeft, PlanKey::Down, PlanKey::Left),
        (PlanKey::DownRight, PlanKey::Down, PlanKey::Right),
    ];
    for (quadrant, vertical, horizontal) in quadrants {
        let cells: Vec<Point> = plan
            .get(vertical)
            .iter()
            .flat_map(|row| {
                plan.get(horizontal)
                    .iter()
                    .map(move |column| Point::new(column.x, row.y))
            })
            .collect();
        if let Some(group) = plan.group_mut(quadrant) {
            *group = cells;
        }
    }

    for (key, points) in plan.iter() {
        debug!(direction = key.label(), tiles = points.len(), ?points, "Planned tiles");
    }

    Ok(plan)
}

// Walk from the initial origin until the clamp stops movement
fn trace_ray(
    initial: Point,
    direction: Direction,
    step: u32,
    square: u32,
    canvas: Dimensions,
) -> Vec<Point> {
    let mut ray = Vec::new();
    let mut current = initial;
    while let Some(next) = move_tile(current, direction, step, square, canvas) {
        ray.push(next);
        current = next;
    }
    ray
}
