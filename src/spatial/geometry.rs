//! Canvas expansion and tile positioning primitives
//!
//! All functions here are pure. Coordinates are unsigned pixel offsets in
//! canvas space unless stated otherwise; rectangles are half-open.

/// Integer pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Horizontal offset from the left edge
    pub x: u32,
    /// Vertical offset from the top edge
    pub y: u32,
}

impl Point {
    /// Create a point
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Width and height of an image or canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create a dimension pair
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Geometric center, rounded toward the origin
    pub const fn center(self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }
}

/// Axis-aligned rectangle with half-open extents `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge (inclusive)
    pub x0: u32,
    /// Top edge (inclusive)
    pub y0: u32,
    /// Right edge (exclusive)
    pub x1: u32,
    /// Bottom edge (exclusive)
    pub y1: u32,
}

impl Rect {
    /// Create a rectangle from its edges
    pub const fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Square tile of side `square` whose top-left corner is `origin`
    pub const fn tile(origin: Point, square: u32) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x.saturating_add(square),
            origin.y.saturating_add(square),
        )
    }

    /// Rectangle at `origin` with the given size
    pub const fn from_origin(origin: Point, size: Dimensions) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x.saturating_add(size.width),
            origin.y.saturating_add(size.height),
        )
    }

    /// Translate by a non-negative offset
    pub const fn offset(self, dx: u32, dy: u32) -> Self {
        Self::new(
            self.x0.saturating_add(dx),
            self.y0.saturating_add(dy),
            self.x1.saturating_add(dx),
            self.y1.saturating_add(dy),
        )
    }

    /// Center point, rounded toward the origin
    pub const fn center(self) -> Point {
        Point::new(
            self.x0 + (self.x1.saturating_sub(self.x0)) / 2,
            self.y0 + (self.y1.saturating_sub(self.y0)) / 2,
        )
    }

    /// Positive-area intersection test; shared edges do not count
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x0 < other.x1 && self.x1 > other.x0 && self.y0 < other.y1 && self.y1 > other.y0
    }

    /// Whether `other` lies entirely within this rectangle
    pub const fn contains(&self, other: &Self) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }
}

/// Padding added on each side of the original image to reach the canvas size
///
/// `left + right` equals the horizontal growth and `top + bottom` the
/// vertical growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Expansion {
    /// Columns added left of the original
    pub left: u32,
    /// Columns added right of the original
    pub right: u32,
    /// Rows added above the original
    pub top: u32,
    /// Rows added below the original
    pub bottom: u32,
}

impl Expansion {
    /// Canvas position at which the original image is pasted
    pub const fn origin(self) -> Point {
        Point::new(self.left, self.top)
    }
}

/// Primitive compass movement used to grow tile rays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward `y = 0`
    Up,
    /// Toward `x = 0`
    Left,
    /// Toward the right canvas edge
    Right,
    /// Toward the bottom canvas edge
    Down,
}

impl Direction {
    /// Ray order used by the planner
    pub const ALL: [Self; 4] = [Self::Up, Self::Left, Self::Right, Self::Down];

    /// Step `origin` along this direction, clamped to keep the tile on the canvas
    ///
    /// Returns the new origin even when it equals the old one; `move_tile`
    /// turns that into the stop signal. A tile never moves along an axis it
    /// already spans, and `Right`/`Down` never move toward the origin.
    pub const fn advance(self, origin: Point, step: u32, square: u32, canvas: Dimensions) -> Point {
        match self {
            Self::Up => Point::new(origin.x, backward(origin.y, step, square, canvas.height)),
            Self::Left => Point::new(backward(origin.x, step, square, canvas.width), origin.y),
            Self::Right => Point::new(
                forward(origin.x, step, canvas.width.saturating_sub(square)),
                origin.y,
            ),
            Self::Down => Point::new(
                origin.x,
                forward(origin.y, step, canvas.height.saturating_sub(square)),
            ),
        }
    }

    /// Lowercase name used in plan keys and logs
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Left => "left",
            Self::Right => "right",
            Self::Down => "down",
        }
    }
}

/// Step toward zero unless the tile already spans the whole axis
const fn backward(start: u32, step: u32, square: u32, extent: u32) -> u32 {
    if square >= extent {
        start
    } else {
        start.saturating_sub(step)
    }
}

/// Step toward `far` without ever moving back past `start`
///
/// A tile that already sits beyond `far` (possible when the tile is larger
/// than the canvas) stays put.
const fn forward(start: u32, step: u32, far: u32) -> u32 {
    let next = start.saturating_add(step);
    let next = if next < far { next } else { far };
    if next > start { next } else { start }
}

/// Split the canvas growth around the focal point
///
/// The share before the focal point is proportional to where the focal
/// point sits in the original, floored; the opposite side gets the exact
/// remainder. Focal coordinates outside the image are clamped into it.
pub fn compute_expansion(focal: Point, input: Dimensions, output: Dimensions) -> Expansion {
    let (left, right) = split_padding(focal.x, input.width, output.width);
    let (top, bottom) = split_padding(focal.y, input.height, output.height);
    Expansion {
        left,
        right,
        top,
        bottom,
    }
}

fn split_padding(focal: u32, input: u32, output: u32) -> (u32, u32) {
    let total = output.saturating_sub(input);
    let focal = focal.min(input.saturating_sub(1));
    let leading = (u64::from(total) * u64::from(focal))
        .checked_div(u64::from(input))
        .and_then(|share| u32::try_from(share).ok())
        .unwrap_or(0)
        .min(total);
    (leading, total - leading)
}

/// Top-left corner of the first tile, centered over the pasted original
///
/// `x = max(0, left - (square - input_w) / 2)` with division truncating
/// toward zero, and the same for `y`.
pub fn initial_tile_origin(expansion: Expansion, square: u32, input: Dimensions) -> Point {
    Point::new(
        centered_start(expansion.left, square, input.width),
        centered_start(expansion.top, square, input.height),
    )
}

fn centered_start(padding: u32, square: u32, input: u32) -> u32 {
    let shift = (i64::from(square) - i64::from(input)) / 2;
    u32::try_from((i64::from(padding) - shift).max(0)).unwrap_or(u32::MAX)
}

/// Next tile origin along `direction`, or `None` when the tile cannot move
///
/// `None` is the ray termination signal for plan building.
pub fn move_tile(
    origin: Point,
    direction: Direction,
    step: u32,
    square: u32,
    canvas: Dimensions,
) -> Option<Point> {
    let next = direction.advance(origin, step, square, canvas);
    (next != origin).then_some(next)
}
