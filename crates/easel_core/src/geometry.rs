//! Geometric primitives

use std::ops::{Add, Mul, Neg, Sub};

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        (self - other).length()
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub(crate) fn to_lyon(self) -> lyon::math::Point {
        lyon::math::point(self.x, self.y)
    }

    pub(crate) fn from_lyon(p: lyon::math::Point) -> Self {
        Point::new(p.x, p.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle
///
/// A rect with a negative or zero width or height is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_points(p1: Point, p2: Point) -> Self {
        Self {
            x: p1.x.min(p2.x),
            y: p1.y.min(p2.y),
            width: (p2.x - p1.x).abs(),
            height: (p2.y - p1.y).abs(),
        }
    }

    /// Smallest rect containing every point, `None` for an empty iterator
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Rect::from_points(min, max))
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Corners in clockwise order (screen coordinates) starting at the origin
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Overlap of two rects, `None` when they do not overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        let r = Rect::new(x0, y0, x1 - x0, y1 - y0);
        (!r.is_empty()).then_some(r)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Per-corner elliptical radii of a rounded rectangle
///
/// Each corner carries an x and a y radius; all default to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct CornerRadii {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub top_right_x: f32,
    pub top_right_y: f32,
    pub bottom_left_x: f32,
    pub bottom_left_y: f32,
    pub bottom_right_x: f32,
    pub bottom_right_y: f32,
}

impl CornerRadii {
    pub const fn uniform(radius: f32) -> Self {
        Self {
            top_left_x: radius,
            top_left_y: radius,
            top_right_x: radius,
            top_right_y: radius,
            bottom_left_x: radius,
            bottom_left_y: radius,
            bottom_right_x: radius,
            bottom_right_y: radius,
        }
    }

    /// Radii in `ltx, lty, rtx, rty, lbx, lby, rbx, rby` order
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        ltx: f32,
        lty: f32,
        rtx: f32,
        rty: f32,
        lbx: f32,
        lby: f32,
        rbx: f32,
        rby: f32,
    ) -> Self {
        Self {
            top_left_x: ltx,
            top_left_y: lty,
            top_right_x: rtx,
            top_right_y: rty,
            bottom_left_x: lbx,
            bottom_left_y: lby,
            bottom_right_x: rbx,
            bottom_right_y: rby,
        }
    }

    fn to_array(self) -> [f32; 8] {
        [
            self.top_left_x,
            self.top_left_y,
            self.top_right_x,
            self.top_right_y,
            self.bottom_left_x,
            self.bottom_left_y,
            self.bottom_right_x,
            self.bottom_right_y,
        ]
    }

    /// Scale all radii down uniformly so adjacent corners never overlap
    /// inside `rect`. Negative radii are treated as zero.
    pub fn normalized(self, rect: &Rect) -> Self {
        let mut r = self.to_array().map(|v| v.max(0.0));
        let w = rect.width.abs();
        let h = rect.height.abs();
        let mut k = 1.0f32;
        let pairs = [
            (r[0] + r[2], w), // top edge
            (r[4] + r[6], w), // bottom edge
            (r[1] + r[5], h), // left edge
            (r[3] + r[7], h), // right edge
        ];
        for (sum, edge) in pairs {
            if sum > edge && sum > 0.0 {
                k = k.min(edge / sum);
            }
        }
        if k < 1.0 {
            for v in &mut r {
                *v *= k;
            }
        }
        CornerRadii::new(r[0], r[1], r[2], r[3], r[4], r[5], r[6], r[7])
    }

    pub fn is_zero(&self) -> bool {
        self.to_array().iter().all(|v| *v <= 0.0)
    }
}

impl From<f32> for CornerRadii {
    fn from(radius: f32) -> Self {
        Self::uniform(radius)
    }
}

/// A rectangle with per-corner radii
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct RoundedRect {
    pub rect: Rect,
    pub radii: CornerRadii,
}

impl RoundedRect {
    pub fn new(rect: Rect, radii: impl Into<CornerRadii>) -> Self {
        Self {
            rect,
            radii: radii.into(),
        }
    }
}
