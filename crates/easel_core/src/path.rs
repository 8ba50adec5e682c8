//! Path building and representation
//!
//! A [`Path`] is an ordered list of [`PathCommand`]s grouped into sub-paths.
//! Every sub-path in the command list starts with a `MoveTo`; the builder
//! inserts one whenever a segment is appended without a current sub-path.

use std::f32::consts::{FRAC_PI_2, TAU};

use smallvec::SmallVec;

use crate::clip::{self, ClipOp};
use crate::error::{ensure_finite, Error, Result};
use crate::flatten::{self, Polyline};
use crate::geometry::{CornerRadii, Point, Rect, RoundedRect};
use crate::matrix::Matrix2D;

/// Bezier handle length for a quarter ellipse
pub(crate) const KAPPA: f32 = 0.552_284_8;

crate::named_enum! {
    /// Rule deciding which points are inside a self-overlapping shape
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum FillRule {
        #[default]
        NonZero => "nonzero",
        EvenOdd => "evenodd",
    }
}

impl FillRule {
    /// Whether a point with the given winding number is inside
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }
}

/// Path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo {
        control: Point,
        end: Point,
    },
    CubicTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    /// SVG-style elliptical arc from the current point to `end`
    ArcTo {
        radii: Point,
        /// Rotation of the ellipse x axis, in radians
        rotation: f32,
        large_arc: bool,
        /// `true` sweeps in the positive angle direction (clockwise on screen)
        sweep: bool,
        end: Point,
    },
    Close,
}

impl PathCommand {
    /// Final point of the command, `None` for `Close`
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
            PathCommand::QuadTo { end, .. }
            | PathCommand::CubicTo { end, .. }
            | PathCommand::ArcTo { end, .. } => Some(end),
            PathCommand::Close => None,
        }
    }

    /// Number of stored points (control points included)
    fn vertex_count(&self) -> usize {
        match self {
            PathCommand::QuadTo { .. } => 2,
            PathCommand::CubicTo { .. } => 3,
            _ => 1,
        }
    }
}

/// A 2D vector path composed of commands
///
/// Paths are plain values: cloning one gives an independent copy, and a
/// drawing context copies whatever path it is handed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: SmallVec<[PathCommand; 16]>,
    /// First point of the current sub-path
    start: Point,
    /// Current point, `None` until the first command
    cursor: Option<Point>,
    /// The next segment has to re-emit a `MoveTo(cursor)` first
    needs_move: bool,
}

impl Path {
    /// Fixed tolerance used by length, hit-testing and boolean clipping
    pub const FLATTEN_TOLERANCE: f32 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a path from raw commands
    ///
    /// Commands are replayed through the builder, so segments without a
    /// preceding `MoveTo` get one.
    pub fn from_commands(commands: impl IntoIterator<Item = PathCommand>) -> Self {
        let mut path = Path::new();
        path.extend_commands(commands);
        path
    }

    /// Rectangle path
    pub fn rect(rect: Rect) -> Self {
        let mut path = Path::new();
        path.add_rect(rect);
        path
    }

    /// Ellipse inscribed in `rect`
    pub fn ellipse(rect: Rect) -> Self {
        let mut path = Path::new();
        path.add_ellipse(rect);
        path
    }

    /// Circle path
    pub fn circle(center: Point, radius: f32) -> Self {
        Self::ellipse(Rect::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        ))
    }

    /// Rounded rectangle path
    pub fn rounded_rect(rr: RoundedRect) -> Self {
        let mut path = Path::new();
        path.add_rounded_rect(rr.rect, rr.radii);
        path
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of stored points, counting curve control points and closes
    pub fn vertex_count(&self) -> usize {
        self.commands.iter().map(PathCommand::vertex_count).sum()
    }

    /// Current point of the builder
    pub fn current_point(&self) -> Option<Point> {
        self.cursor
    }

    /// Remove every command
    pub fn clear(&mut self) {
        *self = Path::default();
    }

    // ---- building ----

    /// Start a new sub-path at `p`
    pub fn move_to(&mut self, p: Point) -> &mut Self {
        if let Some(PathCommand::MoveTo(last)) = self.commands.last_mut() {
            *last = p;
        } else {
            self.commands.push(PathCommand::MoveTo(p));
        }
        self.start = p;
        self.cursor = Some(p);
        self.needs_move = false;
        self
    }

    /// Make sure a sub-path is open; with no current point, start one at `p`
    fn begin_segment(&mut self, p: Point) {
        match self.cursor {
            None => {
                self.move_to(p);
            }
            Some(c) if self.needs_move => {
                self.move_to(c);
            }
            Some(_) => {}
        }
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.begin_segment(p);
        self.commands.push(PathCommand::LineTo(p));
        self.cursor = Some(p);
        self
    }

    /// Quadratic bezier to `end`
    pub fn quad_to(&mut self, control: Point, end: Point) -> &mut Self {
        self.begin_segment(control);
        self.commands.push(PathCommand::QuadTo { control, end });
        self.cursor = Some(end);
        self
    }

    /// Cubic bezier to `end`
    pub fn bezier_to(&mut self, control1: Point, control2: Point, end: Point) -> &mut Self {
        self.begin_segment(control1);
        self.commands.push(PathCommand::CubicTo {
            control1,
            control2,
            end,
        });
        self.cursor = Some(end);
        self
    }

    /// SVG-style elliptical arc from the current point to `end`
    ///
    /// `clockwise` selects the positive angle direction (clockwise on a
    /// y-down screen). Zero radii draw a straight line; negative or
    /// non-finite radii are rejected.
    pub fn arc_to(
        &mut self,
        rx: f32,
        ry: f32,
        rotation: f32,
        large_arc: bool,
        clockwise: bool,
        end: Point,
    ) -> Result<&mut Self> {
        ensure_finite("arc radius x", rx)?;
        ensure_finite("arc radius y", ry)?;
        ensure_finite("arc rotation", rotation)?;
        if rx < 0.0 || ry < 0.0 {
            return Err(Error::invalid(format!(
                "arc radii must be non-negative, got ({rx}, {ry})"
            )));
        }
        if self.cursor.is_none() {
            return Ok(self.move_to(end));
        }
        self.begin_segment(end);
        self.commands.push(PathCommand::ArcTo {
            radii: Point::new(rx, ry),
            rotation,
            large_arc,
            sweep: clockwise,
            end,
        });
        self.cursor = Some(end);
        Ok(self)
    }

    /// Circular arc of `radius` tangent to the lines from the current point
    /// to `tangent` and from `tangent` to `end`
    ///
    /// Appends a line to the first tangent point followed by the arc. When
    /// the three points are collinear, or the radius is zero, only a line to
    /// `tangent` is added.
    pub fn tangent_arc_to(&mut self, radius: f32, tangent: Point, end: Point) -> Result<&mut Self> {
        ensure_finite("tangent arc radius", radius)?;
        if radius < 0.0 {
            return Err(Error::invalid(format!(
                "tangent arc radius must be non-negative, got {radius}"
            )));
        }
        let Some(from) = self.cursor else {
            return Ok(self.move_to(tangent));
        };
        if from == tangent || tangent == end || radius == 0.0 {
            return Ok(self.line_to(tangent));
        }

        let to_start = from - tangent;
        let to_end = end - tangent;
        let d0 = to_start * (1.0 / to_start.length());
        let d1 = to_end * (1.0 / to_end.length());
        if d0.cross(d1).abs() < 1e-6 {
            return Ok(self.line_to(tangent));
        }

        let half_angle = d0.dot(d1).clamp(-1.0, 1.0).acos() / 2.0;
        let distance = radius / half_angle.tan();
        let t0 = tangent + d0 * distance;
        let t1 = tangent + d1 * distance;

        // Direction of travel turns from -d0 to d1
        let sweep = (-d0).cross(d1) > 0.0;
        self.line_to(t0);
        self.commands.push(PathCommand::ArcTo {
            radii: Point::new(radius, radius),
            rotation: 0.0,
            large_arc: false,
            sweep,
            end: t1,
        });
        self.cursor = Some(t1);
        Ok(self)
    }

    /// Close the current sub-path with a line back to its start
    ///
    /// Does nothing when no sub-path is open.
    pub fn sub_close(&mut self) -> &mut Self {
        let open = self.cursor.is_some()
            && !self.needs_move
            && !matches!(self.commands.last(), Some(PathCommand::Close) | None);
        if open {
            self.commands.push(PathCommand::Close);
            self.cursor = Some(self.start);
            self.needs_move = true;
        }
        self
    }

    /// End the current sub-path without closing it
    ///
    /// The next segment starts a new sub-path at its own first point instead
    /// of connecting to the current point.
    pub fn new_sub_path(&mut self) -> &mut Self {
        self.cursor = None;
        self.needs_move = false;
        self
    }

    /// Appends a complete shape, then restores the cursor so an open
    /// sub-path continues from where it was.
    fn append_shape(&mut self, build: impl FnOnce(&mut Self)) {
        let saved_cursor = self.cursor;
        let saved_start = self.start;
        let before = self.commands.len();
        build(self);
        if self.commands.len() == before {
            return;
        }
        if let Some(cursor) = saved_cursor {
            self.cursor = Some(cursor);
            self.start = saved_start;
        }
        self.needs_move = true;
    }

    /// Push cubic segments approximating an elliptical arc; the cursor must
    /// already be at the arc start
    fn push_arc_segments(&mut self, center: Point, rx: f32, ry: f32, start: f32, sweep: f32) {
        let count = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / count as f32;
        let k = 4.0 / 3.0 * (step / 4.0).tan();
        let at = |a: f32| Point::new(center.x + rx * a.cos(), center.y + ry * a.sin());
        let tangent = |a: f32| Point::new(-rx * a.sin(), ry * a.cos());

        let mut a0 = start;
        for i in 0..count {
            let a1 = if i + 1 == count { start + sweep } else { a0 + step };
            let p0 = at(a0);
            let p1 = at(a1);
            self.commands.push(PathCommand::CubicTo {
                control1: p0 + tangent(a0) * k,
                control2: p1 - tangent(a1) * k,
                end: p1,
            });
            a0 = a1;
        }
        self.cursor = Some(at(start + sweep));
    }

    /// Append a circular arc as its own sub-path
    ///
    /// With `clockwise` the angle increases from `start_angle` to
    /// `end_angle` (clockwise on screen). A non-positive radius adds nothing.
    pub fn add_arc(
        &mut self,
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        clockwise: bool,
    ) -> &mut Self {
        if !(radius > 0.0) || !radius.is_finite() {
            return self;
        }
        let sweep = arc_sweep(start_angle, end_angle, clockwise);
        self.append_shape(|path| {
            let first = Point::new(
                center.x + radius * start_angle.cos(),
                center.y + radius * start_angle.sin(),
            );
            path.move_to(first);
            path.push_arc_segments(center, radius, radius, start_angle, sweep);
        });
        self
    }

    /// Circular arc joined to the current sub-path by a straight line
    pub fn arc(
        &mut self,
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        clockwise: bool,
    ) -> &mut Self {
        if !(radius > 0.0) || !radius.is_finite() {
            return self;
        }
        let sweep = arc_sweep(start_angle, end_angle, clockwise);
        self.elliptic_arc(center, radius, radius, start_angle, sweep)
    }

    /// Elliptical arc inscribed in `rect`, joined to the current sub-path
    ///
    /// `sweep_angle` is signed; positive sweeps clockwise on screen.
    pub fn elliptic_arc_in(&mut self, rect: Rect, start_angle: f32, sweep_angle: f32) -> &mut Self {
        let rx = rect.width / 2.0;
        let ry = rect.height / 2.0;
        self.elliptic_arc(rect.center(), rx, ry, start_angle, sweep_angle.clamp(-TAU, TAU))
    }

    fn elliptic_arc(&mut self, center: Point, rx: f32, ry: f32, start: f32, sweep: f32) -> &mut Self {
        if !(center.is_finite() && rx.is_finite() && ry.is_finite() && sweep.is_finite()) {
            return self;
        }
        let first = Point::new(center.x + rx * start.cos(), center.y + ry * start.sin());
        if self.cursor.is_some() {
            self.line_to(first);
        } else {
            self.move_to(first);
        }
        if sweep != 0.0 {
            self.push_arc_segments(center, rx, ry, start, sweep);
        }
        self
    }

    /// Append a standalone line segment
    pub fn add_line(&mut self, p1: Point, p2: Point) -> &mut Self {
        self.append_shape(|path| {
            path.move_to(p1);
            path.commands.push(PathCommand::LineTo(p2));
            path.cursor = Some(p2);
        });
        self
    }

    /// Append a closed rectangle; empty rects add nothing
    pub fn add_rect(&mut self, rect: Rect) -> &mut Self {
        if rect.is_empty() {
            return self;
        }
        self.append_shape(|path| {
            let [a, b, c, d] = rect.corners();
            path.move_to(a);
            path.commands.extend([
                PathCommand::LineTo(b),
                PathCommand::LineTo(c),
                PathCommand::LineTo(d),
                PathCommand::Close,
            ]);
            path.cursor = Some(a);
        });
        self
    }

    /// Append a closed ellipse inscribed in `rect`
    pub fn add_ellipse(&mut self, rect: Rect) -> &mut Self {
        if rect.is_empty() {
            return self;
        }
        let center = rect.center();
        let rx = rect.width / 2.0;
        let ry = rect.height / 2.0;
        self.append_shape(|path| {
            path.move_to(Point::new(center.x + rx, center.y));
            path.push_arc_segments(center, rx, ry, 0.0, TAU);
            path.commands.push(PathCommand::Close);
        });
        self
    }

    /// Append a closed rounded rectangle
    ///
    /// Radii are scaled down uniformly when adjacent corners would overlap.
    pub fn add_rounded_rect(&mut self, rect: Rect, radii: impl Into<CornerRadii>) -> &mut Self {
        if rect.is_empty() {
            return self;
        }
        let r = radii.into().normalized(&rect);
        if r.is_zero() {
            return self.add_rect(rect);
        }

        let (x, y, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
        self.append_shape(|path| {
            path.move_to(Point::new(x + r.top_left_x, y));
            path.corner(
                Point::new(right - r.top_right_x, y),
                Point::new(right, y + r.top_right_y),
                Point::new(right, y),
            );
            path.corner(
                Point::new(right, bottom - r.bottom_right_y),
                Point::new(right - r.bottom_right_x, bottom),
                Point::new(right, bottom),
            );
            path.corner(
                Point::new(x + r.bottom_left_x, bottom),
                Point::new(x, bottom - r.bottom_left_y),
                Point::new(x, bottom),
            );
            path.corner(
                Point::new(x, y + r.top_left_y),
                Point::new(x + r.top_left_x, y),
                Point::new(x, y),
            );
            path.commands.push(PathCommand::Close);
        });
        self
    }

    /// Edge up to `from`, then a quarter ellipse around `apex` to `to`
    fn corner(&mut self, from: Point, to: Point, apex: Point) {
        if self.cursor != Some(from) {
            self.commands.push(PathCommand::LineTo(from));
        }
        if from != to {
            self.commands.push(PathCommand::CubicTo {
                control1: from.lerp(apex, KAPPA),
                control2: to.lerp(apex, KAPPA),
                end: to,
            });
        }
        self.cursor = Some(to);
    }

    /// Append every sub-path of `other`
    pub fn add_sub_path(&mut self, other: &Path) -> &mut Self {
        if other.is_empty() {
            return self;
        }
        self.append_shape(|path| {
            // `other` always starts with a MoveTo; detach it from our sub-path
            path.cursor = None;
            path.extend_commands(other.commands.iter().copied());
        });
        self
    }

    fn extend_commands(&mut self, commands: impl IntoIterator<Item = PathCommand>) {
        for cmd in commands {
            match cmd {
                PathCommand::MoveTo(p) => {
                    self.move_to(p);
                }
                PathCommand::LineTo(p) => {
                    self.line_to(p);
                }
                PathCommand::QuadTo { control, end } => {
                    self.quad_to(control, end);
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    self.bezier_to(control1, control2, end);
                }
                PathCommand::ArcTo {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => {
                    self.begin_segment(end);
                    self.commands.push(PathCommand::ArcTo {
                        radii: Point::new(radii.x.abs(), radii.y.abs()),
                        rotation,
                        large_arc,
                        sweep,
                        end,
                    });
                    self.cursor = Some(end);
                }
                PathCommand::Close => {
                    self.sub_close();
                }
            }
        }
    }

    // ---- queries ----

    /// Polyline approximation of every sub-path
    pub fn flatten(&self, tolerance: f32) -> Vec<Polyline> {
        flatten::flatten(&self.commands, tolerance)
    }

    /// Total length of all sub-paths, closing segments included
    pub fn length(&self) -> f32 {
        self.flatten(Self::FLATTEN_TOLERANCE)
            .iter()
            .map(Polyline::length)
            .sum()
    }

    /// Bounds of every vertex and control point; `None` for an empty path
    pub fn bounding_rect(&self) -> Option<Rect> {
        let mut points: Vec<Point> = Vec::with_capacity(self.vertex_count());
        let mut last = Point::ZERO;
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
                PathCommand::QuadTo { control, end } => points.extend([control, end]),
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => points.extend([control1, control2, end]),
                PathCommand::ArcTo {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => match flatten::arc_quads(last, radii, rotation, large_arc, sweep, end) {
                    Some(quads) => {
                        for q in quads {
                            points.push(Point::from_lyon(q.ctrl));
                            points.push(Point::from_lyon(q.to));
                        }
                    }
                    None => points.push(end),
                },
                PathCommand::Close => {}
            }
            if let Some(p) = cmd.end_point() {
                last = p;
            }
        }
        Rect::bounding(points)
    }

    /// Like [`Path::bounding_rect`], with a zero rect for an empty path
    pub fn bounds(&self) -> Rect {
        self.bounding_rect().unwrap_or(Rect::ZERO)
    }

    /// Point-in-path test; points on the outline are outside
    pub fn contains(&self, point: Point, rule: FillRule) -> bool {
        match self.bounding_rect() {
            Some(bounds) if bounds.contains(point) => {}
            _ => return false,
        }
        let polylines = self.flatten(Self::FLATTEN_TOLERANCE);
        let on_edge = polylines
            .iter()
            .flat_map(|pl| pl.closed_segments())
            .any(|(a, b)| flatten::distance_to_segment(point, a, b) < 1e-6);
        if on_edge {
            return false;
        }
        rule.is_inside(flatten::winding_number(&polylines, point))
    }

    /// Whether `point` lies within `width / 2` of the path outline
    pub fn stroke_contains(&self, point: Point, width: f32) -> bool {
        if !(width > 0.0) {
            return false;
        }
        let half = width / 2.0;
        self.flatten(Self::FLATTEN_TOLERANCE)
            .iter()
            .flat_map(Polyline::segments)
            .any(|(a, b)| flatten::distance_to_segment(point, a, b) <= half)
    }

    /// Boolean combination of two paths, both read with the nonzero rule
    pub fn clip(&self, op: ClipOp, other: &Path) -> Path {
        self.clip_with_rules(op, FillRule::NonZero, other, FillRule::NonZero)
    }

    /// Boolean combination where each operand has its own fill rule
    ///
    /// The result is made of non-overlapping closed polygons, so it fills
    /// the same under either rule.
    pub fn clip_with_rules(
        &self,
        op: ClipOp,
        rule: FillRule,
        other: &Path,
        other_rule: FillRule,
    ) -> Path {
        clip::combine(self, rule, op, other, other_rule)
    }

    /// Apply `matrix` to every point; arcs become quadratic curves
    pub fn transform(&mut self, matrix: &Matrix2D) {
        if matrix.is_identity() {
            return;
        }
        let mut out = Path::new();
        let mut last = Point::ZERO;
        let map = |p: Point| matrix.transform_point(p);
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    out.move_to(map(p));
                }
                PathCommand::LineTo(p) => {
                    out.line_to(map(p));
                }
                PathCommand::QuadTo { control, end } => {
                    out.quad_to(map(control), map(end));
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    out.bezier_to(map(control1), map(control2), map(end));
                }
                PathCommand::ArcTo {
                    radii,
                    rotation,
                    large_arc,
                    sweep,
                    end,
                } => match flatten::arc_quads(last, radii, rotation, large_arc, sweep, end) {
                    Some(quads) => {
                        for q in quads {
                            out.quad_to(
                                map(Point::from_lyon(q.ctrl)),
                                map(Point::from_lyon(q.to)),
                            );
                        }
                    }
                    None => {
                        out.line_to(map(end));
                    }
                },
                PathCommand::Close => {
                    out.sub_close();
                }
            }
            if let Some(p) = cmd.end_point() {
                last = p;
            }
        }
        *self = out;
    }

    /// Transformed copy
    pub fn transformed(&self, matrix: &Matrix2D) -> Path {
        let mut path = self.clone();
        path.transform(matrix);
        path
    }
}

impl Matrix2D {
    /// Apply this matrix to every point of `path`
    pub fn transform_path(&self, path: &Path) -> Path {
        path.transformed(self)
    }
}

/// Signed sweep from `start` to `end`, positive when `clockwise`
fn arc_sweep(start: f32, end: f32, clockwise: bool) -> f32 {
    let raw = end - start;
    if raw.abs() >= TAU {
        return if clockwise { TAU } else { -TAU };
    }
    match (clockwise, raw < 0.0) {
        (true, true) => raw + TAU,
        (false, false) if raw > 0.0 => raw - TAU,
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn test_empty_path() {
        let mut path = Path::new();
        assert!(path.is_empty());
        assert_eq!(path.bounding_rect(), None);
        assert_eq!(path.bounds(), Rect::ZERO);
        assert_eq!(path.length(), 0.0);
        path.clear();
        assert!(path.is_empty());
    }

    #[test]
    fn test_rect_path() {
        let path = Path::rect(Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(path.bounds(), Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(path.commands().len(), 5);
        assert!(approx(path.length(), 60.0, 1e-4));
        assert!(path.contains(Point::new(5.0, 5.0), FillRule::NonZero));
        assert!(!path.contains(Point::new(11.0, 5.0), FillRule::NonZero));
        // boundary points are outside
        assert!(!path.contains(Point::new(0.0, 5.0), FillRule::NonZero));
    }

    #[test]
    fn test_implicit_move() {
        let mut path = Path::new();
        path.line_to(Point::new(3.0, 4.0)).line_to(Point::new(6.0, 0.0));
        assert_eq!(path.commands()[0], PathCommand::MoveTo(Point::new(3.0, 4.0)));

        let rebuilt = Path::from_commands([PathCommand::LineTo(Point::new(1.0, 1.0))]);
        assert_eq!(rebuilt.commands()[0], PathCommand::MoveTo(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_consecutive_moves_collapse() {
        let mut path = Path::new();
        path.move_to(Point::new(1.0, 1.0)).move_to(Point::new(2.0, 2.0));
        assert_eq!(path.commands(), &[PathCommand::MoveTo(Point::new(2.0, 2.0))]);
    }

    #[test]
    fn test_sub_close() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(10.0, 0.0))
            .line_to(Point::new(10.0, 10.0))
            .sub_close();
        assert_eq!(path.commands().last(), Some(&PathCommand::Close));
        assert!(approx(path.length(), 20.0 + 200f32.sqrt(), 1e-4));
        // a second close is a no-op
        path.sub_close();
        assert_eq!(path.commands().len(), 4);
        // drawing after a close starts a new sub-path at the old start
        path.line_to(Point::new(0.0, 10.0));
        assert_eq!(
            &path.commands()[4..],
            &[
                PathCommand::MoveTo(Point::ZERO),
                PathCommand::LineTo(Point::new(0.0, 10.0))
            ]
        );
    }

    #[test]
    fn test_new_sub_path_detaches_next_segment() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0)).line_to(Point::new(5.0, 0.0));
        path.new_sub_path();
        assert_eq!(path.current_point(), None);
        path.arc(Point::new(20.0, 0.0), 2.0, 0.0, PI, true);
        // the arc starts its own sub-path instead of a joining line
        assert_eq!(path.commands()[2], PathCommand::MoveTo(Point::new(22.0, 0.0)));
        assert_eq!(path.flatten(0.1).len(), 2);
    }

    #[test]
    fn test_shapes_keep_open_sub_path() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0)).line_to(Point::new(5.0, 0.0));
        path.add_rect(Rect::new(20.0, 20.0, 5.0, 5.0));
        assert_eq!(path.current_point(), Some(Point::new(5.0, 0.0)));
        path.line_to(Point::new(5.0, 5.0));
        let tail = &path.commands()[path.commands().len() - 2..];
        assert_eq!(
            tail,
            &[
                PathCommand::MoveTo(Point::new(5.0, 0.0)),
                PathCommand::LineTo(Point::new(5.0, 5.0))
            ]
        );
    }

    #[test]
    fn test_ellipse_bounds_and_length() {
        let path = Path::circle(Point::new(50.0, 50.0), 10.0);
        let b = path.bounds();
        assert!(approx(b.x, 40.0, 1e-4) && approx(b.width, 20.0, 1e-4));
        assert!(approx(path.length(), 2.0 * PI * 10.0, 0.5));
        assert!(path.contains(Point::new(50.0, 50.0), FillRule::EvenOdd));
        assert!(!path.contains(Point::new(41.0, 41.0), FillRule::NonZero));
    }

    #[test]
    fn test_rounded_rect() {
        let mut path = Path::new();
        path.add_rounded_rect(Rect::new(0.0, 0.0, 40.0, 20.0), 5.0);
        assert_eq!(path.bounds(), Rect::new(0.0, 0.0, 40.0, 20.0));
        assert!(path.contains(Point::new(20.0, 10.0), FillRule::NonZero));
        // the corner itself is cut away
        assert!(!path.contains(Point::new(0.5, 0.5), FillRule::NonZero));

        let square = Path::rounded_rect(RoundedRect::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0));
        assert_eq!(square, Path::rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_add_arc_direction() {
        let mut cw = Path::new();
        cw.add_arc(Point::ZERO, 10.0, 0.0, FRAC_PI_2, true);
        // clockwise from 0 to 90 degrees passes through +x,+y
        let b = cw.bounds();
        assert!(b.x >= -1e-4 && b.y >= -1e-4);
        assert!(approx(cw.length(), PI * 5.0, 0.2));

        let mut ccw = Path::new();
        ccw.add_arc(Point::ZERO, 10.0, 0.0, FRAC_PI_2, false);
        assert!(approx(ccw.length(), PI * 15.0, 0.4));

        let mut none = Path::new();
        none.add_arc(Point::ZERO, 0.0, 0.0, PI, true);
        assert!(none.is_empty());
    }

    #[test]
    fn test_arc_to() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.arc_to(10.0, 10.0, 0.0, false, true, Point::new(20.0, 0.0))
            .unwrap();
        assert!(approx(path.length(), PI * 10.0, 0.3));
        // positive sweep on screen bulges upwards (negative y) for left to right
        assert!(path.bounds().y < -9.0);

        assert!(path
            .arc_to(-1.0, 5.0, 0.0, false, true, Point::new(0.0, 0.0))
            .is_err());

        let mut flat = Path::new();
        flat.move_to(Point::ZERO);
        flat.arc_to(0.0, 0.0, 0.0, false, false, Point::new(10.0, 0.0))
            .unwrap();
        assert!(approx(flat.length(), 10.0, 1e-4));
    }

    #[test]
    fn test_tangent_arc_to() {
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.tangent_arc_to(5.0, Point::new(10.0, 0.0), Point::new(10.0, 10.0))
            .unwrap();
        match path.commands()[1] {
            PathCommand::LineTo(p) => assert!(approx(p.x, 5.0, 1e-4) && approx(p.y, 0.0, 1e-4)),
            other => panic!("expected line, got {other:?}"),
        }
        match path.commands()[2] {
            PathCommand::ArcTo { end, sweep, .. } => {
                assert!(approx(end.x, 10.0, 1e-4) && approx(end.y, 5.0, 1e-4));
                assert!(sweep);
            }
            other => panic!("expected arc, got {other:?}"),
        }

        let mut collinear = Path::new();
        collinear.move_to(Point::ZERO);
        collinear
            .tangent_arc_to(5.0, Point::new(10.0, 0.0), Point::new(20.0, 0.0))
            .unwrap();
        assert_eq!(collinear.commands().len(), 2);
        assert!(collinear
            .tangent_arc_to(-1.0, Point::ZERO, Point::ZERO)
            .is_err());
    }

    #[test]
    fn test_stroke_contains() {
        let mut path = Path::new();
        path.add_line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(path.stroke_contains(Point::new(50.0, 2.0), 4.0));
        assert!(!path.stroke_contains(Point::new(50.0, 3.0), 4.0));
        assert!(!path.stroke_contains(Point::new(50.0, 0.0), 0.0));
    }

    #[test]
    fn test_figure_eight_fill_rules() {
        // Two squares sharing the middle, the second traced in the same
        // direction: overlap has winding 2
        let mut path = Path::new();
        path.add_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        path.add_rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        let overlap = Point::new(15.0, 15.0);
        assert!(path.contains(overlap, FillRule::NonZero));
        assert!(!path.contains(overlap, FillRule::EvenOdd));
    }

    #[test]
    fn test_transform() {
        let mut path = Path::rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut m = Matrix2D::identity();
        m.translate(5.0, 5.0).scale(2.0, 2.0);
        path.transform(&m);
        assert_eq!(path.bounds(), Rect::new(5.0, 5.0, 20.0, 20.0));

        let mut arc = Path::new();
        arc.move_to(Point::ZERO);
        arc.arc_to(5.0, 5.0, 0.0, false, true, Point::new(10.0, 0.0))
            .unwrap();
        let moved = Matrix2D::translation(0.0, 100.0).transform_path(&arc);
        assert!(moved
            .commands()
            .iter()
            .all(|c| !matches!(c, PathCommand::ArcTo { .. })));
        assert!(approx(moved.length(), arc.length(), 0.05));
    }

    #[test]
    fn test_vertex_count() {
        let mut path = Path::new();
        path.move_to(Point::ZERO)
            .quad_to(Point::new(1.0, 1.0), Point::new(2.0, 0.0))
            .bezier_to(Point::new(3.0, 1.0), Point::new(4.0, 1.0), Point::new(5.0, 0.0))
            .sub_close();
        assert_eq!(path.vertex_count(), 1 + 2 + 3 + 1);
    }

    #[test]
    fn test_fill_rule_names() {
        assert_eq!("evenodd".parse::<FillRule>().unwrap(), FillRule::EvenOdd);
        assert_eq!(FillRule::NonZero.to_string(), "nonzero");
        assert!("winding".parse::<FillRule>().is_err());
    }
}
