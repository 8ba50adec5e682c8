//! Gradient fills

use std::f32::consts::TAU;

use smallvec::SmallVec;

use crate::color::Color;
use crate::error::{ensure_finite, Result};
use crate::geometry::Point;
use crate::matrix::Matrix2D;

crate::named_enum! {
    /// How a gradient extends outside its `[0, 1]` range
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum SpreadMode {
        #[default]
        Pad => "pad",
        Repeat => "repeat",
        Reflect => "reflect",
    }
}

impl SpreadMode {
    /// Map any parameter into `[0, 1]`
    pub fn apply(self, t: f32) -> f32 {
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t - t.floor(),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 {
                    2.0 - m
                } else {
                    m
                }
            }
        }
    }
}

/// A gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32, // 0.0 to 1.0
    pub color: Color,
}

/// Gradient geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientKind {
    Linear {
        start: Point,
        end: Point,
    },
    /// Two-circle (conical) gradient from the start circle to the end circle
    Radial {
        start_center: Point,
        start_radius: f32,
        end_center: Point,
        end_radius: f32,
    },
    /// Sweep around `center` starting at `angle` radians
    Conic {
        center: Point,
        angle: f32,
    },
}

/// A gradient paint source
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    kind: GradientKind,
    spread: SpreadMode,
    stops: SmallVec<[GradientStop; 4]>,
    matrix: Matrix2D,
}

impl Gradient {
    pub fn new(kind: GradientKind, spread: SpreadMode) -> Self {
        Self {
            kind,
            spread,
            stops: SmallVec::new(),
            matrix: Matrix2D::IDENTITY,
        }
    }

    pub fn linear(spread: SpreadMode, start: Point, end: Point) -> Self {
        Self::new(GradientKind::Linear { start, end }, spread)
    }

    pub fn radial(
        spread: SpreadMode,
        start_center: Point,
        start_radius: f32,
        end_center: Point,
        end_radius: f32,
    ) -> Self {
        Self::new(
            GradientKind::Radial {
                start_center,
                start_radius,
                end_center,
                end_radius,
            },
            spread,
        )
    }

    pub fn conic(spread: SpreadMode, center: Point, angle: f32) -> Self {
        Self::new(GradientKind::Conic { center, angle }, spread)
    }

    /// Create a simple linear gradient between two colors
    pub fn linear_simple(start: Point, end: Point, from: Color, to: Color) -> Self {
        let mut g = Self::linear(SpreadMode::Pad, start, end);
        g.stops.push(GradientStop {
            offset: 0.0,
            color: from,
        });
        g.stops.push(GradientStop {
            offset: 1.0,
            color: to,
        });
        g
    }

    pub fn kind(&self) -> &GradientKind {
        &self.kind
    }

    pub fn spread(&self) -> SpreadMode {
        self.spread
    }

    pub fn matrix(&self) -> &Matrix2D {
        &self.matrix
    }

    /// Stops in insertion order
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Append a stop; the offset is clamped into `[0, 1]` when evaluated
    pub fn add_color_stop(&mut self, offset: f32, color: Color) -> Result<()> {
        ensure_finite("gradient stop offset", offset)?;
        self.stops.push(GradientStop { offset, color });
        Ok(())
    }

    pub fn clear_color_stops(&mut self) {
        self.stops.clear();
    }

    /// Transform the gradient geometry by `matrix`, after any earlier transform
    pub fn transform(&mut self, matrix: &Matrix2D) {
        self.matrix = self.matrix.multiply(matrix);
    }

    /// Stops sorted by offset (stable), offsets clamped into `[0, 1]`
    pub fn sorted_stops(&self) -> SmallVec<[GradientStop; 4]> {
        let mut stops: SmallVec<[GradientStop; 4]> = self
            .stops
            .iter()
            .map(|s| GradientStop {
                offset: s.offset.clamp(0.0, 1.0),
                color: s.color,
            })
            .collect();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        stops
    }

    /// Color at parameter `t`, with the spread mode applied
    pub fn color_at_offset(&self, t: f32) -> Color {
        color_in_stops(&self.sorted_stops(), self.spread.apply(t))
    }

    /// Gradient parameter of a point in gradient geometry space
    ///
    /// `None` where a radial gradient is undefined.
    pub fn parameter_at(&self, p: Point) -> Option<f32> {
        match self.kind {
            GradientKind::Linear { start, end } => {
                let d = end - start;
                let len2 = d.dot(d);
                if len2 <= f32::EPSILON {
                    return None;
                }
                Some((p - start).dot(d) / len2)
            }
            GradientKind::Radial {
                start_center,
                start_radius,
                end_center,
                end_radius,
            } => radial_parameter(p, start_center, start_radius, end_center, end_radius),
            GradientKind::Conic { center, angle } => {
                let v = p - center;
                let a = v.y.atan2(v.x) - angle;
                Some((a / TAU).rem_euclid(1.0))
            }
        }
    }

    /// Color of a point in gradient geometry space (the matrix is not applied)
    pub fn color_at_local(&self, p: Point) -> Color {
        match self.parameter_at(p) {
            Some(t) => self.color_at_offset(t),
            None => Color::TRANSPARENT,
        }
    }

    /// Color of a point in user space, through the gradient matrix
    pub fn color_at(&self, p: Point) -> Color {
        match self.matrix.inverted() {
            Ok(inv) => self.color_at_local(inv.transform_point(p)),
            Err(_) => Color::TRANSPARENT,
        }
    }
}

/// Interpolate sorted stops at `t` in `[0, 1]`
pub fn color_in_stops(stops: &[GradientStop], t: f32) -> Color {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Color::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.color;
            }
            return a.color.lerp(b.color, (t - a.offset) / span);
        }
    }
    last.color
}

/// Largest `t` with `r(t) >= 0` such that `p` is on the circle at `t`
fn radial_parameter(p: Point, c0: Point, r0: f32, c1: Point, r1: f32) -> Option<f32> {
    let cd = c1 - c0;
    let pd = p - c0;
    let dr = r1 - r0;
    let a = cd.dot(cd) - dr * dr;
    let b = pd.dot(cd) + r0 * dr;
    let c = pd.dot(pd) - r0 * r0;
    let radius_ok = |t: f32| r0 + t * dr >= 0.0;

    if a.abs() <= 1e-6 {
        if b.abs() <= 1e-6 {
            return None;
        }
        let t = c / (2.0 * b);
        return radius_ok(t).then_some(t);
    }
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t1 = (b + root) / a;
    let t2 = (b - root) / a;
    let (hi, lo) = if t1 > t2 { (t1, t2) } else { (t2, t1) };
    if radius_ok(hi) {
        Some(hi)
    } else if radius_ok(lo) {
        Some(lo)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stop(spread: SpreadMode) -> Gradient {
        let mut g = Gradient::linear(spread, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        g.add_color_stop(0.0, Color::BLACK).unwrap();
        g.add_color_stop(1.0, Color::WHITE).unwrap();
        g
    }

    #[test]
    fn test_spread_modes() {
        assert_eq!(SpreadMode::Pad.apply(1.5), 1.0);
        assert_eq!(SpreadMode::Pad.apply(-0.5), 0.0);
        assert_eq!(SpreadMode::Repeat.apply(1.25), 0.25);
        assert_eq!(SpreadMode::Repeat.apply(-0.25), 0.75);
        assert_eq!(SpreadMode::Reflect.apply(1.25), 0.75);
        assert_eq!(SpreadMode::Reflect.apply(-0.25), 0.25);
    }

    #[test]
    fn test_repeat_matches_period() {
        let g = two_stop(SpreadMode::Repeat);
        assert_eq!(
            g.color_at(Point::new(15.0, 0.0)),
            g.color_at(Point::new(5.0, 0.0))
        );
        let pad = two_stop(SpreadMode::Pad);
        assert_eq!(pad.color_at(Point::new(15.0, 0.0)), Color::WHITE);
    }

    #[test]
    fn test_unsorted_stops() {
        let mut g = Gradient::linear(SpreadMode::Pad, Point::ZERO, Point::new(1.0, 0.0));
        g.add_color_stop(1.0, Color::BLUE).unwrap();
        g.add_color_stop(0.0, Color::RED).unwrap();
        g.add_color_stop(2.0, Color::GREEN).unwrap();
        // 2.0 clamps to 1.0 and sorts after the blue stop
        assert_eq!(g.color_at_offset(0.0), Color::RED);
        assert_eq!(g.color_at_offset(1.0), Color::GREEN);
        let mid = g.color_at_offset(0.5);
        assert!(mid.approx_eq(&Color::new(0.5, 0.0, 0.5, 1.0), 1e-6));
        assert!(g.add_color_stop(f32::NAN, Color::RED).is_err());
        g.clear_color_stops();
        assert_eq!(g.color_at_offset(0.5), Color::TRANSPARENT);
    }

    #[test]
    fn test_radial_concentric() {
        let g = Gradient::radial(SpreadMode::Pad, Point::ZERO, 0.0, Point::ZERO, 10.0);
        assert!((g.parameter_at(Point::new(5.0, 0.0)).unwrap() - 0.5).abs() < 1e-6);
        assert!((g.parameter_at(Point::new(0.0, -10.0)).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_radial_undefined_region() {
        // Cone of two disjoint circles leaves points with no solution
        let g = Gradient::radial(
            SpreadMode::Pad,
            Point::new(0.0, 0.0),
            1.0,
            Point::new(10.0, 0.0),
            1.0,
        );
        assert!(g.parameter_at(Point::new(5.0, 0.0)).is_some());
        assert!(g.parameter_at(Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_conic() {
        let g = Gradient::conic(SpreadMode::Pad, Point::ZERO, 0.0);
        assert!((g.parameter_at(Point::new(0.0, 1.0)).unwrap() - 0.25).abs() < 1e-6);
        assert!((g.parameter_at(Point::new(-1.0, -1e-6)).unwrap() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_transform() {
        let mut g = two_stop(SpreadMode::Pad);
        g.transform(&Matrix2D::scaling(2.0, 1.0));
        // geometry now spans 0..20
        let c = g.color_at(Point::new(10.0, 0.0));
        assert!(c.approx_eq(&Color::new(0.5, 0.5, 0.5, 1.0), 1e-6));
    }
}
