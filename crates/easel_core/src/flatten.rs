//! Curve flattening through lyon
//!
//! Converts path commands into lyon path events and flattens them into
//! polylines, which every geometric query and the rasterizer work on.

use lyon::geom::{ArcFlags, QuadraticBezierSegment, SvgArc};
use lyon::math::{vector, Angle};
use lyon::path::iterator::PathIterator;
use lyon::path::PathEvent;
use smallvec::SmallVec;

use crate::geometry::Point;
use crate::path::{Path, PathCommand};

/// Flattened sub-path
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polyline {
    /// Segments as drawn: the closing segment only for closed polylines
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let closing = if self.closed {
            self.closing_segment()
        } else {
            None
        };
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing)
    }

    /// Segments of the implicitly closed polygon, as used for filling
    pub fn closed_segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(self.closing_segment())
    }

    fn closing_segment(&self) -> Option<(Point, Point)> {
        match (self.points.first(), self.points.last()) {
            (Some(&first), Some(&last)) if first != last => Some((last, first)),
            _ => None,
        }
    }

    pub fn length(&self) -> f32 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }
}

/// Expand an SVG arc into quadratic curves, `None` when it is a straight line
pub(crate) fn arc_quads(
    from: Point,
    radii: Point,
    rotation: f32,
    large_arc: bool,
    sweep: bool,
    to: Point,
) -> Option<SmallVec<[QuadraticBezierSegment<f32>; 8]>> {
    let arc = SvgArc {
        from: from.to_lyon(),
        to: to.to_lyon(),
        radii: vector(radii.x.abs(), radii.y.abs()),
        x_rotation: Angle::radians(rotation),
        flags: ArcFlags { large_arc, sweep },
    };
    if arc.is_straight_line() {
        return None;
    }
    let mut quads = SmallVec::new();
    arc.for_each_quadratic_bezier(&mut |q: &QuadraticBezierSegment<f32>| quads.push(*q));
    Some(quads)
}

/// Convert path commands to lyon path events
pub(crate) fn lyon_events(commands: &[PathCommand]) -> Vec<PathEvent> {
    let mut events = Vec::with_capacity(commands.len() + 2);
    let mut first: Option<Point> = None;
    let mut current = Point::ZERO;

    // Segments outside a sub-path start one at the current point
    let open = |events: &mut Vec<PathEvent>, first: &mut Option<Point>, at: Point| {
        if first.is_none() {
            events.push(PathEvent::Begin { at: at.to_lyon() });
            *first = Some(at);
        }
    };

    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(p) => {
                if let Some(f) = first {
                    events.push(PathEvent::End {
                        last: current.to_lyon(),
                        first: f.to_lyon(),
                        close: false,
                    });
                }
                events.push(PathEvent::Begin { at: p.to_lyon() });
                first = Some(p);
                current = p;
            }
            PathCommand::LineTo(p) => {
                open(&mut events, &mut first, current);
                events.push(PathEvent::Line {
                    from: current.to_lyon(),
                    to: p.to_lyon(),
                });
                current = p;
            }
            PathCommand::QuadTo { control, end } => {
                open(&mut events, &mut first, current);
                events.push(PathEvent::Quadratic {
                    from: current.to_lyon(),
                    ctrl: control.to_lyon(),
                    to: end.to_lyon(),
                });
                current = end;
            }
            PathCommand::CubicTo {
                control1,
                control2,
                end,
            } => {
                open(&mut events, &mut first, current);
                events.push(PathEvent::Cubic {
                    from: current.to_lyon(),
                    ctrl1: control1.to_lyon(),
                    ctrl2: control2.to_lyon(),
                    to: end.to_lyon(),
                });
                current = end;
            }
            PathCommand::ArcTo {
                radii,
                rotation,
                large_arc,
                sweep,
                end,
            } => {
                open(&mut events, &mut first, current);
                match arc_quads(current, radii, rotation, large_arc, sweep, end) {
                    Some(quads) => events.extend(quads.iter().map(|q| PathEvent::Quadratic {
                        from: q.from,
                        ctrl: q.ctrl,
                        to: q.to,
                    })),
                    None => events.push(PathEvent::Line {
                        from: current.to_lyon(),
                        to: end.to_lyon(),
                    }),
                }
                // Keep the exact end point; quad expansion may drift slightly
                if let Some(PathEvent::Quadratic { to, .. }) = events.last_mut() {
                    *to = end.to_lyon();
                }
                current = end;
            }
            PathCommand::Close => {
                if let Some(f) = first.take() {
                    events.push(PathEvent::End {
                        last: current.to_lyon(),
                        first: f.to_lyon(),
                        close: true,
                    });
                    current = f;
                }
            }
        }
    }

    if let Some(f) = first {
        events.push(PathEvent::End {
            last: current.to_lyon(),
            first: f.to_lyon(),
            close: false,
        });
    }

    events
}

/// Flatten commands into polylines within `tolerance`
///
/// Non-positive or non-finite tolerances fall back to
/// [`Path::FLATTEN_TOLERANCE`]. Sub-paths that collapse to a single point
/// are dropped.
pub fn flatten(commands: &[PathCommand], tolerance: f32) -> Vec<Polyline> {
    let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
        tolerance.max(1e-3)
    } else {
        Path::FLATTEN_TOLERANCE
    };

    let mut out = Vec::new();
    let mut current: Option<Polyline> = None;
    let finish = |out: &mut Vec<Polyline>, pl: Polyline| {
        if pl.points.len() >= 2 {
            out.push(pl);
        }
    };

    for event in lyon_events(commands).into_iter().flattened(tolerance) {
        match event {
            PathEvent::Begin { at } => {
                if let Some(pl) = current.take() {
                    finish(&mut out, pl);
                }
                current = Some(Polyline {
                    points: vec![Point::from_lyon(at)],
                    closed: false,
                });
            }
            PathEvent::Line { to, .. } => {
                if let Some(pl) = current.as_mut() {
                    let to = Point::from_lyon(to);
                    if pl.points.last() != Some(&to) {
                        pl.points.push(to);
                    }
                }
            }
            PathEvent::End { close, .. } => {
                if let Some(mut pl) = current.take() {
                    pl.closed = close;
                    finish(&mut out, pl);
                }
            }
            // flattened() only emits lines
            PathEvent::Quadratic { to, .. } | PathEvent::Cubic { to, .. } => {
                if let Some(pl) = current.as_mut() {
                    pl.points.push(Point::from_lyon(to));
                }
            }
        }
    }
    if let Some(pl) = current {
        finish(&mut out, pl);
    }
    out
}

/// Winding number of `p` with every polyline treated as closed
pub fn winding_number(polylines: &[Polyline], p: Point) -> i32 {
    let mut winding = 0;
    for (a, b) in polylines.iter().flat_map(Polyline::closed_segments) {
        let side = (b - a).cross(p - a);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Distance from `p` to the segment `a..b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn test_events_balance() {
        let mut path = Path::new();
        path.move_to(Point::ZERO)
            .line_to(Point::new(10.0, 0.0))
            .quad_to(Point::new(15.0, 5.0), Point::new(10.0, 10.0))
            .sub_close();
        path.line_to(Point::new(0.0, 20.0));
        let events = lyon_events(path.commands());
        let begins = events
            .iter()
            .filter(|e| matches!(e, PathEvent::Begin { .. }))
            .count();
        let ends = events
            .iter()
            .filter(|e| matches!(e, PathEvent::End { .. }))
            .count();
        assert_eq!(begins, 2);
        assert_eq!(ends, 2);
        assert!(matches!(
            events[3],
            PathEvent::End { close: true, .. }
        ));
    }

    #[test]
    fn test_flatten_rect() {
        let lines = Path::rect(Rect::new(0.0, 0.0, 4.0, 3.0)).flatten(0.1);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].closed);
        assert_eq!(lines[0].points.len(), 4);
        assert_eq!(lines[0].length(), 14.0);
    }

    #[test]
    fn test_flatten_curve_within_tolerance() {
        let circle = Path::circle(Point::new(0.0, 0.0), 50.0);
        let lines = circle.flatten(0.05);
        assert!(lines[0].points.len() > 16);
        for p in &lines[0].points {
            assert!((p.length() - 50.0).abs() < 0.2);
        }
    }

    #[test]
    fn test_bad_tolerance_falls_back() {
        let circle = Path::circle(Point::new(0.0, 0.0), 10.0);
        assert_eq!(circle.flatten(0.0), circle.flatten(Path::FLATTEN_TOLERANCE));
        assert_eq!(
            circle.flatten(f32::NAN),
            circle.flatten(Path::FLATTEN_TOLERANCE)
        );
    }

    #[test]
    fn test_winding_and_distance() {
        let square = Path::rect(Rect::new(0.0, 0.0, 10.0, 10.0)).flatten(0.1);
        assert_eq!(winding_number(&square, Point::new(5.0, 5.0)).abs(), 1);
        assert_eq!(winding_number(&square, Point::new(15.0, 5.0)), 0);
        let d = distance_to_segment(Point::new(5.0, 3.0), Point::ZERO, Point::new(10.0, 0.0));
        assert_eq!(d, 3.0);
        assert_eq!(
            distance_to_segment(Point::new(-3.0, 4.0), Point::ZERO, Point::new(10.0, 0.0)),
            5.0
        );
    }

    #[test]
    fn test_lone_point_dropped() {
        let mut path = Path::new();
        path.move_to(Point::new(1.0, 1.0));
        assert!(path.flatten(0.1).is_empty());
    }
}
