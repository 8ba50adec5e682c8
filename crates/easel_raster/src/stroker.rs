//! Stroke tessellation
//!
//! Paths are flattened in user space, cut by the dash pattern, and handed
//! to lyon's stroke tessellator as polylines. The resulting triangles are
//! mapped to device space and normalized to one orientation so that the
//! nonzero rasterization of their union is the stroke outline.

use easel_core::{Dash, LineCap, LineJoin, Matrix2D, Path, Point, Polyline, StrokeStyle};
use lyon::lyon_tessellation::{
    BuffersBuilder, StrokeOptions, StrokeTessellator, StrokeVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::PathEvent;

/// Cut polylines into dashes
///
/// The pattern restarts at the beginning of every polyline, shifted by the
/// dash offset. Closed polylines are dashed along their closing segment too.
/// A zero-length "on" entry yields a two-point polyline at a single spot.
pub fn dash_polylines(polylines: &[Polyline], dash: &Dash) -> Vec<Polyline> {
    let pattern = dash.pattern();
    let cycle = dash.cycle_length();
    let mut out = Vec::new();
    if pattern.is_empty() || !(cycle > 0.0) {
        return out;
    }

    for line in polylines {
        let mut index = 0;
        let mut remaining = pattern[0];
        let mut skip = dash.offset() % cycle;
        for _ in 0..pattern.len() * 2 {
            if skip <= 0.0 {
                break;
            }
            if skip >= remaining {
                skip -= remaining;
                index = (index + 1) % pattern.len();
                remaining = pattern[index];
            } else {
                remaining -= skip;
                skip = 0.0;
            }
        }

        let mut current: Vec<Point> = Vec::new();
        if let Some(&first) = line.points.first() {
            if index % 2 == 0 {
                current.push(first);
            }
        }

        for (a, b) in line.segments() {
            let length = a.distance(b);
            let mut t = 0.0;
            while length - t > remaining {
                t += remaining;
                let p = a.lerp(b, t / length);
                if index % 2 == 0 {
                    push_point(&mut current, p);
                    flush_dash(&mut out, &mut current, true);
                } else {
                    current.push(p);
                }
                index = (index + 1) % pattern.len();
                remaining = pattern[index];
            }
            remaining -= length - t;
            if index % 2 == 0 {
                push_point(&mut current, b);
            }
        }
        if index % 2 == 0 {
            flush_dash(&mut out, &mut current, false);
        }
    }
    out
}

fn push_point(points: &mut Vec<Point>, p: Point) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

/// Emit the pending dash; with `keep_dot` a zero-length dash becomes a
/// degenerate segment so that round and square caps still draw a dot
fn flush_dash(out: &mut Vec<Polyline>, points: &mut Vec<Point>, keep_dot: bool) {
    let mut points = std::mem::take(points);
    if keep_dot && points.len() == 1 {
        points.push(points[0]);
    }
    if points.len() >= 2 {
        out.push(Polyline {
            points,
            closed: false,
        });
    }
}

fn polyline_events(polylines: &[Polyline]) -> Vec<PathEvent> {
    let mut events = Vec::new();
    for line in polylines {
        let mut points = line.points.as_slice();
        if line.closed && points.len() > 2 && points.first() == points.last() {
            points = &points[..points.len() - 1];
        }
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            continue;
        };
        let first = point(first.x, first.y);
        events.push(PathEvent::Begin { at: first });
        for pair in points.windows(2) {
            events.push(PathEvent::Line {
                from: point(pair[0].x, pair[0].y),
                to: point(pair[1].x, pair[1].y),
            });
        }
        events.push(PathEvent::End {
            last: point(last.x, last.y),
            first,
            close: line.closed,
        });
    }
    events
}

fn stroke_options(style: &StrokeStyle, tolerance: f32) -> StrokeOptions {
    let mut options = StrokeOptions::default()
        .with_line_width(style.width)
        .with_tolerance(tolerance);

    // Convert line cap
    options = options.with_line_cap(match style.cap {
        LineCap::Butt => lyon::lyon_tessellation::LineCap::Butt,
        LineCap::Round => lyon::lyon_tessellation::LineCap::Round,
        LineCap::Square => lyon::lyon_tessellation::LineCap::Square,
    });

    // Convert line join; lyon's miter already reverts to bevel past the limit
    options = options.with_line_join(match style.join {
        LineJoin::Miter => lyon::lyon_tessellation::LineJoin::MiterClip,
        LineJoin::MiterRevert => lyon::lyon_tessellation::LineJoin::Miter,
        LineJoin::MiterRound | LineJoin::Round => lyon::lyon_tessellation::LineJoin::Round,
        LineJoin::Bevel => lyon::lyon_tessellation::LineJoin::Bevel,
    });

    options.with_miter_limit(style.miter_limit.max(1.0))
}

/// Tessellate the stroke of `path` into device-space triangles
///
/// `tolerance` is in device pixels. Returns no triangles for an empty
/// path, a non-positive width, a degenerate `matrix`, or when lyon
/// rejects the input.
pub fn stroke_triangles(
    path: &Path,
    style: &StrokeStyle,
    matrix: &Matrix2D,
    tolerance: f32,
) -> Vec<[Point; 3]> {
    let scale = matrix.max_scale();
    if path.is_empty() || !(style.width > 0.0) || !(scale > 0.0) || !scale.is_finite() {
        return Vec::new();
    }
    let tolerance = (tolerance / scale).max(1e-4);

    let mut polylines = path.flatten(tolerance);
    if let Some(dash) = &style.dash {
        polylines = dash_polylines(&polylines, dash);
    }
    let events = polyline_events(&polylines);
    if events.is_empty() {
        return Vec::new();
    }

    let mut geometry: VertexBuffers<Point, u32> = VertexBuffers::new();
    let mut tessellator = StrokeTessellator::new();
    let result = tessellator.tessellate(
        events.iter().cloned(),
        &stroke_options(style, tolerance),
        &mut BuffersBuilder::new(&mut geometry, |vertex: StrokeVertex| {
            let p = vertex.position();
            matrix.transform_point(Point::new(p.x, p.y))
        }),
    );

    if result.is_err() {
        tracing::warn!("Path stroke tessellation failed: {:?}", result.err());
        return Vec::new();
    }

    geometry
        .indices
        .chunks_exact(3)
        .filter_map(|tri| {
            let a = *geometry.vertices.get(tri[0] as usize)?;
            let b = *geometry.vertices.get(tri[1] as usize)?;
            let c = *geometry.vertices.get(tri[2] as usize)?;
            let area = (b - a).cross(c - a);
            if area > 0.0 {
                Some([a, b, c])
            } else if area < 0.0 {
                Some([a, c, b])
            } else {
                None
            }
        })
        .collect()
}
