//! Scanline polygon rasterization
//!
//! Edges are sampled on `subsamples` sub-scanlines per pixel row. On each
//! sub-scanline the crossings are sorted and walked with the fill rule,
//! and every inside span adds its exact horizontal overlap with each pixel
//! to the coverage mask. Without antialiasing a single sample through the
//! pixel centers decides coverage.

use easel_core::{FillRule, Point, Polyline};

use crate::mask::CoverageMask;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Edge {
    x0: f32,
    y0: f32,
    y1: f32,
    dxdy: f32,
    winding: i32,
}

impl Edge {
    fn new(a: Point, b: Point) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() || a.y == b.y {
            return None;
        }
        let (top, bottom, winding) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
        Some(Self {
            x0: top.x,
            y0: top.y,
            y1: bottom.y,
            dxdy: (bottom.x - top.x) / (bottom.y - top.y),
            winding,
        })
    }

    fn x_at(&self, y: f32) -> f32 {
        self.x0 + (y - self.y0) * self.dxdy
    }
}

/// Device-space polygon outlines waiting to be scan-converted
#[derive(Clone, Debug, Default)]
pub struct EdgeList {
    edges: Vec<Edge>,
}

impl EdgeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn add_edge(&mut self, a: Point, b: Point) {
        if let Some(edge) = Edge::new(a, b) {
            self.edges.push(edge);
        }
    }

    /// Add a polygon, implicitly closed
    pub fn add_polygon(&mut self, points: &[Point]) {
        for pair in points.windows(2) {
            self.add_edge(pair[0], pair[1]);
        }
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            self.add_edge(last, first);
        }
    }

    /// Add every polyline as a closed polygon
    pub fn add_polylines(&mut self, polylines: &[Polyline]) {
        for line in polylines {
            self.add_polygon(&line.points);
        }
    }

    /// Scan-convert into `mask` under `rule`
    pub fn rasterize(
        &mut self,
        mask: &mut CoverageMask,
        rule: FillRule,
        antialias: bool,
        subsamples: u32,
    ) {
        if self.edges.is_empty() || mask.width() == 0 || mask.height() == 0 {
            return;
        }
        self.edges.sort_by(|a, b| a.y0.total_cmp(&b.y0));

        let top = self.edges[0].y0;
        let bottom = self.edges.iter().map(|e| e.y1).fold(f32::MIN, f32::max);
        let first_row = top.floor().max(0.0) as u32;
        let last_row = (bottom.ceil().max(0.0) as u32).min(mask.height());

        let samples = if antialias { subsamples.max(1) } else { 1 };
        let weight = 1.0 / samples as f32;

        let mut next = 0;
        let mut active: Vec<usize> = Vec::new();
        let mut crossings: Vec<(f32, i32)> = Vec::new();

        for row in first_row..last_row {
            for k in 0..samples {
                let y = row as f32 + (k as f32 + 0.5) * weight;
                while next < self.edges.len() && self.edges[next].y0 <= y {
                    active.push(next);
                    next += 1;
                }
                active.retain(|&i| self.edges[i].y1 > y);
                if active.is_empty() {
                    continue;
                }

                crossings.clear();
                crossings.extend(active.iter().map(|&i| {
                    let edge = &self.edges[i];
                    (edge.x_at(y), edge.winding)
                }));
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut winding = 0;
                let mut span_start = None;
                for &(x, w) in &crossings {
                    winding += w;
                    let inside = rule.is_inside(winding);
                    match (inside, span_start) {
                        (true, None) => span_start = Some(x),
                        (false, Some(start)) => {
                            if antialias {
                                mask.add_span(row, start, x, weight);
                            } else {
                                mask.add_span_aliased(row, start, x);
                            }
                            span_start = None;
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    fn raster(edges: &mut EdgeList, rule: FillRule, antialias: bool) -> CoverageMask {
        let mut mask = CoverageMask::new(10, 10).unwrap();
        edges.rasterize(&mut mask, rule, antialias, 4);
        mask
    }

    #[test]
    fn test_pixel_aligned_square_is_solid() {
        let mut edges = EdgeList::new();
        edges.add_polygon(&square(2.0, 2.0, 4.0));
        let mask = raster(&mut edges, FillRule::NonZero, true);
        assert_eq!(mask.get(2, 2), 1.0);
        assert_eq!(mask.get(5, 5), 1.0);
        assert_eq!(mask.get(6, 5), 0.0);
        assert_eq!(mask.get(1, 2), 0.0);
        assert_eq!(mask.iter().count(), 16);
    }

    #[test]
    fn test_half_pixel_edges() {
        let mut edges = EdgeList::new();
        edges.add_polygon(&square(2.5, 2.5, 2.0));
        let mask = raster(&mut edges, FillRule::NonZero, true);
        assert!((mask.get(2, 2) - 0.25).abs() < 1e-6);
        assert!((mask.get(3, 2) - 0.5).abs() < 1e-6);
        assert!((mask.get(3, 3) - 1.0).abs() < 1e-6);

    }

    #[test]
    fn test_aliased_samples_pixel_centers() {
        let mut edges = EdgeList::new();
        edges.add_polygon(&square(2.6, 2.6, 2.0));
        let mask = raster(&mut edges, FillRule::NonZero, false);
        assert_eq!(mask.get(2, 2), 0.0);
        assert_eq!(mask.get(3, 3), 1.0);
        assert_eq!(mask.get(4, 4), 1.0);
        assert_eq!(mask.get(5, 5), 0.0);
        assert_eq!(mask.iter().count(), 4);
    }

    #[test]
    fn test_fill_rules_on_nested_squares() {
        // both squares wound the same way: a hole only under evenodd
        let mut edges = EdgeList::new();
        edges.add_polygon(&square(0.0, 0.0, 10.0));
        edges.add_polygon(&square(3.0, 3.0, 4.0));
        let nonzero = raster(&mut edges, FillRule::NonZero, true);
        let evenodd = raster(&mut edges, FillRule::EvenOdd, true);
        assert_eq!(nonzero.get(5, 5), 1.0);
        assert_eq!(evenodd.get(5, 5), 0.0);
        assert_eq!(evenodd.get(1, 1), 1.0);
    }

    #[test]
    fn test_clips_to_mask() {
        let mut edges = EdgeList::new();
        edges.add_polygon(&square(-5.0, -5.0, 30.0));
        let mask = raster(&mut edges, FillRule::NonZero, true);
        assert_eq!(mask.iter().count(), 100);
    }

    #[test]
    fn test_degenerate_input() {
        let mut edges = EdgeList::new();
        edges.add_polygon(&[Point::new(1.0, 1.0), Point::new(5.0, 1.0)]);
        edges.add_edge(Point::new(f32::NAN, 0.0), Point::new(1.0, 5.0));
        assert!(edges.is_empty());
        let mask = raster(&mut edges, FillRule::NonZero, true);
        assert!(mask.is_empty());
    }
}
