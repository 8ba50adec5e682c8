//! Boolean operations between paths
//!
//! Both operands are flattened and every edge is split at its crossings
//! with every other edge. A split edge survives when the result region lies
//! on exactly one of its sides; surviving edges are oriented with the
//! result on their left (positive normal) and chained into closed polygons.
//! Points are snapped to a 1/1024 px grid so that shared vertices compare
//! equal bit for bit.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::flatten::{self, Polyline};
use crate::geometry::Point;
use crate::path::{FillRule, Path};

crate::named_enum! {
    /// Boolean operator for [`Path::clip`]
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum ClipOp {
        Union => "union",
        Intersect => "intersect",
        Xor => "xor",
        /// Points in the first operand but not the second
        Diff => "diff",
    }
}

impl ClipOp {
    /// Membership of a point given its membership in each operand
    pub fn apply(self, in_a: bool, in_b: bool) -> bool {
        match self {
            ClipOp::Union => in_a || in_b,
            ClipOp::Intersect => in_a && in_b,
            ClipOp::Xor => in_a != in_b,
            ClipOp::Diff => in_a && !in_b,
        }
    }
}

const GRID: f32 = 1024.0;
/// Parametric slack when deciding whether a crossing hits an endpoint
const PARAM_EPS: f32 = 1e-6;
/// Distance of the side samples from an edge
const SIDE_OFFSET: f32 = 0.005;

type Key = (u32, u32);

fn snap(p: Point) -> Point {
    // adding 0.0 turns -0.0 into 0.0
    Point::new(
        (p.x * GRID).round() / GRID + 0.0,
        (p.y * GRID).round() / GRID + 0.0,
    )
}

fn key(p: Point) -> Key {
    (p.x.to_bits(), p.y.to_bits())
}

struct Operand {
    polylines: Vec<Polyline>,
    rule: FillRule,
}

impl Operand {
    fn new(path: &Path, rule: FillRule) -> Self {
        let mut polylines = path.flatten(Path::FLATTEN_TOLERANCE);
        for pl in &mut polylines {
            for p in &mut pl.points {
                *p = snap(*p);
            }
        }
        Self { polylines, rule }
    }

    fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    fn contains(&self, p: Point) -> bool {
        self.rule
            .is_inside(flatten::winding_number(&self.polylines, p))
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.polylines
            .iter()
            .flat_map(Polyline::closed_segments)
            .filter(|(a, b)| a != b)
    }
}

pub(crate) fn combine(a: &Path, rule_a: FillRule, op: ClipOp, b: &Path, rule_b: FillRule) -> Path {
    let lhs = Operand::new(a, rule_a);
    let rhs = Operand::new(b, rule_b);

    match (lhs.is_empty(), rhs.is_empty()) {
        (true, true) => return Path::new(),
        (false, true) => {
            return match op {
                ClipOp::Intersect => Path::new(),
                _ => a.clone(),
            }
        }
        (true, false) => {
            return match op {
                ClipOp::Union | ClipOp::Xor => b.clone(),
                _ => Path::new(),
            }
        }
        (false, false) => {}
    }

    let edges: Vec<(Point, Point)> = lhs.edges().chain(rhs.edges()).collect();
    let pieces = split_edges(&edges);

    let mut seen: FxHashSet<(Key, Key)> = FxHashSet::default();
    let mut kept: Vec<(Point, Point)> = Vec::new();
    for (p, q) in pieces {
        let d = q - p;
        let len = d.length();
        if len <= 0.0 {
            continue;
        }
        let normal = Point::new(-d.y, d.x) * (SIDE_OFFSET / len);
        let mid = p.lerp(q, 0.5);
        let left = mid + normal;
        let right = mid - normal;
        let in_left = op.apply(lhs.contains(left), rhs.contains(left));
        let in_right = op.apply(lhs.contains(right), rhs.contains(right));
        if in_left == in_right {
            continue;
        }
        let edge = if in_left { (p, q) } else { (q, p) };
        if seen.insert((key(edge.0), key(edge.1))) {
            kept.push(edge);
        }
    }

    let mut result = Path::new();
    for ring in chain_rings(&kept) {
        let ring = drop_collinear(ring);
        if ring.len() < 3 {
            continue;
        }
        result.move_to(ring[0]);
        for p in &ring[1..] {
            result.line_to(*p);
        }
        result.sub_close();
    }
    tracing::trace!(
        op = %op,
        edges = edges.len(),
        kept = kept.len(),
        "combined paths"
    );
    result
}

/// Split every edge at its crossings and collinear overlaps with the others
fn split_edges(edges: &[(Point, Point)]) -> Vec<(Point, Point)> {
    let mut splits: Vec<Vec<(f32, Point)>> = vec![Vec::new(); edges.len()];

    for i in 0..edges.len() {
        for j in i + 1..edges.len() {
            let (a0, a1) = edges[i];
            let (b0, b1) = edges[j];
            if a0.x.max(a1.x) < b0.x.min(b1.x)
                || b0.x.max(b1.x) < a0.x.min(a1.x)
                || a0.y.max(a1.y) < b0.y.min(b1.y)
                || b0.y.max(b1.y) < a0.y.min(a1.y)
            {
                continue;
            }
            let (on_i, on_j) = crossings(edges[i], edges[j]);
            splits[i].extend(on_i);
            splits[j].extend(on_j);
        }
    }

    let mut pieces = Vec::with_capacity(edges.len() * 2);
    for (&(a, b), cuts) in edges.iter().zip(splits.iter_mut()) {
        cuts.sort_by(|x, y| x.0.total_cmp(&y.0));
        let mut from = a;
        for &(_, p) in cuts.iter() {
            if p != from {
                pieces.push((from, p));
                from = p;
            }
        }
        if b != from {
            pieces.push((from, b));
        }
    }
    pieces
}

type Cuts = smallvec::SmallVec<[(f32, Point); 2]>;

/// Interior split points of two edges, as (parameter, point) pairs
fn crossings((p, p1): (Point, Point), (q, q1): (Point, Point)) -> (Cuts, Cuts) {
    let mut on_first = Cuts::new();
    let mut on_second = Cuts::new();
    let r = p1 - p;
    let s = q1 - q;
    let qp = q - p;
    let denom = r.cross(s);
    let interior = |t: f32| t > PARAM_EPS && t < 1.0 - PARAM_EPS;

    if denom.abs() > 1e-6 * r.length() * s.length() {
        let t = qp.cross(s) / denom;
        let u = qp.cross(r) / denom;
        let outside = |v: f32| v < -PARAM_EPS || v > 1.0 + PARAM_EPS;
        if outside(t) || outside(u) {
            return (on_first, on_second);
        }
        // Both edges must share the exact same split point
        let x = if t <= PARAM_EPS {
            p
        } else if t >= 1.0 - PARAM_EPS {
            p1
        } else if u <= PARAM_EPS {
            q
        } else if u >= 1.0 - PARAM_EPS {
            q1
        } else {
            snap(p + r * t)
        };
        if interior(t) {
            on_first.push((t, x));
        }
        if interior(u) {
            on_second.push((u, x));
        }
    } else {
        // Parallel: only collinear overlaps matter
        let len_r = r.length();
        if len_r <= 0.0 || qp.cross(r).abs() / len_r > 0.5 / GRID {
            return (on_first, on_second);
        }
        let rr = r.dot(r);
        for pt in [q, q1] {
            let t = (pt - p).dot(r) / rr;
            if interior(t) {
                on_first.push((t, pt));
            }
        }
        let ss = s.dot(s);
        for pt in [p, p1] {
            let u = (pt - q).dot(s) / ss;
            if interior(u) {
                on_second.push((u, pt));
            }
        }
    }
    (on_first, on_second)
}

/// Follow directed edges head to tail into closed rings
fn chain_rings(edges: &[(Point, Point)]) -> Vec<Vec<Point>> {
    let mut outgoing: FxHashMap<Key, Vec<usize>> = FxHashMap::default();
    for (i, (from, _)) in edges.iter().enumerate() {
        outgoing.entry(key(*from)).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();
    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let origin = key(edges[first].0);
        let mut ring = vec![edges[first].0];
        let mut at = edges[first].1;
        while key(at) != origin {
            ring.push(at);
            let next = outgoing
                .get(&key(at))
                .and_then(|candidates| candidates.iter().copied().find(|&e| !used[e]));
            match next {
                Some(e) => {
                    used[e] = true;
                    at = edges[e].1;
                }
                None => break,
            }
        }
        rings.push(ring);
    }
    rings
}

/// Remove vertices lying on the segment between their neighbours
fn drop_collinear(mut ring: Vec<Point>) -> Vec<Point> {
    let mut changed = true;
    while changed && ring.len() >= 3 {
        changed = false;
        let mut i = 0;
        while i < ring.len() && ring.len() >= 3 {
            let n = ring.len();
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            if flatten::distance_to_segment(ring[i], prev, next) < 1e-3 {
                ring.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn square(x: f32, y: f32, size: f32) -> Path {
        Path::rect(Rect::new(x, y, size, size))
    }

    fn inside(path: &Path, x: f32, y: f32) -> bool {
        path.contains(Point::new(x, y), FillRule::NonZero)
            && path.contains(Point::new(x, y), FillRule::EvenOdd)
    }

    #[test]
    fn test_union_overlapping() {
        let r = square(0.0, 0.0, 10.0).clip(ClipOp::Union, &square(5.0, 5.0, 10.0));
        assert!(inside(&r, 2.0, 2.0));
        assert!(inside(&r, 7.0, 7.0));
        assert!(inside(&r, 12.0, 12.0));
        assert!(!inside(&r, 12.0, 2.0));
        assert_eq!(r.bounds(), Rect::new(0.0, 0.0, 15.0, 15.0));
        // one outline with 8 corners
        assert_eq!(r.flatten(0.1).len(), 1);
        assert_eq!(r.flatten(0.1)[0].points.len(), 8);
    }

    #[test]
    fn test_intersect_overlapping() {
        let r = square(0.0, 0.0, 10.0).clip(ClipOp::Intersect, &square(5.0, 5.0, 10.0));
        assert_eq!(r.bounds(), Rect::new(5.0, 5.0, 5.0, 5.0));
        assert!(inside(&r, 7.0, 7.0));
        assert!(!inside(&r, 2.0, 2.0));
    }

    #[test]
    fn test_xor_and_diff() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 5.0, 10.0);
        let x = a.clip(ClipOp::Xor, &b);
        assert!(inside(&x, 2.0, 2.0));
        assert!(inside(&x, 12.0, 12.0));
        assert!(!inside(&x, 7.0, 7.0));

        let d = a.clip(ClipOp::Diff, &b);
        assert!(inside(&d, 2.0, 2.0));
        assert!(!inside(&d, 7.0, 7.0));
        assert!(!inside(&d, 12.0, 12.0));
    }

    #[test]
    fn test_disjoint() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(20.0, 0.0, 10.0);
        let u = a.clip(ClipOp::Union, &b);
        assert!(inside(&u, 5.0, 5.0));
        assert!(inside(&u, 25.0, 5.0));
        assert!(!inside(&u, 15.0, 5.0));

        let i = a.clip(ClipOp::Intersect, &b);
        assert!(i.is_empty());
        assert_eq!(i.bounds().area(), 0.0);
    }

    #[test]
    fn test_empty_operands() {
        let a = square(0.0, 0.0, 10.0);
        let empty = Path::new();
        assert_eq!(a.clip(ClipOp::Union, &empty), a);
        assert_eq!(a.clip(ClipOp::Diff, &empty), a);
        assert_eq!(a.clip(ClipOp::Xor, &empty), a);
        assert!(a.clip(ClipOp::Intersect, &empty).is_empty());
        assert_eq!(empty.clip(ClipOp::Union, &a), a);
        assert!(empty.clip(ClipOp::Diff, &a).is_empty());
    }

    #[test]
    fn test_shared_edge_union() {
        let r = square(0.0, 0.0, 10.0).clip(ClipOp::Union, &square(10.0, 0.0, 10.0));
        let rings = r.flatten(0.1);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].points.len(), 4);
        assert_eq!(r.bounds(), Rect::new(0.0, 0.0, 20.0, 10.0));
        assert!(inside(&r, 10.0, 5.0));
    }

    #[test]
    fn test_identical_operands() {
        let a = square(0.0, 0.0, 10.0);
        let r = a.clip(ClipOp::Union, &a);
        assert_eq!(r.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(r.flatten(0.1)[0].points.len(), 4);
        assert!(a.clip(ClipOp::Xor, &a).is_empty());
    }

    #[test]
    fn test_hole() {
        let r = square(0.0, 0.0, 30.0).clip(ClipOp::Diff, &square(10.0, 10.0, 10.0));
        assert!(inside(&r, 5.0, 5.0));
        assert!(!inside(&r, 15.0, 15.0));
        assert_eq!(r.flatten(0.1).len(), 2);
    }

    #[test]
    fn test_operand_fill_rules() {
        // Doubly covered square: evenodd sees nothing in the overlap
        let mut twice = square(0.0, 0.0, 10.0);
        twice.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let frame = square(-5.0, -5.0, 20.0);
        let nonzero =
            frame.clip_with_rules(ClipOp::Intersect, FillRule::NonZero, &twice, FillRule::NonZero);
        assert!(inside(&nonzero, 5.0, 5.0));
        let evenodd =
            frame.clip_with_rules(ClipOp::Intersect, FillRule::NonZero, &twice, FillRule::EvenOdd);
        assert!(evenodd.is_empty());
    }

    #[test]
    fn test_curves() {
        let circle = Path::circle(Point::new(0.0, 0.0), 10.0);
        let half = square(0.0, -20.0, 40.0);
        let r = circle.clip(ClipOp::Intersect, &half);
        assert!(inside(&r, 5.0, 0.0));
        assert!(!inside(&r, -5.0, 0.0));
        let b = r.bounds();
        assert!(b.x.abs() < 1e-3);
        assert!((b.right() - 10.0).abs() < 0.2);
    }

    #[test]
    fn test_op_names() {
        assert_eq!("diff".parse::<ClipOp>().unwrap(), ClipOp::Diff);
        assert!("subtract".parse::<ClipOp>().is_err());
        assert_eq!(ClipOp::ALL.len(), 4);
    }
}
