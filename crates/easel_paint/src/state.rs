//! Saved drawing state
//!
//! Everything `save()`/`restore()` pushes and pops lives in
//! [`GraphicsState`]. The current path is not part of it.

use easel_core::{
    ClipOp, Color, CompositeOp, FillRule, Filter, Matrix2D, Paint, Path, Point, StrokeStyle,
};
use easel_raster::ShadowParams;

/// Drop shadow settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub enabled: bool,
    /// Device-space offset
    pub offset: Point,
    /// Blur amount in `[0, 1]`
    pub blur: f32,
    pub color: Color,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            enabled: false,
            offset: Point::ZERO,
            blur: 0.375,
            color: Color::new(0.0, 0.0, 0.0, 0.33),
        }
    }
}

impl Shadow {
    pub(crate) fn params(&self) -> Option<ShadowParams> {
        self.enabled.then_some(ShadowParams {
            offset: self.offset,
            blur: self.blur,
            color: self.color,
        })
    }
}

/// Clip region in device space
#[derive(Clone, Debug, PartialEq)]
pub struct ClipRegion {
    pub path: Path,
    pub rule: FillRule,
}

impl ClipRegion {
    pub fn new(path: Path, rule: FillRule) -> Self {
        Self { path, rule }
    }

    /// Narrow this region to its overlap with `path` under `rule`
    pub fn intersect(&self, path: &Path, rule: FillRule) -> ClipRegion {
        ClipRegion {
            path: self
                .path
                .clip_with_rules(ClipOp::Intersect, self.rule, path, rule),
            rule: FillRule::NonZero,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.path.contains(point, self.rule)
    }
}

/// The state bundle saved and restored as a unit
#[derive(Clone, Debug, PartialEq)]
pub struct GraphicsState {
    /// User-to-device transform
    pub matrix: Matrix2D,
    pub fill_rule: FillRule,
    pub stroke: StrokeStyle,
    /// Paint used by `fill` and `paint`
    pub source: Paint,
    /// Paint used by `stroke`
    pub stroke_paint: Paint,
    pub alpha: f32,
    pub blur: f32,
    pub gamma: f32,
    pub antialias: bool,
    pub filter: Filter,
    pub shadow: Shadow,
    pub composite: CompositeOp,
    /// `None` is the whole canvas
    pub clip: Option<ClipRegion>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            matrix: Matrix2D::IDENTITY,
            fill_rule: FillRule::NonZero,
            stroke: StrokeStyle::default(),
            source: Paint::default(),
            stroke_paint: Paint::default(),
            alpha: 1.0,
            blur: 0.0,
            gamma: 1.0,
            antialias: true,
            filter: Filter::Bilinear,
            shadow: Shadow::default(),
            composite: CompositeOp::SourceOver,
            clip: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::Rect;

    #[test]
    fn test_defaults() {
        let state = GraphicsState::default();
        assert_eq!(state.alpha, 1.0);
        assert_eq!(state.gamma, 1.0);
        assert!(state.antialias);
        assert_eq!(state.stroke.width, 1.0);
        assert_eq!(state.source.as_color(), Some(Color::BLACK));
        assert!(state.clip.is_none());
        assert!(state.shadow.params().is_none());
    }

    #[test]
    fn test_clip_region_intersection() {
        let a = ClipRegion::new(Path::rect(Rect::new(0.0, 0.0, 10.0, 10.0)), FillRule::NonZero);
        let b = Path::rect(Rect::new(5.0, 5.0, 10.0, 10.0));
        let both = a.intersect(&b, FillRule::EvenOdd);
        assert!(both.contains(Point::new(7.0, 7.0)));
        assert!(!both.contains(Point::new(2.0, 2.0)));
        assert!(!both.contains(Point::new(12.0, 12.0)));
    }
}
