//! Draw-call pipeline
//!
//! Geometry becomes a [`CoverageMask`] (fill or stroke), the mask is shaped
//! by gamma, blur and the clip, and the paint is composited through it
//! into the canvas. A shadow, when set, is composited first: it is the same
//! geometry moved by the shadow offset, then blurred.

use easel_core::{
    Color, CompositeOp, FillRule, Filter, Matrix2D, Paint, Path, Point, Result, StrokeStyle,
};

use crate::canvas::{Canvas, Rgba8};
use crate::composite::composite;
use crate::mask::CoverageMask;
use crate::options::RasterOptions;
use crate::scanline::EdgeList;
use crate::shader::{Premultiplied, Shader};
use crate::stroker::stroke_triangles;

/// Blur radius in pixels at a blur amount of 1.0
pub const BLUR_SCALE: f32 = 40.0;

/// Drop shadow drawn underneath a shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowParams {
    /// Device-space offset
    pub offset: Point,
    /// Blur amount in `[0, 1]`
    pub blur: f32,
    pub color: Color,
}

/// Paint and compositing state for one draw call
#[derive(Clone, Copy, Debug)]
pub struct DrawParams<'a> {
    pub paint: &'a Paint,
    /// User-to-device transform the paint is placed with
    pub matrix: Matrix2D,
    pub filter: Filter,
    pub alpha: f32,
    pub composite: CompositeOp,
    pub gamma: f32,
    /// Blur amount in `[0, 1]`
    pub blur: f32,
    pub shadow: Option<ShadowParams>,
    pub clip: Option<&'a CoverageMask>,
}

impl<'a> DrawParams<'a> {
    /// Opaque source-over drawing of `paint` with nothing else applied
    pub fn new(paint: &'a Paint) -> Self {
        Self {
            paint,
            matrix: Matrix2D::IDENTITY,
            filter: Filter::default(),
            alpha: 1.0,
            composite: CompositeOp::SourceOver,
            gamma: 1.0,
            blur: 0.0,
            shadow: None,
            clip: None,
        }
    }
}

fn blur_radius(amount: f32) -> u32 {
    (amount.clamp(0.0, 1.0) * BLUR_SCALE).round() as u32
}

/// Coverage of `path` filled under `rule`, placed by `matrix`
pub fn fill_mask(
    path: &Path,
    matrix: &Matrix2D,
    rule: FillRule,
    antialias: bool,
    options: &RasterOptions,
    width: u32,
    height: u32,
) -> Result<CoverageMask> {
    let mut mask = CoverageMask::new(width, height)?;
    if path.is_empty() {
        return Ok(mask);
    }
    let device = path.transformed(matrix);
    let mut edges = EdgeList::new();
    edges.add_polylines(&device.flatten(options.tolerance));
    edges.rasterize(&mut mask, rule, antialias, options.subsamples);
    Ok(mask)
}

/// Coverage of the stroke outline of `path`
pub fn stroke_mask(
    path: &Path,
    style: &StrokeStyle,
    matrix: &Matrix2D,
    antialias: bool,
    options: &RasterOptions,
    width: u32,
    height: u32,
) -> Result<CoverageMask> {
    let mut mask = CoverageMask::new(width, height)?;
    let triangles = stroke_triangles(path, style, matrix, options.tolerance);
    if triangles.is_empty() {
        return Ok(mask);
    }
    let mut edges = EdgeList::new();
    for tri in &triangles {
        edges.add_polygon(tri);
    }
    edges.rasterize(&mut mask, FillRule::NonZero, antialias, options.subsamples);
    Ok(mask)
}

/// Geometry of one draw call, in user space
#[derive(Clone, Copy, Debug)]
pub enum Geometry<'a> {
    Fill { path: &'a Path, rule: FillRule },
    Stroke { path: &'a Path, style: &'a StrokeStyle },
}

impl Geometry<'_> {
    /// Coverage of the geometry placed on a `width` x `height` canvas by `matrix`
    pub fn rasterize(
        &self,
        matrix: &Matrix2D,
        antialias: bool,
        options: &RasterOptions,
        width: u32,
        height: u32,
    ) -> Result<CoverageMask> {
        match *self {
            Geometry::Fill { path, rule } => {
                fill_mask(path, matrix, rule, antialias, options, width, height)
            }
            Geometry::Stroke { path, style } => {
                stroke_mask(path, style, matrix, antialias, options, width, height)
            }
        }
    }
}

fn visible_shadow(params: &DrawParams) -> Option<ShadowParams> {
    params
        .shadow
        .filter(|s| s.color.a > 0.0 && s.offset.is_finite())
}

fn pixel_offset(offset: Point) -> (i32, i32) {
    (offset.x.round() as i32, offset.y.round() as i32)
}

/// Rasterize `geometry` and composite `paint` through it
///
/// The shadow is rasterized from the geometry moved by the shadow offset,
/// so a shape lying off the canvas still casts a shadow onto it.
pub fn draw_geometry(
    canvas: &mut Canvas,
    geometry: Geometry,
    antialias: bool,
    options: &RasterOptions,
    params: &DrawParams,
) -> Result<()> {
    let (width, height) = (canvas.width(), canvas.height());
    let shape = geometry.rasterize(&params.matrix, antialias, options, width, height)?;
    let shadow = match visible_shadow(params) {
        Some(shadow) => {
            let (dx, dy) = pixel_offset(shadow.offset);
            let moved = params
                .matrix
                .multiply(&Matrix2D::translation(dx as f32, dy as f32));
            Some(geometry.rasterize(&moved, antialias, options, width, height)?)
        }
        None => None,
    };
    composite_layers(canvas, shape, shadow, params);
    Ok(())
}

/// Composite `paint` into `canvas` through `coverage`
///
/// A shadow is cut from `coverage` itself, so only the part of the shape
/// inside the canvas casts it. Use [`draw_geometry`] when the path is known.
pub fn draw_mask(canvas: &mut Canvas, coverage: CoverageMask, params: &DrawParams) -> Result<()> {
    let shadow = match visible_shadow(params) {
        Some(shadow) if !coverage.is_empty() => {
            let (dx, dy) = pixel_offset(shadow.offset);
            Some(coverage.offset(dx, dy)?)
        }
        _ => None,
    };
    composite_layers(canvas, coverage, shadow, params);
    Ok(())
}

/// Shape `shape` and `shadow` by gamma, blur and clip, then composite the
/// shadow and the paint in that order
fn composite_layers(
    canvas: &mut Canvas,
    mut shape: CoverageMask,
    shadow: Option<CoverageMask>,
    params: &DrawParams,
) {
    let alpha = params.alpha.clamp(0.0, 1.0);
    let blur = blur_radius(params.blur);

    if let (Some(mut mask), Some(shadow)) = (shadow, visible_shadow(params)) {
        if !mask.is_empty() {
            mask.apply_gamma(params.gamma);
            mask.blur(blur);
            mask.blur(blur_radius(shadow.blur));
            if let Some(clip) = params.clip {
                mask.intersect(clip);
            }
            let color = scale(shadow.color.clamped().premultiplied(), alpha);
            composite_mask(canvas, &mask, params.composite, |_, _| color);
        }
    }

    if shape.is_empty() {
        return;
    }
    shape.apply_gamma(params.gamma);
    shape.blur(blur);
    if let Some(clip) = params.clip {
        shape.intersect(clip);
    }
    let shader = Shader::new(params.paint, &params.matrix, params.filter);
    composite_mask(canvas, &shape, params.composite, |x, y| {
        scale(shader.shade(x, y), alpha)
    });
    tracing::trace!(
        op = %params.composite,
        bounds = ?shape.bounds(),
        "composited draw"
    );
}

/// Reset pixels to transparent, inside `clip` when given
pub fn clear_canvas(canvas: &mut Canvas, clip: Option<&CoverageMask>) {
    match clip {
        None => canvas.pixels_mut().fill(Rgba8::TRANSPARENT),
        Some(mask) => composite_mask(canvas, mask, CompositeOp::Clear, |_, _| [0.0; 4]),
    }
}

fn scale(c: Premultiplied, alpha: f32) -> Premultiplied {
    [c[0] * alpha, c[1] * alpha, c[2] * alpha, c[3] * alpha]
}

fn composite_mask(
    canvas: &mut Canvas,
    mask: &CoverageMask,
    op: CompositeOp,
    source: impl Fn(u32, u32) -> Premultiplied,
) {
    let width = canvas.width() as usize;
    let pixels = canvas.pixels_mut();
    for (x, y, coverage) in mask.iter() {
        let i = y as usize * width + x as usize;
        let Some(px) = pixels.get_mut(i) else {
            continue;
        };
        let out = composite(op, source(x, y), px.to_f32(), coverage);
        *px = Rgba8::from_f32(out);
    }
}
