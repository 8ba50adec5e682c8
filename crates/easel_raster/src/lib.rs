//! Easel CPU renderer
//!
//! Scan-converts [`easel_core::Path`] geometry into coverage masks and
//! composites paint through them into premultiplied RGBA8 [`Canvas`]es.
//!
//! # Pipeline
//!
//! - [`render::fill_mask`] / [`render::stroke_mask`] produce coverage
//! - [`render::draw_geometry`] / [`render::draw_mask`] apply gamma, blur,
//!   shadow and clip, then composite the shaded paint with one of the
//!   [`CompositeOp`]s
//!
//! [`CompositeOp`]: easel_core::CompositeOp

pub mod canvas;
pub mod composite;
pub mod mask;
pub mod options;
pub mod render;
pub mod scanline;
pub mod shader;
pub mod stroker;

pub use canvas::{Canvas, PixelRect, Rgba8};
pub use mask::CoverageMask;
pub use options::RasterOptions;
pub use render::{
    clear_canvas, draw_geometry, draw_mask, fill_mask, stroke_mask, DrawParams, Geometry,
    ShadowParams, BLUR_SCALE,
};
pub use shader::{Premultiplied, Shader};
pub use stroker::{dash_polylines, stroke_triangles};
