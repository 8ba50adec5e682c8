//! Easel core types
//!
//! Resolution-independent building blocks of the easel 2D renderer.
//!
//! # Features
//!
//! - Geometry primitives and straight-alpha colors
//! - Affine transforms ([`Matrix2D`])
//! - Vector paths with hit-testing and boolean clipping
//! - Paint sources: solid colors, gradients, images and patterns
//! - Stroke parameters and compositing operator names

pub mod error;

pub mod blend;
pub mod clip;
pub mod color;
pub mod flatten;
pub mod geometry;
pub mod gradient;
pub mod image;
pub mod matrix;
pub mod paint;
pub mod path;
pub mod stroke;

pub use blend::CompositeOp;
pub use clip::ClipOp;
pub use color::Color;
pub use error::{Error, ErrorKind, Result};
pub use flatten::Polyline;
pub use geometry::{CornerRadii, Point, Rect, RoundedRect, Size};
pub use gradient::{Gradient, GradientKind, GradientStop, SpreadMode};
pub use image::{alloc_pixels, Filter, ImagePattern, ImageTexture, WrapMode};
pub use matrix::{Decomposition, Matrix2D};
pub use paint::Paint;
pub use path::{FillRule, Path, PathCommand};
pub use stroke::{Dash, InnerJoin, LineCap, LineJoin, StrokeStyle};
