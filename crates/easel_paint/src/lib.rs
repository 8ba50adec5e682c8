//! Easel
//!
//! Immediate-mode 2D vector graphics over premultiplied RGBA8 canvases.
//!
//! This crate is the drawing front end: a [`Context`] holds the graphics
//! state (transform, paint sources, stroke style, clip, shadow) and renders
//! paths into a borrowed [`Canvas`]. The types it works with are re-exported
//! from `easel_core`, and the rasterizer from `easel_raster`.
//!
//! # Example
//!
//! ```rust
//! use easel_paint::{Canvas, Color, Context, LineCap, Point};
//!
//! let mut canvas = Canvas::new(100, 100)?;
//! let mut ctx = Context::new(&mut canvas);
//!
//! ctx.set_stroke_color(Color::BLUE)?;
//! ctx.set_line_width(4.0)?;
//! ctx.set_line_cap(LineCap::Round);
//! ctx.move_to(Point::new(10.0, 10.0));
//! ctx.line_to(Point::new(90.0, 90.0));
//! ctx.stroke()?;
//! # Ok::<(), easel_paint::Error>(())
//! ```

pub mod context;
pub mod state;

pub use context::{Context, MAX_GAMMA};
pub use state::{ClipRegion, GraphicsState, Shadow};

pub use easel_core::{
    ClipOp, Color, CompositeOp, CornerRadii, Dash, Error, ErrorKind, FillRule, Filter, Gradient,
    GradientKind, GradientStop, ImagePattern, ImageTexture, InnerJoin, LineCap, LineJoin,
    Matrix2D, Paint, Path, PathCommand, Point, Rect, Result, RoundedRect, Size, SpreadMode,
    StrokeStyle, WrapMode,
};
pub use easel_raster::{Canvas, RasterOptions, Rgba8};
