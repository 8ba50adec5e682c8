//! Immediate-mode drawing context
//!
//! A [`Context`] borrows a [`Canvas`] and renders into it as soon as a
//! drawing call is made. It keeps one current [`GraphicsState`], a stack of
//! saved states, and a current path built in user space. The path is
//! placed with the transform in effect when it is filled, stroked or used
//! as a clip.
//!
//! # Example
//!
//! ```rust
//! use easel_paint::{Canvas, Color, Context, Rect};
//!
//! let mut canvas = Canvas::new(64, 64)?;
//! let mut ctx = Context::new(&mut canvas);
//! ctx.set_source_color(Color::RED)?;
//! ctx.rectangle(Rect::new(8.0, 8.0, 48.0, 48.0));
//! ctx.fill()?;
//! # Ok::<(), easel_paint::Error>(())
//! ```

use easel_core::error::{ensure_finite, ensure_range};
use easel_core::{
    Color, CompositeOp, CornerRadii, Dash, Error, FillRule, Filter, Gradient, ImagePattern,
    ImageTexture, InnerJoin, LineCap, LineJoin, Matrix2D, Paint, Path, Point, Rect, Result,
    StrokeStyle,
};
use easel_raster::{
    clear_canvas, draw_geometry, draw_mask, fill_mask, Canvas, CoverageMask, DrawParams,
    Geometry, RasterOptions,
};

use crate::state::{ClipRegion, GraphicsState, Shadow};

/// Largest gamma accepted by [`Context::set_gamma`]
pub const MAX_GAMMA: f32 = 3.0;

fn check_color(name: &str, color: Color) -> Result<Color> {
    for v in [color.r, color.g, color.b, color.a] {
        ensure_range(name, v, 0.0, 1.0)?;
    }
    Ok(color)
}

fn check_matrix(matrix: &Matrix2D) -> Result<()> {
    for v in matrix.to_array() {
        ensure_finite("matrix coefficient", v)?;
    }
    Ok(())
}

fn check_rect(name: &str, rect: &Rect) -> Result<()> {
    if rect.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("{name} must be finite, got {rect:?}")))
    }
}

/// What a draw call composites through
enum Coverage<'p> {
    /// A path, rasterized under the current transform
    Shape(Geometry<'p>),
    /// Device-space coverage
    Mask(CoverageMask),
}

/// Drawing context rendering into a borrowed canvas
pub struct Context<'a> {
    canvas: &'a mut Canvas,
    options: RasterOptions,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: Path,
}

impl<'a> Context<'a> {
    /// Context with default raster options
    pub fn new(canvas: &'a mut Canvas) -> Self {
        Self {
            canvas,
            options: RasterOptions::default(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            path: Path::new(),
        }
    }

    /// Context with custom raster options
    pub fn with_options(canvas: &'a mut Canvas, options: RasterOptions) -> Result<Self> {
        options.validate()?;
        let mut ctx = Self::new(canvas);
        ctx.options = options;
        Ok(ctx)
    }

    pub fn canvas(&self) -> &Canvas {
        &*self.canvas
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    /// Current graphics state
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State stack
    // ─────────────────────────────────────────────────────────────────────────

    /// Push a copy of the current state
    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
        tracing::debug!(depth = self.stack.len(), "saved graphics state");
    }

    /// Pop the most recently saved state
    ///
    /// Fails with [`Error::StateStackUnderflow`] when nothing is saved.
    pub fn restore(&mut self) -> Result<()> {
        let state = self.stack.pop().ok_or(Error::StateStackUnderflow)?;
        self.state = state;
        tracing::debug!(depth = self.stack.len(), "restored graphics state");
        Ok(())
    }

    /// Number of saved states
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the global alpha in `[0, 1]`, returning the previous value
    pub fn set_alpha(&mut self, alpha: f32) -> Result<f32> {
        ensure_range("alpha", alpha, 0.0, 1.0)?;
        Ok(std::mem::replace(&mut self.state.alpha, alpha))
    }

    pub fn alpha(&self) -> f32 {
        self.state.alpha
    }

    /// Set the blur amount in `[0, 1]`, returning the previous value
    pub fn set_blur(&mut self, blur: f32) -> Result<f32> {
        ensure_range("blur", blur, 0.0, 1.0)?;
        Ok(std::mem::replace(&mut self.state.blur, blur))
    }

    pub fn blur(&self) -> f32 {
        self.state.blur
    }

    /// Set the coverage gamma in `[0, 3]`, returning the previous value
    pub fn set_gamma(&mut self, gamma: f32) -> Result<f32> {
        ensure_range("gamma", gamma, 0.0, MAX_GAMMA)?;
        Ok(std::mem::replace(&mut self.state.gamma, gamma))
    }

    pub fn gamma(&self) -> f32 {
        self.state.gamma
    }

    pub fn set_antialias(&mut self, antialias: bool) {
        self.state.antialias = antialias;
    }

    pub fn antialias(&self) -> bool {
        self.state.antialias
    }

    /// Set the image sampling filter, returning the previous one
    pub fn set_filter(&mut self, filter: Filter) -> Filter {
        std::mem::replace(&mut self.state.filter, filter)
    }

    pub fn filter(&self) -> Filter {
        self.state.filter
    }

    /// Set the fill rule, returning the previous one
    pub fn set_fill_rule(&mut self, rule: FillRule) -> FillRule {
        std::mem::replace(&mut self.state.fill_rule, rule)
    }

    pub fn fill_rule(&self) -> FillRule {
        self.state.fill_rule
    }

    /// Set the compositing operator, returning the previous one
    pub fn set_composite_operation(&mut self, op: CompositeOp) -> CompositeOp {
        std::mem::replace(&mut self.state.composite, op)
    }

    pub fn composite_operation(&self) -> CompositeOp {
        self.state.composite
    }

    // ---- stroke parameters ----

    /// Set the stroke width, returning the previous value
    pub fn set_line_width(&mut self, width: f32) -> Result<f32> {
        ensure_finite("line width", width)?;
        if width < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "line width must be non-negative, got {width}"
            )));
        }
        Ok(std::mem::replace(&mut self.state.stroke.width, width))
    }

    pub fn line_width(&self) -> f32 {
        self.state.stroke.width
    }

    /// Set the miter limit, returning the previous value
    pub fn set_miter_limit(&mut self, limit: f32) -> Result<f32> {
        ensure_finite("miter limit", limit)?;
        if limit < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "miter limit must be non-negative, got {limit}"
            )));
        }
        Ok(std::mem::replace(&mut self.state.stroke.miter_limit, limit))
    }

    pub fn miter_limit(&self) -> f32 {
        self.state.stroke.miter_limit
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.stroke.cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.stroke.join = join;
    }

    pub fn set_line_inner_join(&mut self, join: InnerJoin) {
        self.state.stroke.inner_join = join;
    }

    /// Dash strokes with on/off `lengths`, starting `offset` into the pattern
    pub fn set_line_dash(&mut self, offset: f32, lengths: &[f32]) -> Result<()> {
        self.state.stroke.dash = Some(Dash::new(offset, lengths)?);
        Ok(())
    }

    /// Draw solid strokes again
    pub fn reset_line_dash(&mut self) {
        self.state.stroke.dash = None;
    }

    pub fn stroke_style(&self) -> &StrokeStyle {
        &self.state.stroke
    }

    // ---- shadow ----

    /// Enable a drop shadow offset by `(x, y)` device pixels
    pub fn set_shadow(&mut self, x: f32, y: f32, blur: f32) -> Result<()> {
        ensure_finite("shadow offset x", x)?;
        ensure_finite("shadow offset y", y)?;
        ensure_range("shadow blur", blur, 0.0, 1.0)?;
        let shadow = &mut self.state.shadow;
        shadow.enabled = true;
        shadow.offset = Point::new(x, y);
        shadow.blur = blur;
        Ok(())
    }

    pub fn set_shadow_color(&mut self, color: Color) -> Result<()> {
        self.state.shadow.color = check_color("shadow color", color)?;
        Ok(())
    }

    /// Disable the shadow and restore its default settings
    pub fn reset_shadow(&mut self) {
        self.state.shadow = Shadow::default();
    }

    pub fn shadow(&self) -> &Shadow {
        &self.state.shadow
    }

    // ---- paint sources ----

    /// Use `paint` for fills and `paint()`
    pub fn set_source(&mut self, paint: impl Into<Paint>) {
        self.state.source = paint.into();
    }

    pub fn set_source_color(&mut self, color: Color) -> Result<()> {
        self.state.source = Paint::Color(check_color("source color", color)?);
        Ok(())
    }

    pub fn set_source_gradient(&mut self, gradient: &Gradient) {
        self.state.source = Paint::Gradient(gradient.clone());
    }

    pub fn set_source_pattern(&mut self, pattern: &ImagePattern) {
        self.state.source = Paint::Pattern(pattern.clone());
    }

    /// Use `image` as the source, with its top-left corner at the user-space origin
    pub fn set_source_image(&mut self, image: &ImageTexture) {
        self.state.source = Paint::Image(image.clone());
    }

    /// Use a snapshot of another canvas as the source image
    pub fn set_source_canvas(&mut self, canvas: &Canvas) -> Result<()> {
        let image = canvas.snapshot(None)?;
        self.state.source = Paint::Image(image);
        Ok(())
    }

    pub fn source(&self) -> &Paint {
        &self.state.source
    }

    /// Use `paint` for strokes
    pub fn set_stroke_paint(&mut self, paint: impl Into<Paint>) {
        self.state.stroke_paint = paint.into();
    }

    pub fn set_stroke_color(&mut self, color: Color) -> Result<()> {
        self.state.stroke_paint = Paint::Color(check_color("stroke color", color)?);
        Ok(())
    }

    pub fn set_stroke_gradient(&mut self, gradient: &Gradient) {
        self.state.stroke_paint = Paint::Gradient(gradient.clone());
    }

    pub fn set_stroke_pattern(&mut self, pattern: &ImagePattern) {
        self.state.stroke_paint = Paint::Pattern(pattern.clone());
    }

    pub fn set_stroke_image(&mut self, image: &ImageTexture) {
        self.state.stroke_paint = Paint::Image(image.clone());
    }

    pub fn stroke_paint(&self) -> &Paint {
        &self.state.stroke_paint
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transform
    // ─────────────────────────────────────────────────────────────────────────

    pub fn translate(&mut self, tx: f32, ty: f32) -> Result<()> {
        ensure_finite("translation x", tx)?;
        ensure_finite("translation y", ty)?;
        self.state.matrix.translate(tx, ty);
        Ok(())
    }

    pub fn scale(&mut self, sx: f32, sy: f32) -> Result<()> {
        ensure_finite("scale x", sx)?;
        ensure_finite("scale y", sy)?;
        self.state.matrix.scale(sx, sy);
        Ok(())
    }

    /// Shear by the angles `shx` and `shy`, in radians
    pub fn shear(&mut self, shx: f32, shy: f32) -> Result<()> {
        ensure_finite("shear x", shx)?;
        ensure_finite("shear y", shy)?;
        self.state.matrix.shear(shx, shy);
        Ok(())
    }

    /// Rotate by `angle` radians, clockwise on screen
    pub fn rotate(&mut self, angle: f32) -> Result<()> {
        ensure_finite("rotation", angle)?;
        self.state.matrix.rotate(angle);
        Ok(())
    }

    /// Reset the transform to identity
    pub fn identity(&mut self) {
        self.state.matrix.reset();
    }

    /// Apply `matrix` in the current local space
    pub fn transform(&mut self, matrix: &Matrix2D) -> Result<()> {
        check_matrix(matrix)?;
        self.state.matrix = matrix.multiply(&self.state.matrix);
        Ok(())
    }

    /// Replace the transform
    pub fn set_matrix(&mut self, matrix: &Matrix2D) -> Result<()> {
        check_matrix(matrix)?;
        self.state.matrix = *matrix;
        Ok(())
    }

    pub fn matrix(&self) -> Matrix2D {
        self.state.matrix
    }

    /// Map a user-space point to device space
    pub fn world_to_viewport(&self, point: Point) -> Point {
        self.state.matrix.transform_point(point)
    }

    /// Map a device-space point back to user space
    pub fn viewport_to_world(&self, point: Point) -> Result<Point> {
        Ok(self.state.matrix.inverted()?.transform_point(point))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Current path
    // ─────────────────────────────────────────────────────────────────────────

    /// Discard the current path
    pub fn new_path(&mut self) {
        self.path.clear();
    }

    /// Let the next segment start a new sub-path without closing this one
    pub fn new_sub_path(&mut self) {
        self.path.new_sub_path();
    }

    /// Replace the current path with a copy of `path`
    pub fn set_path(&mut self, path: &Path) {
        self.path = path.clone();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn move_to(&mut self, point: Point) {
        self.path.move_to(point);
    }

    pub fn line_to(&mut self, point: Point) {
        self.path.line_to(point);
    }

    pub fn bezier_curve_to(&mut self, control1: Point, control2: Point, end: Point) {
        self.path.bezier_to(control1, control2, end);
    }

    pub fn quad_curve_to(&mut self, control: Point, end: Point) {
        self.path.quad_to(control, end);
    }

    /// Circular arc joined to the current sub-path
    ///
    /// Angles are in radians; with `clockwise` the angle increases from
    /// `start_angle` to `end_angle`.
    pub fn arc(
        &mut self,
        center: Point,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        clockwise: bool,
    ) -> Result<()> {
        ensure_finite("arc radius", radius)?;
        ensure_finite("arc start angle", start_angle)?;
        ensure_finite("arc end angle", end_angle)?;
        if radius <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "arc radius must be positive, got {radius}"
            )));
        }
        self.path
            .arc(center, radius, start_angle, end_angle, clockwise);
        Ok(())
    }

    /// Elliptical arc inscribed in `rect`, joined to the current sub-path
    pub fn tangent_arc(&mut self, rect: Rect, start_angle: f32, sweep_angle: f32) -> Result<()> {
        check_rect("arc rect", &rect)?;
        ensure_finite("arc start angle", start_angle)?;
        ensure_finite("arc sweep angle", sweep_angle)?;
        self.path.elliptic_arc_in(rect, start_angle, sweep_angle);
        Ok(())
    }

    /// Close the current sub-path
    pub fn close_path(&mut self) {
        self.path.sub_close();
    }

    pub fn rectangle(&mut self, rect: Rect) {
        self.path.add_rect(rect);
    }

    pub fn rounded_rect(&mut self, rect: Rect, radii: impl Into<CornerRadii>) {
        self.path.add_rounded_rect(rect, radii);
    }

    /// Ellipse inscribed in `rect`
    pub fn ellipse(&mut self, rect: Rect) {
        self.path.add_ellipse(rect);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drawing
    // ─────────────────────────────────────────────────────────────────────────

    /// Fill the current path with the source paint, then discard it
    pub fn fill(&mut self) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        let rule = self.state.fill_rule;
        tracing::trace!(rule = %rule, "fill");
        let path = std::mem::take(&mut self.path);
        let result = self.draw(Coverage::Shape(Geometry::Fill { path: &path, rule }), false);
        if result.is_err() {
            self.path = path;
        }
        result
    }

    /// Stroke the current path with the stroke paint, then discard it
    pub fn stroke(&mut self) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        let style = self.state.stroke.clone();
        tracing::trace!(width = style.width, "stroke");
        let path = std::mem::take(&mut self.path);
        let geometry = Geometry::Stroke {
            path: &path,
            style: &style,
        };
        let result = self.draw(Coverage::Shape(geometry), true);
        if result.is_err() {
            self.path = path;
        }
        result
    }

    /// Fill the whole clip region with the source paint
    ///
    /// The current path is left untouched.
    pub fn paint(&mut self) -> Result<()> {
        let mask = match self.clip_mask()? {
            Some(clip) => clip,
            None => CoverageMask::full(self.canvas.width(), self.canvas.height())?,
        };
        tracing::trace!(bounds = ?mask.bounds(), "paint");
        self.draw(Coverage::Mask(mask), false)
    }

    /// Reset the clip region to transparent, ignoring every paint setting
    pub fn clear(&mut self) -> Result<()> {
        let clip = self.clip_mask()?;
        clear_canvas(self.canvas, clip.as_ref());
        tracing::trace!(clipped = clip.is_some(), "clear");
        Ok(())
    }

    fn draw(&mut self, coverage: Coverage<'_>, stroke: bool) -> Result<()> {
        let state = &self.state;
        let paint = if stroke {
            &state.stroke_paint
        } else {
            &state.source
        };
        let shadow = state.shadow.params();
        // source-over with a transparent source and no shadow leaves every pixel as is
        if state.composite == CompositeOp::SourceOver && shadow.is_none() && paint.is_invisible() {
            return Ok(());
        }
        let clip = self.clip_mask()?;
        let params = DrawParams {
            paint,
            matrix: state.matrix,
            filter: state.filter,
            alpha: state.alpha,
            composite: state.composite,
            gamma: state.gamma,
            blur: state.blur,
            shadow,
            clip: clip.as_ref(),
        };
        match coverage {
            Coverage::Shape(geometry) => {
                draw_geometry(self.canvas, geometry, state.antialias, &self.options, &params)
            }
            Coverage::Mask(mask) => draw_mask(self.canvas, mask, &params),
        }
    }

    fn clip_mask(&self) -> Result<Option<CoverageMask>> {
        let Some(region) = &self.state.clip else {
            return Ok(None);
        };
        fill_mask(
            &region.path,
            &Matrix2D::IDENTITY,
            region.rule,
            self.state.antialias,
            &self.options,
            self.canvas.width(),
            self.canvas.height(),
        )
        .map(Some)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clipping
    // ─────────────────────────────────────────────────────────────────────────

    fn intersect_clip(&mut self, device_path: Path, rule: FillRule) {
        let next = match &self.state.clip {
            Some(current) => current.intersect(&device_path, rule),
            None => ClipRegion::new(device_path, rule),
        };
        tracing::trace!(empty = next.path.is_empty(), "clip narrowed");
        self.state.clip = Some(next);
    }

    /// Intersect the clip with the current path under the fill rule, then
    /// discard the path
    pub fn clip(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let device = self.path.transformed(&self.state.matrix);
        self.intersect_clip(device, self.state.fill_rule);
        self.path.clear();
    }

    /// Intersect the clip with `path`, placed by the current transform
    pub fn clip_path(&mut self, path: &Path, rule: FillRule) {
        let device = path.transformed(&self.state.matrix);
        self.intersect_clip(device, rule);
    }

    /// Intersect the clip with a user-space rectangle
    pub fn clip_rect(&mut self, rect: Rect) -> Result<()> {
        check_rect("clip rect", &rect)?;
        self.clip_path(&Path::rect(rect), FillRule::NonZero);
        Ok(())
    }

    /// Intersect the clip with the union of `rects`
    pub fn clip_rects(&mut self, rects: &[Rect]) -> Result<()> {
        if rects.is_empty() {
            return Err(Error::InvalidArgument(
                "clip_rects needs at least one rect".to_string(),
            ));
        }
        let mut path = Path::new();
        for rect in rects {
            check_rect("clip rect", rect)?;
            path.add_rect(*rect);
        }
        self.clip_path(&path, FillRule::NonZero);
        Ok(())
    }

    /// Intersect the clip with a rectangle given in device pixels
    pub fn clip_device_rect(&mut self, rect: Rect) -> Result<()> {
        check_rect("clip rect", &rect)?;
        self.intersect_clip(Path::rect(rect), FillRule::NonZero);
        Ok(())
    }

    /// Clip to the whole canvas again
    pub fn reset_clip(&mut self) {
        self.state.clip = None;
        tracing::debug!("clip reset");
    }

    /// Whether the device-space `point` lies inside the clip region
    pub fn clip_contains(&self, point: Point) -> bool {
        match &self.state.clip {
            Some(region) => region.contains(point),
            None => {
                point.x >= 0.0
                    && point.y >= 0.0
                    && point.x < self.canvas.width() as f32
                    && point.y < self.canvas.height() as f32
            }
        }
    }
}
