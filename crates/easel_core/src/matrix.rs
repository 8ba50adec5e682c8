//! 2D affine transformation
//!
//! Points are row vectors: `[x' y' 1] = [x y 1] * M`, with
//!
//! ```text
//! | sx   shy  0 |
//! | shx  sy   0 |
//! | tx   ty   1 |
//! ```
//!
//! The incremental operations (`translate`, `scale`, `shear`, `rotate`,
//! `flip_x`, `flip_y`) pre-multiply: `M = op * M`. The most recent call acts
//! first, in local space, the same way a canvas transform stack behaves.

use std::ops::Mul;

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};

/// Tolerance used by [`Matrix2D::is_equal`] and [`Matrix2D::is_identity`]
pub const MATRIX_EPSILON: f32 = 1e-5;

/// Determinants with a smaller magnitude are treated as singular
pub const DETERMINANT_EPSILON: f32 = 1e-12;

/// 2D affine transformation matrix
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix2D {
    pub sx: f32,
    pub shy: f32,
    pub shx: f32,
    pub sy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Result of [`Matrix2D::decompose`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposition {
    pub translation: Point,
    pub scale: Point,
    /// Rotation in radians
    pub rotation: f32,
    /// Skew angle between the transformed axes, in radians (0 for none)
    pub skew: f32,
}

impl Matrix2D {
    pub const IDENTITY: Matrix2D = Matrix2D {
        sx: 1.0,
        shy: 0.0,
        shx: 0.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Build from the six coefficients
    pub const fn new(sx: f32, shy: f32, shx: f32, sy: f32, tx: f32, ty: f32) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians (clockwise on screen, y pointing down)
    pub fn rotation(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Shear by angles in radians along x and y
    pub fn shearing(shx: f32, shy: f32) -> Self {
        Self::new(1.0, shy.tan(), shx.tan(), 1.0, 0.0, 0.0)
    }

    /// Set all six coefficients
    pub fn init(&mut self, sx: f32, shy: f32, shx: f32, sy: f32, tx: f32, ty: f32) {
        *self = Self::new(sx, shy, shx, sy, tx, ty);
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    /// `self * other`: the result applies `self` first, then `other`
    pub fn multiply(&self, other: &Matrix2D) -> Matrix2D {
        Matrix2D {
            sx: self.sx * other.sx + self.shy * other.shx,
            shy: self.sx * other.shy + self.shy * other.sy,
            shx: self.shx * other.sx + self.sy * other.shx,
            sy: self.shx * other.shy + self.sy * other.sy,
            tx: self.tx * other.sx + self.ty * other.shx + other.tx,
            ty: self.tx * other.shy + self.ty * other.sy + other.ty,
        }
    }

    fn pre(&mut self, op: Matrix2D) -> &mut Self {
        *self = op.multiply(self);
        self
    }

    pub fn translate(&mut self, tx: f32, ty: f32) -> &mut Self {
        self.pre(Self::translation(tx, ty))
    }

    pub fn scale(&mut self, sx: f32, sy: f32) -> &mut Self {
        self.pre(Self::scaling(sx, sy))
    }

    pub fn rotate(&mut self, angle: f32) -> &mut Self {
        self.pre(Self::rotation(angle))
    }

    pub fn shear(&mut self, shx: f32, shy: f32) -> &mut Self {
        self.pre(Self::shearing(shx, shy))
    }

    /// Mirror local x coordinates
    pub fn flip_x(&mut self) -> &mut Self {
        self.pre(Self::scaling(-1.0, 1.0))
    }

    /// Mirror local y coordinates
    pub fn flip_y(&mut self) -> &mut Self {
        self.pre(Self::scaling(1.0, -1.0))
    }

    /// `sx*sy - shy*shx`
    pub fn det(&self) -> f32 {
        self.sx * self.sy - self.shy * self.shx
    }

    pub fn is_invertible(&self) -> bool {
        let d = self.det();
        d.is_finite() && d.abs() >= DETERMINANT_EPSILON
    }

    /// Inverse matrix, or [`Error::SingularMatrix`]
    pub fn inverted(&self) -> Result<Matrix2D> {
        let d = self.det();
        if !self.is_invertible() {
            return Err(Error::SingularMatrix { determinant: d });
        }
        let inv = 1.0 / d;
        let sx = self.sy * inv;
        let sy = self.sx * inv;
        let shy = -self.shy * inv;
        let shx = -self.shx * inv;
        Ok(Matrix2D {
            sx,
            shy,
            shx,
            sy,
            tx: -self.tx * sx - self.ty * shx,
            ty: -self.tx * shy - self.ty * sy,
        })
    }

    /// Replace with the inverse; a singular matrix is left unchanged
    pub fn invert(&mut self) -> Result<()> {
        *self = self.inverted()?;
        Ok(())
    }

    pub fn is_equal(&self, other: &Matrix2D) -> bool {
        let a = self.to_array();
        let b = other.to_array();
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= MATRIX_EPSILON)
    }

    pub fn is_identity(&self) -> bool {
        self.is_equal(&Self::IDENTITY)
    }

    pub fn to_array(&self) -> [f32; 6] {
        [self.sx, self.shy, self.shx, self.sy, self.tx, self.ty]
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            p.x * self.sx + p.y * self.shx + self.tx,
            p.x * self.shy + p.y * self.sy + self.ty,
        )
    }

    /// Apply only the linear part (no translation)
    pub fn transform_vector(&self, v: Point) -> Point {
        Point::new(v.x * self.sx + v.y * self.shx, v.x * self.shy + v.y * self.sy)
    }

    /// Bounding box of the four transformed corners
    pub fn transform_rect(&self, r: &Rect) -> Rect {
        Rect::bounding(r.corners().map(|c| self.transform_point(c))).unwrap_or(Rect::ZERO)
    }

    /// Largest factor by which this matrix stretches a unit vector
    pub fn max_scale(&self) -> f32 {
        let a = self.sx * self.sx + self.shy * self.shy;
        let b = self.shx * self.shx + self.sy * self.sy;
        let c = self.sx * self.shx + self.shy * self.sy;
        let mean = (a + b) / 2.0;
        let diff = ((a - b) / 2.0).hypot(c);
        (mean + diff).max(0.0).sqrt()
    }

    pub fn translation_factor(&self) -> Point {
        Point::new(self.tx, self.ty)
    }

    pub fn set_translation_factor(&mut self, tx: f32, ty: f32) {
        self.tx = tx;
        self.ty = ty;
    }

    /// Lengths of the transformed unit axes
    pub fn scale_factor(&self) -> Point {
        Point::new(self.sx.hypot(self.shy), self.shx.hypot(self.sy))
    }

    /// Rescale both axes to the given lengths, keeping rotation and shear
    pub fn set_scale_factor(&mut self, sx: f32, sy: f32) {
        let current = self.scale_factor();
        if current.x > 0.0 {
            let k = sx / current.x;
            self.sx *= k;
            self.shy *= k;
        }
        if current.y > 0.0 {
            let k = sy / current.y;
            self.shx *= k;
            self.sy *= k;
        }
    }

    pub fn shear_factor(&self) -> Point {
        Point::new(self.shx, self.shy)
    }

    /// Angle of the transformed x axis, in radians
    pub fn rotation_factor(&self) -> f32 {
        self.shy.atan2(self.sx)
    }

    pub fn decompose(&self) -> Decomposition {
        let rotation = self.rotation_factor();
        let y_axis_angle = self.sy.atan2(self.shx);
        let skew = y_axis_angle - rotation - std::f32::consts::FRAC_PI_2;
        Decomposition {
            translation: self.translation_factor(),
            scale: self.scale_factor(),
            rotation,
            skew,
        }
    }
}

impl Mul for Matrix2D {
    type Output = Matrix2D;

    fn mul(self, rhs: Matrix2D) -> Matrix2D {
        self.multiply(&rhs)
    }
}
