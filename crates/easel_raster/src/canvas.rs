//! Pixel buffers that contexts render into
//!
//! A [`Canvas`] stores premultiplied RGBA8, row-major, with a stride of
//! `width * 4` bytes.

use std::fmt;

use easel_core::{alloc_pixels, Color, Error, ImageTexture, Point, Rect, Result};

/// One premultiplied RGBA8 pixel
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied channels in `[0, 1]`
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    /// Quantize premultiplied channels, keeping color within alpha
    pub fn from_f32([r, g, b, a]: [f32; 4]) -> Self {
        let a = quantize(a);
        Self {
            r: quantize(r).min(a),
            g: quantize(g).min(a),
            b: quantize(b).min(a),
            a,
        }
    }

    /// Straight-alpha color of this pixel
    pub fn to_color(self) -> Color {
        Color::from_premultiplied(self.to_f32())
    }

    pub fn from_color(color: Color) -> Self {
        Self::from_f32(color.clamped().premultiplied())
    }
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Integer pixel rectangle `[x0, x1) x [y0, y1)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    /// Pixels touched by `rect`, limited to a `width x height` surface
    pub fn enclosing(rect: &Rect, width: u32, height: u32) -> Option<Self> {
        if !rect.is_finite() || rect.is_empty() {
            return None;
        }
        let x0 = rect.x.floor().clamp(0.0, width as f32) as u32;
        let y0 = rect.y.floor().clamp(0.0, height as f32) as u32;
        let x1 = rect.right().ceil().clamp(0.0, width as f32) as u32;
        let y1 = rect.bottom().ceil().clamp(0.0, height as f32) as u32;
        (x0 < x1 && y0 < y1).then_some(Self { x0, y0, x1, y1 })
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn union(&self, other: &PixelRect) -> PixelRect {
        PixelRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// An owned premultiplied RGBA8 pixel buffer
#[derive(Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Transparent canvas
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let data = alloc_pixels(width, height)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Take over a host buffer of premultiplied RGBA8 bytes
    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if width == 0 || height == 0 || expected != Some(data.len()) {
            return Err(Error::InvalidArgument(format!(
                "a {width}x{height} canvas needs width * height * 4 bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect {
            x0: 0,
            y0: 0,
            x1: self.width,
            y1: self.height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Hand the buffer back to the host
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn pixels(&self) -> &[Rgba8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba8] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Premultiplied pixel at `(x, y)`
    pub fn pixel_raw(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.index(x, y).map(|i| self.pixels()[i])
    }

    /// Straight-alpha color at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixel_raw(x, y).map(Rgba8::to_color)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels_mut()[i] = Rgba8::from_color(color);
        }
    }

    /// Overwrite every pixel with `color`
    pub fn fill(&mut self, color: Color) {
        let px = Rgba8::from_color(color);
        self.pixels_mut().fill(px);
    }

    /// Copy the `src_rect` region (whole canvas when `None`) into `dst`
    /// with its top-left corner at `at`
    ///
    /// Pixels are copied as-is; parts falling outside either canvas are
    /// skipped.
    pub fn bitblt(&self, src_rect: Option<Rect>, dst: &mut Canvas, at: Point) {
        let src = match src_rect {
            Some(r) => match PixelRect::enclosing(&r, self.width, self.height) {
                Some(r) => r,
                None => return,
            },
            None => self.bounds(),
        };
        if !at.is_finite() {
            return;
        }
        let dx = at.x.round() as i64;
        let dy = at.y.round() as i64;

        for row in 0..src.height() {
            let sy = src.y0 + row;
            let ty = dy + i64::from(row);
            if ty < 0 || ty >= i64::from(dst.height) {
                continue;
            }
            for col in 0..src.width() {
                let sx = src.x0 + col;
                let tx = dx + i64::from(col);
                if tx < 0 || tx >= i64::from(dst.width) {
                    continue;
                }
                let s = sy as usize * self.width as usize + sx as usize;
                let d = ty as usize * dst.width as usize + tx as usize;
                dst.pixels_mut()[d] = self.pixels()[s];
            }
        }
    }

    /// Straight-alpha image of the `rect` region (whole canvas when `None`)
    pub fn snapshot(&self, rect: Option<Rect>) -> Result<ImageTexture> {
        let region = match rect {
            Some(r) => PixelRect::enclosing(&r, self.width, self.height).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "snapshot region {r:?} does not overlap the {}x{} canvas",
                    self.width, self.height
                ))
            })?,
            None => self.bounds(),
        };
        let mut data = alloc_pixels(region.width(), region.height())?;
        let mut out = 0;
        for y in region.y0..region.y1 {
            for x in region.x0..region.x1 {
                let i = y as usize * self.width as usize + x as usize;
                let px = self.pixels()[i].to_color().to_rgba8();
                data[out..out + 4].copy_from_slice(&px);
                out += 4;
            }
        }
        ImageTexture::from_data(region.width(), region.height(), data)
    }
}
