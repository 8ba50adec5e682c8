//! Image textures and patterns

use std::sync::Arc;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::matrix::Matrix2D;

crate::named_enum! {
    /// How an image pattern repeats along one axis
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum WrapMode {
        #[default]
        Repeat => "repeat",
        Reflect => "reflect",
    }
}

impl WrapMode {
    /// Map an integer texel coordinate into `0..size`
    pub fn apply(self, v: i64, size: u32) -> u32 {
        let size = i64::from(size.max(1));
        let mapped = match self {
            WrapMode::Repeat => v.rem_euclid(size),
            WrapMode::Reflect => {
                let m = v.rem_euclid(size * 2);
                if m >= size {
                    size * 2 - 1 - m
                } else {
                    m
                }
            }
        };
        mapped as u32
    }
}

crate::named_enum! {
    /// Sampling filter for images and patterns
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum Filter {
        Nearest => "nearest",
        #[default]
        Bilinear => "bilinear",
    }
}

/// Allocate a zeroed RGBA8 buffer, reporting allocation failure as an error
pub fn alloc_pixels(width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::invalid(format!(
            "pixel buffer size must be non-zero, got {width}x{height}"
        )));
    }
    let bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(Error::OutOfMemory { bytes: usize::MAX })?;
    let mut data = Vec::new();
    data.try_reserve_exact(bytes)
        .map_err(|_| Error::OutOfMemory { bytes })?;
    data.resize(bytes, 0);
    Ok(data)
}

/// Decoded RGBA8 image with straight (not premultiplied) alpha
///
/// Pixel storage is shared: clones and patterns made from an image point at
/// the same buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
    transparent_color: Option<[u8; 3]>,
    allow_transparent: bool,
}

impl ImageTexture {
    /// Fully transparent image
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let data = alloc_pixels(width, height)?;
        Self::from_data(width, height, data)
    }

    /// Wrap RGBA8 bytes, `width * height * 4` of them
    pub fn from_data(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Result<Self> {
        let data = data.into();
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if width == 0 || height == 0 || expected != Some(data.len()) {
            return Err(Error::invalid(format!(
                "image of {width}x{height} needs width * height * 4 bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            transparent_color: None,
            allow_transparent: true,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixels whose RGB equals `color` are treated as fully transparent
    pub fn set_transparent_color(&mut self, color: Option<Color>) {
        self.transparent_color = color.map(|c| {
            let [r, g, b, _] = c.to_rgba8();
            [r, g, b]
        });
    }

    pub fn transparent_color(&self) -> Option<Color> {
        self.transparent_color
            .map(|[r, g, b]| Color::from_rgba8(r, g, b, 255))
    }

    /// When disabled, the alpha channel is ignored and every pixel is opaque
    pub fn set_allow_transparent(&mut self, allow: bool) {
        self.allow_transparent = allow;
    }

    pub fn allow_transparent(&self) -> bool {
        self.allow_transparent
    }

    /// Texel as straight RGBA8, after the color key and alpha policy
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let mut px = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        if !self.allow_transparent {
            px[3] = 255;
        }
        if let Some(key) = self.transparent_color {
            if px[..3] == key {
                return [0; 4];
            }
        }
        px
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let [r, g, b, a] = self.texel(x, y);
        Color::from_rgba8(r, g, b, a)
    }

    /// Copy of the `width x height` region starting at `(x, y)`
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Result<ImageTexture> {
        let fits = x.checked_add(width).is_some_and(|r| r <= self.width)
            && y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits || width == 0 || height == 0 {
            return Err(Error::invalid(format!(
                "region {width}x{height} at ({x}, {y}) is outside a {}x{} image",
                self.width, self.height
            )));
        }
        let stride = self.width as usize * 4;
        let row = width as usize * 4;
        let mut data = Vec::new();
        data.try_reserve_exact(row * height as usize)
            .map_err(|_| Error::OutOfMemory {
                bytes: row * height as usize,
            })?;
        for line in y as usize..(y + height) as usize {
            let start = line * stride + x as usize * 4;
            data.extend_from_slice(&self.data[start..start + row]);
        }
        let mut sub = ImageTexture::from_data(width, height, data)?;
        sub.transparent_color = self.transparent_color;
        sub.allow_transparent = self.allow_transparent;
        Ok(sub)
    }
}

/// An image tiled over the plane
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePattern {
    image: ImageTexture,
    wrap_x: WrapMode,
    wrap_y: WrapMode,
    matrix: Matrix2D,
}

impl ImagePattern {
    pub fn new(image: ImageTexture, wrap_x: WrapMode, wrap_y: WrapMode) -> Self {
        Self {
            image,
            wrap_x,
            wrap_y,
            matrix: Matrix2D::IDENTITY,
        }
    }

    pub fn image(&self) -> &ImageTexture {
        &self.image
    }

    pub fn wrap_x(&self) -> WrapMode {
        self.wrap_x
    }

    pub fn wrap_y(&self) -> WrapMode {
        self.wrap_y
    }

    pub fn matrix(&self) -> &Matrix2D {
        &self.matrix
    }

    /// Transform the pattern by `matrix`, after any earlier transform
    pub fn transform(&mut self, matrix: &Matrix2D) {
        self.matrix = self.matrix.multiply(matrix);
    }

    /// Texel at integer pattern-space coordinates, wrapped on both axes
    pub fn texel(&self, x: i64, y: i64) -> [u8; 4] {
        self.image.texel(
            self.wrap_x.apply(x, self.image.width),
            self.wrap_y.apply(y, self.image.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> ImageTexture {
        // 2x2: red, green / blue, white
        let data = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 128,
        ];
        ImageTexture::from_data(2, 2, data).unwrap()
    }

    #[test]
    fn test_wrap_modes() {
        assert_eq!(WrapMode::Repeat.apply(5, 4), 1);
        assert_eq!(WrapMode::Repeat.apply(-1, 4), 3);
        assert_eq!(WrapMode::Reflect.apply(4, 4), 3);
        assert_eq!(WrapMode::Reflect.apply(5, 4), 2);
        assert_eq!(WrapMode::Reflect.apply(-1, 4), 0);
    }

    #[test]
    fn test_from_data_validates() {
        assert!(ImageTexture::from_data(2, 2, vec![0u8; 15]).is_err());
        assert!(ImageTexture::from_data(0, 2, Vec::<u8>::new()).is_err());
        let img = ImageTexture::new(3, 1).unwrap();
        assert_eq!(img.data().len(), 12);
        assert_eq!(img.pixel(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn test_from_data_rejects_overflowing_size() {
        let err = ImageTexture::from_data(u32::MAX, u32::MAX, vec![0u8; 4]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_color_key_and_alpha_policy() {
        let mut img = checker();
        assert_eq!(img.texel(1, 1)[3], 128);
        img.set_allow_transparent(false);
        assert_eq!(img.texel(1, 1)[3], 255);

        img.set_transparent_color(Some(Color::RED));
        assert_eq!(img.texel(0, 0), [0, 0, 0, 0]);
        assert_eq!(img.texel(1, 0), [0, 255, 0, 255]);
        assert_eq!(img.transparent_color(), Some(Color::RED));
    }

    #[test]
    fn test_sub_image() {
        let img = checker();
        let sub = img.sub_image(1, 0, 1, 2).unwrap();
        assert_eq!(sub.width(), 1);
        assert_eq!(sub.texel(0, 0), [0, 255, 0, 255]);
        assert_eq!(sub.texel(0, 1), [255, 255, 255, 128]);
        assert!(img.sub_image(1, 1, 2, 1).is_err());
    }

    #[test]
    fn test_pattern_texel_wraps() {
        let pattern = ImagePattern::new(checker(), WrapMode::Repeat, WrapMode::Reflect);
        assert_eq!(pattern.texel(2, 0), pattern.texel(0, 0));
        assert_eq!(pattern.texel(0, 2), pattern.texel(0, 1));
        assert_eq!(pattern.texel(0, 3), pattern.texel(0, 0));
    }

    #[test]
    fn test_shared_storage() {
        let img = checker();
        let clone = img.clone();
        assert!(std::ptr::eq(img.data().as_ptr(), clone.data().as_ptr()));
    }

    #[test]
    fn test_alloc_errors() {
        assert!(matches!(alloc_pixels(0, 10), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            alloc_pixels(u32::MAX, u32::MAX),
            Err(Error::OutOfMemory { .. })
        ));
    }
}
