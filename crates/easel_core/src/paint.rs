//! Paint sources

use crate::color::Color;
use crate::gradient::Gradient;
use crate::image::{ImagePattern, ImageTexture};

/// What a fill or stroke is colored with
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Color(Color),
    Gradient(Gradient),
    Pattern(ImagePattern),
    /// Image drawn once with its top-left corner at the user-space origin
    Image(ImageTexture),
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Color(Color::BLACK)
    }
}

impl Paint {
    /// Solid color, if this is one
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Paint::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// A paint that can never produce a visible pixel
    pub fn is_invisible(&self) -> bool {
        match self {
            Paint::Color(c) => c.a <= 0.0,
            Paint::Gradient(g) => g.stops().iter().all(|s| s.color.a <= 0.0),
            Paint::Pattern(_) | Paint::Image(_) => false,
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Color(color)
    }
}

impl From<Gradient> for Paint {
    fn from(gradient: Gradient) -> Self {
        Paint::Gradient(gradient)
    }
}

impl From<ImagePattern> for Paint {
    fn from(pattern: ImagePattern) -> Self {
        Paint::Pattern(pattern)
    }
}

impl From<ImageTexture> for Paint {
    fn from(image: ImageTexture) -> Self {
        Paint::Image(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::gradient::SpreadMode;

    #[test]
    fn test_default_is_black() {
        assert_eq!(Paint::default().as_color(), Some(Color::BLACK));
    }

    #[test]
    fn test_invisible() {
        assert!(Paint::from(Color::TRANSPARENT).is_invisible());
        assert!(!Paint::from(Color::RED).is_invisible());

        let mut g = Gradient::linear(SpreadMode::Pad, Point::ZERO, Point::new(1.0, 0.0));
        assert!(Paint::from(g.clone()).is_invisible());
        g.add_color_stop(0.5, Color::BLUE).unwrap();
        assert!(!Paint::from(g).is_invisible());
    }
}
