//! Color types and parsing

use std::str::FromStr;

use crate::error::{Error, Result};

/// RGBA color with f32 components (0.0 to 1.0), straight (not premultiplied) alpha
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create from u8 components (0-255)
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create from numeric channels, detecting the scale of each one.
    ///
    /// A channel within `[0, 1]` is read as a float; a larger one is read
    /// as a 0-255 value. Each channel is judged on its own, so
    /// `[255, 128, 0, 1]` is an opaque orange.
    pub fn from_channels(channels: [f32; 4]) -> Result<Self> {
        if let Some(bad) = channels.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(Error::format(format!(
                "color channel must be a non-negative number, got {bad}"
            )));
        }
        if let Some(bad) = channels.iter().find(|c| **c > 255.0) {
            return Err(Error::format(format!(
                "color channel {bad} is outside 0-255"
            )));
        }
        let [r, g, b, a] = channels.map(|c| if c <= 1.0 { c } else { c / 255.0 });
        Ok(Self::new(r, g, b, a))
    }

    /// Create from a packed `0xRRGGBBAA` value
    pub fn from_packed(rgba: u32) -> Self {
        Self::from_rgba8(
            ((rgba >> 24) & 0xFF) as u8,
            ((rgba >> 16) & 0xFF) as u8,
            ((rgba >> 8) & 0xFF) as u8,
            (rgba & 0xFF) as u8,
        )
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`; a missing alpha means opaque
    pub fn from_hex_str(s: &str) -> Result<Self> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| Error::format(format!("color '{s}' must start with '#'")))?;
        if !digits.is_ascii() || !(digits.len() == 6 || digits.len() == 8) {
            return Err(Error::format(format!(
                "color '{s}' must have 6 or 8 hex digits"
            )));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| Error::format(format!("color '{s}' has a non-hex digit")))
        };
        let alpha = if digits.len() == 8 { byte(6)? } else { 255 };
        Ok(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, alpha))
    }

    /// Pack into `0xRRGGBBAA`
    pub fn to_packed(&self) -> u32 {
        let [r, g, b, a] = self.to_rgba8();
        u32::from_be_bytes([r, g, b, a])
    }

    /// Set alpha and return new color
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }

    /// Clamp every channel into 0-1
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    /// Channel-wise linear interpolation
    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Premultiplied `[r*a, g*a, b*a, a]`
    pub fn premultiplied(&self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }

    /// Inverse of [`Color::premultiplied`]
    pub fn from_premultiplied([r, g, b, a]: [f32; 4]) -> Self {
        if a <= 0.0 {
            return Color::TRANSPARENT;
        }
        Self::new(r / a, g / a, b / a, a).clamped()
    }

    /// Convert to u8 array [r, g, b, a] with rounding
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            (c.a * 255.0).round() as u8,
        ]
    }

    /// Component-wise comparison within `eps`
    pub fn approx_eq(&self, other: &Color, eps: f32) -> bool {
        (self.r - other.r).abs() <= eps
            && (self.g - other.g).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.a - other.a).abs() <= eps
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_hex_str(s)
    }
}

impl TryFrom<[f32; 4]> for Color {
    type Error = Error;

    fn try_from(channels: [f32; 4]) -> Result<Self> {
        Color::from_channels(channels)
    }
}

impl TryFrom<[f32; 3]> for Color {
    type Error = Error;

    fn try_from([r, g, b]: [f32; 3]) -> Result<Self> {
        Color::from_channels([r, g, b, 1.0])
    }
}

impl From<u32> for Color {
    fn from(rgba: u32) -> Self {
        Color::from_packed(rgba)
    }
}

impl TryFrom<&str> for Color {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Color::from_hex_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_strings() {
        assert_eq!("#FF0000".parse::<Color>().unwrap(), Color::RED);
        let half = Color::from_hex_str("#FF000080").unwrap();
        assert_eq!(half, Color::new(1.0, 0.0, 0.0, 128.0 / 255.0));
        assert_eq!(Color::from_hex_str("#00ff00").unwrap(), Color::GREEN);
    }

    #[test]
    fn test_bad_hex_strings() {
        assert!(matches!(
            Color::from_hex_str("FF0000"),
            Err(Error::InvalidFormat(_))
        ));
        assert!(Color::from_hex_str("#FF00").is_err());
        assert!(Color::from_hex_str("#GG0000").is_err());
        assert!(Color::from_hex_str("#ÿÿÿ").is_err());
    }

    #[test]
    fn test_packed() {
        assert_eq!(Color::from_packed(0xFF0000FF), Color::RED);
        assert_eq!(Color::from(0x0000FF80).a, 128.0 / 255.0);
        assert_eq!(Color::RED.to_packed(), 0xFF0000FF);
    }

    #[test]
    fn test_channel_scale_detection() {
        let unit = Color::from_channels([0.5, 0.25, 1.0, 1.0]).unwrap();
        assert_eq!(unit, Color::new(0.5, 0.25, 1.0, 1.0));

        let bytes = Color::from_channels([255.0, 0.0, 51.0, 255.0]).unwrap();
        assert!(bytes.approx_eq(&Color::new(1.0, 0.0, 0.2, 1.0), 1e-6));

        assert!(Color::from_channels([-1.0, 0.0, 0.0, 1.0]).is_err());
        assert!(Color::from_channels([256.0, 0.0, 0.0, 1.0]).is_err());
        assert!(Color::from_channels([f32::NAN, 0.0, 0.0, 1.0]).is_err());
    }

    #[test]
    fn test_mixed_scale_channels() {
        let orange = Color::from_channels([255.0, 128.0, 0.0, 1.0]).unwrap();
        assert!(orange.approx_eq(&Color::new(1.0, 128.0 / 255.0, 0.0, 1.0), 1e-6));
        assert_eq!(orange.a, 1.0);

        let rgb = Color::try_from([255.0, 0.5, 0.0]).unwrap();
        assert!(rgb.approx_eq(&Color::new(1.0, 0.5, 0.0, 1.0), 1e-6));
    }

    #[test]
    fn test_premultiply_round_trip() {
        let c = Color::new(0.8, 0.4, 0.2, 0.5);
        let back = Color::from_premultiplied(c.premultiplied());
        assert!(back.approx_eq(&c, 1e-6));
        assert_eq!(Color::from_premultiplied([0.3, 0.3, 0.3, 0.0]), Color::TRANSPARENT);
    }
}
