//! Rasterizer configuration

use easel_core::{Error, Result};

/// Quality knobs for the scanline rasterizer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterOptions {
    /// Maximum distance, in device pixels, between a curve and its flattened polyline
    pub tolerance: f32,
    /// Sub-scanlines sampled per pixel row when antialiasing
    pub subsamples: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            subsamples: 4,
        }
    }
}

impl RasterOptions {
    pub const MAX_SUBSAMPLES: u32 = 16;

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_subsamples(mut self, subsamples: u32) -> Self {
        self.subsamples = subsamples;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if self.subsamples == 0 || self.subsamples > Self::MAX_SUBSAMPLES {
            return Err(Error::InvalidArgument(format!(
                "subsamples must be within 1..={}, got {}",
                Self::MAX_SUBSAMPLES,
                self.subsamples
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = RasterOptions::default();
        assert_eq!(options.tolerance, 0.1);
        assert_eq!(options.subsamples, 4);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(RasterOptions::default().with_tolerance(0.0).validate().is_err());
        assert!(RasterOptions::default()
            .with_tolerance(f32::NAN)
            .validate()
            .is_err());
        assert!(RasterOptions::default().with_subsamples(0).validate().is_err());
        assert!(RasterOptions::default().with_subsamples(17).validate().is_err());
        assert!(RasterOptions::default()
            .with_tolerance(0.25)
            .with_subsamples(16)
            .validate()
            .is_ok());
    }
}
