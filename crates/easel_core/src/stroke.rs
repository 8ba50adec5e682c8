//! Stroke parameters

use smallvec::SmallVec;

use crate::error::{ensure_finite, Error, Result};

crate::named_enum! {
    /// Shape at the open ends of a stroked sub-path
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum LineCap {
        #[default]
        Butt => "butt",
        Round => "round",
        Square => "square",
    }
}

crate::named_enum! {
    /// Shape at the outer corner where two stroked segments meet
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum LineJoin {
        /// Miter, cut off at the miter limit
        #[default]
        Miter => "miter",
        /// Miter, falling back to bevel past the miter limit
        MiterRevert => "miter-revert",
        /// Miter, falling back to round past the miter limit
        MiterRound => "miter-round",
        Round => "round",
        Bevel => "bevel",
    }
}

crate::named_enum! {
    /// Shape at the inner corner where two stroked segments meet
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum InnerJoin {
        #[default]
        Miter => "miter",
        Round => "round",
        Bevel => "bevel",
        Jag => "jag",
    }
}

/// Dash pattern: alternating on/off lengths starting `offset` into the cycle
#[derive(Clone, Debug, PartialEq)]
pub struct Dash {
    offset: f32,
    pattern: SmallVec<[f32; 4]>,
}

impl Dash {
    /// Validate a dash pattern
    ///
    /// Lengths must be finite and non-negative with a positive sum; the
    /// offset must be finite and non-negative. An odd number of lengths is
    /// repeated once to make the cycle even.
    pub fn new(offset: f32, lengths: &[f32]) -> Result<Self> {
        ensure_finite("dash offset", offset)?;
        if offset < 0.0 {
            return Err(Error::invalid(format!(
                "dash offset must be non-negative, got {offset}"
            )));
        }
        if lengths.is_empty() {
            return Err(Error::invalid("dash pattern must not be empty"));
        }
        for &len in lengths {
            ensure_finite("dash length", len)?;
            if len < 0.0 {
                return Err(Error::invalid(format!(
                    "dash lengths must be non-negative, got {len}"
                )));
            }
        }
        if lengths.iter().sum::<f32>() <= 0.0 {
            return Err(Error::invalid("dash pattern must have a positive length"));
        }
        let mut pattern: SmallVec<[f32; 4]> = lengths.iter().copied().collect();
        if pattern.len() % 2 == 1 {
            pattern.extend_from_slice(lengths);
        }
        Ok(Self { offset, pattern })
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Even-length on/off cycle
    pub fn pattern(&self) -> &[f32] {
        &self.pattern
    }

    pub fn cycle_length(&self) -> f32 {
        self.pattern.iter().sum()
    }
}

/// Stroke parameters
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub inner_join: InnerJoin,
    pub miter_limit: f32,
    pub dash: Option<Dash>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            inner_join: InnerJoin::Miter,
            miter_limit: 4.0,
            dash: None,
        }
    }
}

impl StrokeStyle {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_dash(mut self, dash: Dash) -> Self {
        self.dash = Some(dash);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_validation() {
        assert!(Dash::new(0.0, &[]).is_err());
        assert!(Dash::new(0.0, &[0.0, 0.0]).is_err());
        assert!(Dash::new(0.0, &[5.0, -1.0]).is_err());
        assert!(Dash::new(-1.0, &[5.0, 5.0]).is_err());
        assert!(Dash::new(f32::NAN, &[5.0]).is_err());
        let dash = Dash::new(2.0, &[5.0, 3.0]).unwrap();
        assert_eq!(dash.pattern(), &[5.0, 3.0]);
        assert_eq!(dash.cycle_length(), 8.0);
    }

    #[test]
    fn test_odd_dash_repeats() {
        let dash = Dash::new(0.0, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(dash.pattern(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_join_names() {
        assert_eq!("miter-revert".parse::<LineJoin>().unwrap(), LineJoin::MiterRevert);
        assert_eq!(LineJoin::MiterRound.name(), "miter-round");
        assert_eq!("jag".parse::<InnerJoin>().unwrap(), InnerJoin::Jag);
        assert!("sharp".parse::<LineCap>().is_err());
        assert_eq!(StrokeStyle::default().miter_limit, 4.0);
    }
}
