//! Per-pixel coverage
//!
//! A [`CoverageMask`] holds one coverage value in `[0, 1]` per canvas pixel
//! together with the bounding box of the non-zero values, so later passes
//! only visit the pixels a draw call actually touched.

use easel_core::{Error, Result};

use crate::canvas::PixelRect;

/// Coverage values below this are treated as zero after filtering
const COVERAGE_EPSILON: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
    bounds: Option<PixelRect>,
}

fn alloc_coverage(width: u32, height: u32, value: f32) -> Result<Vec<f32>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::OutOfMemory { bytes: usize::MAX })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| Error::OutOfMemory {
        bytes: len.saturating_mul(std::mem::size_of::<f32>()),
    })?;
    data.resize(len, value);
    Ok(data)
}

impl CoverageMask {
    /// Empty mask
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            data: alloc_coverage(width, height, 0.0)?,
            bounds: None,
        })
    }

    /// Mask covering every pixel
    pub fn full(width: u32, height: u32) -> Result<Self> {
        let bounds = (width > 0 && height > 0).then_some(PixelRect {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        });
        Ok(Self {
            width,
            height,
            data: alloc_coverage(width, height, 1.0)?,
            bounds,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bounding box of the covered pixels
    pub fn bounds(&self) -> Option<PixelRect> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Coverage at `(x, y)`, zero outside the mask
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x < self.width && y < self.height {
            self.data[self.index(x, y)]
        } else {
            0.0
        }
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.data[i] = value.clamp(0.0, 1.0);
        if value > 0.0 {
            self.include(x, y);
        }
    }

    /// Add `amount` to the coverage at `(x, y)`, saturating at one
    pub fn accumulate(&mut self, x: u32, y: u32, amount: f32) {
        if x >= self.width || y >= self.height || amount <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        self.data[i] = (self.data[i] + amount).min(1.0);
        self.include(x, y);
    }

    /// Add `weight` times the horizontal overlap of `[x0, x1)` with each
    /// pixel of row `y`
    pub fn add_span(&mut self, y: u32, x0: f32, x1: f32, weight: f32) {
        let x0 = x0.max(0.0);
        let x1 = x1.min(self.width as f32);
        if y >= self.height || !(x1 > x0) {
            return;
        }
        let first = x0.floor() as u32;
        let last = (x1.ceil() as u32).min(self.width);
        for x in first..last {
            let left = x0.max(x as f32);
            let right = x1.min((x + 1) as f32);
            self.accumulate(x, y, (right - left) * weight);
        }
    }

    /// Fully cover the pixels of row `y` whose centers lie in `[x0, x1)`
    pub fn add_span_aliased(&mut self, y: u32, x0: f32, x1: f32) {
        if y >= self.height {
            return;
        }
        let first = (x0 - 0.5).ceil().max(0.0);
        let last = (x1 - 0.5).ceil().min(self.width as f32);
        if !(last > first) {
            return;
        }
        for x in first as u32..last as u32 {
            self.set(x, y, 1.0);
        }
    }

    /// Covered pixels with their coverage
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        self.bounds.into_iter().flat_map(move |b| {
            (b.y0..b.y1).flat_map(move |y| {
                (b.x0..b.x1).filter_map(move |x| {
                    let c = self.data[self.index(x, y)];
                    (c > 0.0).then_some((x, y, c))
                })
            })
        })
    }

    /// Raise every non-zero coverage to the power `gamma`
    pub fn apply_gamma(&mut self, gamma: f32) {
        if (gamma - 1.0).abs() <= f32::EPSILON {
            return;
        }
        self.for_each_in_bounds(|c| {
            if *c > 0.0 {
                *c = c.powf(gamma);
            }
        });
    }

    /// Multiply every coverage value by `factor`
    pub fn scale(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        self.for_each_in_bounds(|c| *c *= factor);
        if factor <= 0.0 {
            self.bounds = None;
        }
    }

    /// Keep only what is also covered by `other`
    pub fn intersect(&mut self, other: &CoverageMask) {
        let Some(bounds) = self.bounds else {
            return;
        };
        for y in bounds.y0..bounds.y1 {
            for x in bounds.x0..bounds.x1 {
                let i = self.index(x, y);
                self.data[i] *= other.get(x, y);
            }
        }
        self.bounds = match other.bounds {
            Some(o) => {
                let b = PixelRect {
                    x0: bounds.x0.max(o.x0),
                    y0: bounds.y0.max(o.y0),
                    x1: bounds.x1.min(o.x1),
                    y1: bounds.y1.min(o.y1),
                };
                (b.x0 < b.x1 && b.y0 < b.y1).then_some(b)
            }
            None => None,
        };
    }

    /// Copy of this mask moved by whole pixels
    pub fn offset(&self, dx: i32, dy: i32) -> Result<CoverageMask> {
        let mut moved = CoverageMask::new(self.width, self.height)?;
        for (x, y, c) in self.iter() {
            let tx = i64::from(x) + i64::from(dx);
            let ty = i64::from(y) + i64::from(dy);
            if tx >= 0 && ty >= 0 && tx < i64::from(self.width) && ty < i64::from(self.height) {
                moved.set(tx as u32, ty as u32, c);
            }
        }
        Ok(moved)
    }

    /// Approximate gaussian blur: a box filter of `radius` pixels applied
    /// twice along each axis
    pub fn blur(&mut self, radius: u32) {
        let Some(bounds) = self.bounds else {
            return;
        };
        if radius == 0 {
            return;
        }
        let grow = radius.saturating_mul(2);
        let area = PixelRect {
            x0: bounds.x0.saturating_sub(grow),
            y0: bounds.y0.saturating_sub(grow),
            x1: bounds.x1.saturating_add(grow).min(self.width),
            y1: bounds.y1.saturating_add(grow).min(self.height),
        };
        for _ in 0..2 {
            self.box_pass(area, radius, true);
            self.box_pass(area, radius, false);
        }
        self.for_each_in(area, |c| {
            if *c < COVERAGE_EPSILON {
                *c = 0.0;
            }
        });
        self.bounds = Some(area);
    }

    fn box_pass(&mut self, area: PixelRect, radius: u32, horizontal: bool) {
        let (lines, len) = if horizontal {
            (area.y0..area.y1, area.width() as usize)
        } else {
            (area.x0..area.x1, area.height() as usize)
        };
        let r = radius as usize;
        let norm = 1.0 / (2 * r + 1) as f32;
        let mut line_buf = vec![0.0f32; len];

        for line in lines {
            let at = |i: usize| -> (u32, u32) {
                if horizontal {
                    (area.x0 + i as u32, line)
                } else {
                    (line, area.y0 + i as u32)
                }
            };
            for (i, v) in line_buf.iter_mut().enumerate() {
                let (x, y) = at(i);
                *v = self.data[self.index(x, y)];
            }
            let mut sum: f32 = line_buf.iter().take(r + 1).sum();
            for i in 0..len {
                let (x, y) = at(i);
                let idx = self.index(x, y);
                self.data[idx] = (sum * norm).clamp(0.0, 1.0);
                if i + r + 1 < len {
                    sum += line_buf[i + r + 1];
                }
                if i >= r {
                    sum -= line_buf[i - r];
                }
            }
        }
    }

    fn for_each_in_bounds(&mut self, f: impl FnMut(&mut f32)) {
        if let Some(bounds) = self.bounds {
            self.for_each_in(bounds, f);
        }
    }

    fn for_each_in(&mut self, area: PixelRect, mut f: impl FnMut(&mut f32)) {
        for y in area.y0..area.y1 {
            let row = y as usize * self.width as usize;
            for v in &mut self.data[row + area.x0 as usize..row + area.x1 as usize] {
                f(v);
            }
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        let px = PixelRect {
            x0: x,
            y0: y,
            x1: x + 1,
            y1: y + 1,
        };
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(&px),
            None => px,
        });
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_coverage_is_exact() {
        let mut mask = CoverageMask::new(4, 1).unwrap();
        mask.add_span(0, 0.5, 2.25, 1.0);
        assert_eq!(mask.get(0, 0), 0.5);
        assert_eq!(mask.get(1, 0), 1.0);
        assert_eq!(mask.get(2, 0), 0.25);
        assert_eq!(mask.get(3, 0), 0.0);
        assert_eq!(
            mask.bounds(),
            Some(PixelRect {
                x0: 0,
                y0: 0,
                x1: 3,
                y1: 1
            })
        );
    }

    #[test]
    fn test_aliased_span_uses_pixel_centers() {
        let mut mask = CoverageMask::new(4, 1).unwrap();
        mask.add_span_aliased(0, 0.6, 2.5);
        assert_eq!(mask.get(0, 0), 0.0);
        assert_eq!(mask.get(1, 0), 1.0);
        assert_eq!(mask.get(2, 0), 0.0);
    }

    #[test]
    fn test_accumulate_saturates() {
        let mut mask = CoverageMask::new(1, 1).unwrap();
        mask.accumulate(0, 0, 0.75);
        mask.accumulate(0, 0, 0.75);
        assert_eq!(mask.get(0, 0), 1.0);
    }

    #[test]
    fn test_gamma_leaves_zero_alone() {
        let mut mask = CoverageMask::new(2, 1).unwrap();
        mask.set(0, 0, 0.25);
        mask.apply_gamma(0.5);
        assert!((mask.get(0, 0) - 0.5).abs() < 1e-6);
        mask.apply_gamma(0.0);
        assert_eq!(mask.get(0, 0), 1.0);
        assert_eq!(mask.get(1, 0), 0.0);
    }

    #[test]
    fn test_intersect() {
        let mut a = CoverageMask::new(3, 1).unwrap();
        a.set(0, 0, 1.0);
        a.set(1, 0, 0.5);
        let mut b = CoverageMask::new(3, 1).unwrap();
        b.set(1, 0, 0.5);
        b.set(2, 0, 1.0);
        a.intersect(&b);
        assert_eq!(a.get(0, 0), 0.0);
        assert_eq!(a.get(1, 0), 0.25);
        assert_eq!(a.iter().count(), 1);

        let empty = CoverageMask::new(3, 1).unwrap();
        a.intersect(&empty);
        assert!(a.is_empty());
    }

    #[test]
    fn test_offset_drops_pixels_outside() {
        let mut mask = CoverageMask::new(3, 3).unwrap();
        mask.set(0, 0, 1.0);
        mask.set(2, 2, 1.0);
        let moved = mask.offset(1, 1).unwrap();
        assert_eq!(moved.get(1, 1), 1.0);
        assert_eq!(moved.iter().count(), 1);
    }

    #[test]
    fn test_blur_spreads_and_conserves() {
        let mut mask = CoverageMask::new(21, 21).unwrap();
        mask.set(10, 10, 1.0);
        mask.blur(2);
        let total: f32 = mask.iter().map(|(_, _, c)| c).sum();
        assert!((total - 1.0).abs() < 1e-3, "total coverage {total}");
        assert!(mask.get(10, 10) < 1.0);
        assert!(mask.get(12, 10) > 0.0);
        assert_eq!(mask.get(0, 0), 0.0);
    }

    #[test]
    fn test_full_mask() {
        let mask = CoverageMask::full(2, 2).unwrap();
        assert_eq!(mask.iter().count(), 4);
        assert_eq!(mask.get(1, 1), 1.0);
    }
}
