//! Paint sampling
//!
//! A [`Shader`] resolves a [`Paint`] against the current transform once per
//! draw call and then answers premultiplied colors for device pixels.

use smallvec::SmallVec;

use easel_core::gradient::color_in_stops;
use easel_core::{
    Filter, Gradient, GradientStop, ImagePattern, ImageTexture, Matrix2D, Paint, Point,
};

/// Premultiplied RGBA in `[0, 1]`
pub type Premultiplied = [f32; 4];

const TRANSPARENT: Premultiplied = [0.0; 4];

pub enum Shader<'a> {
    Solid(Premultiplied),
    Gradient {
        gradient: &'a Gradient,
        stops: SmallVec<[GradientStop; 4]>,
        inverse: Matrix2D,
    },
    Pattern {
        pattern: &'a ImagePattern,
        inverse: Matrix2D,
        filter: Filter,
    },
    Image {
        image: &'a ImageTexture,
        inverse: Matrix2D,
        filter: Filter,
    },
    /// Paint space collapsed under the transform; draws nothing
    Empty,
}

impl<'a> Shader<'a> {
    /// Prepare `paint` for user-to-device transform `ctm`
    pub fn new(paint: &'a Paint, ctm: &Matrix2D, filter: Filter) -> Self {
        match paint {
            Paint::Color(color) => Shader::Solid(color.clamped().premultiplied()),
            Paint::Gradient(gradient) => match gradient.matrix().multiply(ctm).inverted() {
                Ok(inverse) => Shader::Gradient {
                    gradient,
                    stops: gradient.sorted_stops(),
                    inverse,
                },
                Err(_) => Shader::Empty,
            },
            Paint::Pattern(pattern) => match pattern.matrix().multiply(ctm).inverted() {
                Ok(inverse) => Shader::Pattern {
                    pattern,
                    inverse,
                    filter,
                },
                Err(_) => Shader::Empty,
            },
            Paint::Image(image) => match ctm.inverted() {
                Ok(inverse) => Shader::Image {
                    image,
                    inverse,
                    filter,
                },
                Err(_) => Shader::Empty,
            },
        }
    }

    /// Color at the center of device pixel `(x, y)`
    pub fn shade(&self, x: u32, y: u32) -> Premultiplied {
        let device = Point::new(x as f32 + 0.5, y as f32 + 0.5);
        match self {
            Shader::Solid(color) => *color,
            Shader::Gradient {
                gradient,
                stops,
                inverse,
            } => match gradient.parameter_at(inverse.transform_point(device)) {
                Some(t) => color_in_stops(stops, gradient.spread().apply(t))
                    .clamped()
                    .premultiplied(),
                None => TRANSPARENT,
            },
            Shader::Pattern {
                pattern,
                inverse,
                filter,
            } => {
                let p = inverse.transform_point(device);
                sample(*filter, p, |tx, ty| pattern.texel(tx, ty))
            }
            Shader::Image {
                image,
                inverse,
                filter,
            } => {
                let p = inverse.transform_point(device);
                sample(*filter, p, |tx, ty| {
                    if tx < 0 || ty < 0 {
                        return [0; 4];
                    }
                    match (u32::try_from(tx), u32::try_from(ty)) {
                        (Ok(tx), Ok(ty)) => image.texel(tx, ty),
                        _ => [0; 4],
                    }
                })
            }
            Shader::Empty => TRANSPARENT,
        }
    }
}

fn premultiply([r, g, b, a]: [u8; 4]) -> Premultiplied {
    let a = f32::from(a) / 255.0;
    [
        f32::from(r) / 255.0 * a,
        f32::from(g) / 255.0 * a,
        f32::from(b) / 255.0 * a,
        a,
    ]
}

/// Sample texels around `p`, given in texel units
fn sample(filter: Filter, p: Point, texel: impl Fn(i64, i64) -> [u8; 4]) -> Premultiplied {
    if !p.is_finite() {
        return TRANSPARENT;
    }
    match filter {
        Filter::Nearest => premultiply(texel(p.x.floor() as i64, p.y.floor() as i64)),
        Filter::Bilinear => {
            let u = p.x - 0.5;
            let v = p.y - 0.5;
            let x0 = u.floor();
            let y0 = v.floor();
            let fx = u - x0;
            let fy = v - y0;
            let (x0, y0) = (x0 as i64, y0 as i64);

            let taps = [
                (premultiply(texel(x0, y0)), (1.0 - fx) * (1.0 - fy)),
                (premultiply(texel(x0 + 1, y0)), fx * (1.0 - fy)),
                (premultiply(texel(x0, y0 + 1)), (1.0 - fx) * fy),
                (premultiply(texel(x0 + 1, y0 + 1)), fx * fy),
            ];
            let mut out = TRANSPARENT;
            for (color, weight) in taps {
                for (o, c) in out.iter_mut().zip(color) {
                    *o += c * weight;
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Color, SpreadMode, WrapMode};

    fn close(a: Premultiplied, b: Premultiplied) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    fn two_by_two() -> ImageTexture {
        let data = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        ImageTexture::from_data(2, 2, data).unwrap()
    }

    #[test]
    fn test_solid_is_premultiplied() {
        let paint = Paint::Color(Color::new(1.0, 0.5, 0.0, 0.5));
        let shader = Shader::new(&paint, &Matrix2D::IDENTITY, Filter::Bilinear);
        assert!(close(shader.shade(3, 4), [0.5, 0.25, 0.0, 0.5]));
    }

    #[test]
    fn test_gradient_follows_transform() {
        let gradient =
            Gradient::linear_simple(Point::ZERO, Point::new(10.0, 0.0), Color::BLACK, Color::WHITE);
        let paint = Paint::Gradient(gradient);
        let ctm = Matrix2D::scaling(2.0, 1.0);
        let shader = Shader::new(&paint, &ctm, Filter::Bilinear);
        // device x = 9.5 is user x = 4.75
        let c = shader.shade(9, 0);
        assert!((c[0] - 0.475).abs() < 1e-3);
        assert_eq!(c[3], 1.0);
        // padded past the end
        assert!(close(shader.shade(40, 0), [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_repeat_gradient() {
        let mut gradient = Gradient::linear(SpreadMode::Repeat, Point::ZERO, Point::new(10.0, 0.0));
        gradient.add_color_stop(0.0, Color::BLACK).unwrap();
        gradient.add_color_stop(1.0, Color::WHITE).unwrap();
        let paint = Paint::Gradient(gradient);
        let shader = Shader::new(&paint, &Matrix2D::IDENTITY, Filter::Nearest);
        assert!(close(shader.shade(2, 0), shader.shade(12, 0)));
    }

    #[test]
    fn test_nearest_pattern_wraps() {
        let pattern = ImagePattern::new(two_by_two(), WrapMode::Repeat, WrapMode::Repeat);
        let paint = Paint::Pattern(pattern);
        let shader = Shader::new(&paint, &Matrix2D::IDENTITY, Filter::Nearest);
        assert!(close(shader.shade(0, 0), [1.0, 0.0, 0.0, 1.0]));
        assert!(close(shader.shade(3, 0), [0.0, 1.0, 0.0, 1.0]));
        assert!(close(shader.shade(2, 3), [0.0, 0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_bilinear_blends_neighbours() {
        let pattern = ImagePattern::new(two_by_two(), WrapMode::Repeat, WrapMode::Repeat);
        let paint = Paint::Pattern(pattern);
        // scale 2: device pixel (1, 0) has its center between the first two texels
        let shader = Shader::new(&paint, &Matrix2D::scaling(2.0, 2.0), Filter::Bilinear);
        let c = shader.shade(1, 0);
        assert!(c[0] > 0.0 && c[1] > 0.0);
        assert!((c[3] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_image_is_transparent_outside() {
        let paint = Paint::Image(two_by_two());
        let mut ctm = Matrix2D::identity();
        ctm.translate(5.0, 5.0);
        let shader = Shader::new(&paint, &ctm, Filter::Nearest);
        assert!(close(shader.shade(5, 5), [1.0, 0.0, 0.0, 1.0]));
        assert!(close(shader.shade(4, 5), TRANSPARENT));
        assert!(close(shader.shade(7, 5), TRANSPARENT));
    }

    #[test]
    fn test_singular_transform_draws_nothing() {
        let paint = Paint::Image(two_by_two());
        let shader = Shader::new(&paint, &Matrix2D::scaling(0.0, 1.0), Filter::Nearest);
        assert!(matches!(shader, Shader::Empty));
    }
}
