//! Compositing formulas
//!
//! Every operator maps a premultiplied source and destination to a
//! premultiplied result. Coverage is applied afterwards by interpolating
//! between the destination and that result.

use easel_core::CompositeOp;

use crate::shader::Premultiplied;

/// Result of compositing `src` over `dst` with `op` at full coverage
pub fn blend(op: CompositeOp, src: Premultiplied, dst: Premultiplied) -> Premultiplied {
    let sa = src[3];
    let da = dst[3];
    match op {
        CompositeOp::Clear => [0.0; 4],
        CompositeOp::Source => src,
        CompositeOp::SourceOver => porter_duff(src, dst, 1.0, 1.0 - sa),
        CompositeOp::SourceIn => porter_duff(src, dst, da, 0.0),
        CompositeOp::SourceOut => porter_duff(src, dst, 1.0 - da, 0.0),
        CompositeOp::SourceAtop => porter_duff(src, dst, da, 1.0 - sa),
        CompositeOp::Destination => dst,
        CompositeOp::DestinationOver => porter_duff(src, dst, 1.0 - da, 1.0),
        CompositeOp::DestinationIn => porter_duff(src, dst, 0.0, sa),
        CompositeOp::DestinationOut => porter_duff(src, dst, 0.0, 1.0 - sa),
        CompositeOp::DestinationAtop => porter_duff(src, dst, 1.0 - da, sa),
        CompositeOp::Xor => porter_duff(src, dst, 1.0 - da, 1.0 - sa),

        CompositeOp::Plus => {
            let mut out = [0.0; 4];
            for i in 0..4 {
                out[i] = (src[i] + dst[i]).min(1.0);
            }
            out
        }
        CompositeOp::Minus => {
            let a = union_alpha(sa, da);
            let mut out = [0.0; 4];
            for i in 0..3 {
                out[i] = (dst[i] - src[i]).max(0.0).min(a);
            }
            out[3] = a;
            out
        }
        CompositeOp::Contrast => {
            let a = union_alpha(sa, da);
            let mut out = [0.0; 4];
            for i in 0..3 {
                let c = (dst[i] - da / 2.0) * ((src[i] - sa / 2.0) * 2.0 + 1.0) + da / 2.0;
                out[i] = c.clamp(0.0, da.min(a));
            }
            out[3] = a;
            out
        }
        CompositeOp::Invert => {
            let a = union_alpha(sa, da);
            let mut out = [0.0; 4];
            for i in 0..3 {
                out[i] = ((da - dst[i]) * sa + dst[i] * (1.0 - sa)).clamp(0.0, a);
            }
            out[3] = a;
            out
        }
        CompositeOp::InvertBlend => {
            let a = union_alpha(sa, da);
            let mut out = [0.0; 4];
            for i in 0..3 {
                out[i] = ((da - dst[i]) * src[i] + dst[i] * (1.0 - sa)).clamp(0.0, a);
            }
            out[3] = a;
            out
        }

        CompositeOp::Multiply => separable(src, dst, |s, d| s * d),
        CompositeOp::Screen => separable(src, dst, screen),
        CompositeOp::Overlay => separable(src, dst, |s, d| hard_light(d, s)),
        CompositeOp::Darken => separable(src, dst, f32::min),
        CompositeOp::Lighten => separable(src, dst, f32::max),
        CompositeOp::ColorDodge => separable(src, dst, color_dodge),
        CompositeOp::ColorBurn => separable(src, dst, color_burn),
        CompositeOp::HardLight => separable(src, dst, hard_light),
        CompositeOp::SoftLight => separable(src, dst, soft_light),
        CompositeOp::Difference => separable(src, dst, |s, d| (s - d).abs()),
        CompositeOp::Exclusion => separable(src, dst, |s, d| s + d - 2.0 * s * d),

        CompositeOp::Hue => non_separable(src, dst, |s, d| set_lum(set_sat(s, sat(d)), lum(d))),
        CompositeOp::Saturation => {
            non_separable(src, dst, |s, d| set_lum(set_sat(d, sat(s)), lum(d)))
        }
        CompositeOp::Color => non_separable(src, dst, |s, d| set_lum(s, lum(d))),
        CompositeOp::Luminosity => non_separable(src, dst, |s, d| set_lum(d, lum(s))),
    }
}

/// `D' = D + c * (blend(S, D) - D)`
pub fn composite(
    op: CompositeOp,
    src: Premultiplied,
    dst: Premultiplied,
    coverage: f32,
) -> Premultiplied {
    let full = blend(op, src, dst);
    if coverage >= 1.0 {
        return full;
    }
    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = dst[i] + coverage * (full[i] - dst[i]);
    }
    out
}

fn porter_duff(src: Premultiplied, dst: Premultiplied, fs: f32, fd: f32) -> Premultiplied {
    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = src[i] * fs + dst[i] * fd;
    }
    out
}

fn union_alpha(sa: f32, da: f32) -> f32 {
    sa + da - sa * da
}

fn unpremultiply(c: Premultiplied) -> [f32; 3] {
    if c[3] <= 0.0 {
        return [0.0; 3];
    }
    [
        (c[0] / c[3]).min(1.0),
        (c[1] / c[3]).min(1.0),
        (c[2] / c[3]).min(1.0),
    ]
}

/// W3C blend: `S(1 - Da) + D(1 - Sa) + Sa*Da*B(Cs, Cd)`
fn mix(src: Premultiplied, dst: Premultiplied, blended: [f32; 3]) -> Premultiplied {
    let sa = src[3];
    let da = dst[3];
    let mut out = [0.0; 4];
    for i in 0..3 {
        out[i] = src[i] * (1.0 - da) + dst[i] * (1.0 - sa) + sa * da * blended[i];
    }
    out[3] = union_alpha(sa, da);
    out
}

fn separable(src: Premultiplied, dst: Premultiplied, f: impl Fn(f32, f32) -> f32) -> Premultiplied {
    let s = unpremultiply(src);
    let d = unpremultiply(dst);
    mix(src, dst, [f(s[0], d[0]), f(s[1], d[1]), f(s[2], d[2])])
}

fn non_separable(
    src: Premultiplied,
    dst: Premultiplied,
    f: impl Fn([f32; 3], [f32; 3]) -> [f32; 3],
) -> Premultiplied {
    mix(src, dst, f(unpremultiply(src), unpremultiply(dst)))
}

fn screen(s: f32, d: f32) -> f32 {
    s + d - s * d
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        d * 2.0 * s
    } else {
        screen(d, 2.0 * s - 1.0)
    }
}

fn color_dodge(s: f32, d: f32) -> f32 {
    if d <= 0.0 {
        0.0
    } else if s >= 1.0 {
        1.0
    } else {
        (d / (1.0 - s)).min(1.0)
    }
}

fn color_burn(s: f32, d: f32) -> f32 {
    if d >= 1.0 {
        1.0
    } else if s <= 0.0 {
        0.0
    } else {
        1.0 - ((1.0 - d) / s).min(1.0)
    }
}

fn soft_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        d - (1.0 - 2.0 * s) * d * (1.0 - d)
    } else {
        let g = if d <= 0.25 {
            ((16.0 * d - 12.0) * d + 4.0) * d
        } else {
            d.sqrt()
        };
        d + (2.0 * s - 1.0) * (g - d)
    }
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && l - n > f32::EPSILON {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 && x - l > f32::EPSILON {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    let range = max - min;
    if range <= f32::EPSILON {
        return [0.0; 3];
    }
    let mut out = [0.0; 3];
    for i in 0..3 {
        out[i] = (c[i] - min) * s / range;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Premultiplied = [1.0, 0.0, 0.0, 1.0];
    const BLUE: Premultiplied = [0.0, 0.0, 1.0, 1.0];
    const HALF_RED: Premultiplied = [0.5, 0.0, 0.0, 0.5];
    const CLEAR: Premultiplied = [0.0; 4];

    fn close(a: Premultiplied, b: Premultiplied) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_source_over() {
        assert!(close(blend(CompositeOp::SourceOver, RED, BLUE), RED));
        assert!(close(
            blend(CompositeOp::SourceOver, HALF_RED, BLUE),
            [0.5, 0.0, 0.5, 1.0]
        ));
        assert!(close(blend(CompositeOp::SourceOver, CLEAR, BLUE), BLUE));
    }

    #[test]
    fn test_porter_duff_on_transparent_destination() {
        assert!(close(blend(CompositeOp::SourceIn, RED, CLEAR), CLEAR));
        assert!(close(blend(CompositeOp::SourceOut, RED, CLEAR), RED));
        assert!(close(blend(CompositeOp::DestinationOver, RED, CLEAR), RED));
        assert!(close(blend(CompositeOp::Xor, RED, CLEAR), RED));
        assert!(close(blend(CompositeOp::Clear, RED, BLUE), CLEAR));
        assert!(close(blend(CompositeOp::Destination, RED, BLUE), BLUE));
    }

    #[test]
    fn test_porter_duff_on_opaque_destination() {
        assert!(close(blend(CompositeOp::SourceIn, RED, BLUE), RED));
        assert!(close(blend(CompositeOp::SourceAtop, HALF_RED, BLUE), [0.5, 0.0, 0.5, 1.0]));
        assert!(close(blend(CompositeOp::DestinationIn, HALF_RED, BLUE), [0.0, 0.0, 0.5, 0.5]));
        assert!(close(blend(CompositeOp::DestinationOut, HALF_RED, BLUE), [0.0, 0.0, 0.5, 0.5]));
        assert!(close(blend(CompositeOp::DestinationAtop, RED, BLUE), BLUE));
        assert!(close(blend(CompositeOp::Xor, RED, BLUE), CLEAR));
    }

    #[test]
    fn test_separable_modes() {
        let grey = [0.5, 0.5, 0.5, 1.0];
        assert!(close(blend(CompositeOp::Multiply, RED, grey), [0.5, 0.0, 0.0, 1.0]));
        assert!(close(blend(CompositeOp::Screen, RED, grey), [1.0, 0.5, 0.5, 1.0]));
        assert!(close(blend(CompositeOp::Darken, RED, grey), [0.5, 0.0, 0.0, 1.0]));
        assert!(close(blend(CompositeOp::Lighten, RED, grey), [1.0, 0.5, 0.5, 1.0]));
        assert!(close(blend(CompositeOp::Difference, RED, grey), [0.5, 0.5, 0.5, 1.0]));
        assert!(close(blend(CompositeOp::Exclusion, RED, grey), [0.5, 0.5, 0.5, 1.0]));
        assert!(close(blend(CompositeOp::Overlay, grey, grey), [0.5, 0.5, 0.5, 1.0]));
        assert!(close(blend(CompositeOp::HardLight, RED, grey), [1.0, 0.0, 0.0, 1.0]));
        assert!(close(blend(CompositeOp::SoftLight, grey, grey), grey));
        assert!(close(blend(CompositeOp::ColorDodge, grey, grey), [1.0, 1.0, 1.0, 1.0]));
        assert!(close(blend(CompositeOp::ColorBurn, grey, grey), [0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_blend_modes_keep_source_over_transparent() {
        for op in CompositeOp::ALL.iter().filter(|op| !op.is_porter_duff()) {
            if matches!(
                op,
                CompositeOp::Plus
                    | CompositeOp::Minus
                    | CompositeOp::Contrast
                    | CompositeOp::Invert
                    | CompositeOp::InvertBlend
            ) {
                continue;
            }
            assert!(close(blend(*op, RED, CLEAR), RED), "{op}");
        }
    }

    #[test]
    fn test_arithmetic_modes() {
        assert!(close(blend(CompositeOp::Plus, HALF_RED, HALF_RED), RED));
        assert!(close(
            blend(CompositeOp::Minus, HALF_RED, [1.0, 1.0, 1.0, 1.0]),
            [0.5, 1.0, 1.0, 1.0]
        ));
        assert!(close(blend(CompositeOp::Invert, RED, BLUE), [1.0, 1.0, 0.0, 1.0]));
        assert!(close(
            blend(CompositeOp::InvertBlend, RED, BLUE),
            [1.0, 0.0, 0.0, 1.0]
        ));
        let grey = [0.5, 0.5, 0.5, 1.0];
        assert!(close(blend(CompositeOp::Contrast, grey, grey), grey));
    }

    #[test]
    fn test_non_separable_modes() {
        let grey = [0.5, 0.5, 0.5, 1.0];
        // grey has no hue or saturation to give
        assert!(close(blend(CompositeOp::Saturation, grey, RED), [0.3, 0.3, 0.3, 1.0]));
        assert!(close(blend(CompositeOp::Luminosity, grey, grey), grey));
        let c = blend(CompositeOp::Color, RED, grey);
        assert!((lum([c[0], c[1], c[2]]) - 0.5).abs() < 1e-4);
        assert!(c[0] > c[1] && c[0] > c[2]);
        let h = blend(CompositeOp::Hue, BLUE, RED);
        assert!(h[2] > h[0]);
    }

    #[test]
    fn test_partial_coverage_interpolates() {
        let out = composite(CompositeOp::SourceOver, RED, BLUE, 0.25);
        assert!(close(out, [0.25, 0.0, 0.75, 1.0]));
        let out = composite(CompositeOp::Clear, RED, BLUE, 0.5);
        assert!(close(out, [0.0, 0.0, 0.5, 0.5]));
    }
}
