//! Color utilities

use palette::LinSrgb;

use crate::models::Color;

/// Color with normalized (0-1) channels
pub type ColorF = LinSrgb<f64>;

/// Convert a HSV color to RGB
///
/// # Parameters
///
/// * `h`: hue, wrapped to [0, 1)
/// * `s`: saturation in [0, 1]
/// * `v`: value in [0, 1]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> ColorF {
    if s == 0.0 {
        return ColorF::new(v, v, v);
    }

    let h = h.rem_euclid(1.0) * 6.0;
    let i = h.floor();
    let f = h - i;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match (i as u32) % 6 {
        0 => ColorF::new(v, t, p),
        1 => ColorF::new(q, v, p),
        2 => ColorF::new(p, v, t),
        3 => ColorF::new(p, q, v),
        4 => ColorF::new(t, p, v),
        _ => ColorF::new(v, p, q),
    }
}

/// Fully saturated, full value color at hue `h`
pub fn hue_to_rgb(h: f64) -> ColorF {
    hsv_to_rgb(h, 1.0, 1.0)
}

fn channel_to8(x: f64) -> u8 {
    // `as` truncates towards zero
    (x.clamp(0.0, 1.0) * 255.0) as u8
}

/// Scale a normalized color to 8-bit channels, truncating
pub fn color_to8(color: ColorF) -> Color {
    let (r, g, b) = color.into_components();
    Color::new(channel_to8(r), channel_to8(g), channel_to8(b))
}

/// Multiply every channel of `color` by `factor`, truncating
pub fn scale(color: Color, factor: f64) -> Color {
    let (r, g, b) = color.into_components();
    let scale = |c: u8| (f64::from(c) * factor.clamp(0.0, 1.0)) as u8;
    Color::new(scale(r), scale(g), scale(b))
}

/// Linear interpolation between `a` (weight 0) and `b` (weight 1)
pub fn lerp(a: ColorF, b: ColorF, weight: f64) -> ColorF {
    let (ar, ag, ab) = a.into_components();
    let (br, bg, bb) = b.into_components();
    let mix = |x: f64, y: f64| x * (1.0 - weight) + y * weight;
    ColorF::new(mix(ar, br), mix(ag, bg), mix(ab, bb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hues() {
        assert_eq!(color_to8(hue_to_rgb(0.0)), Color::new(255, 0, 0));
        assert_eq!(color_to8(hue_to_rgb(1.0 / 3.0)), Color::new(0, 255, 0));
        assert_eq!(color_to8(hue_to_rgb(2.0 / 3.0)), Color::new(0, 0, 255));
        assert_eq!(color_to8(hue_to_rgb(1.0)), Color::new(255, 0, 0));
    }

    #[test]
    fn secondary_hues() {
        assert_eq!(color_to8(hue_to_rgb(0.25)), Color::new(127, 255, 0));
        assert_eq!(color_to8(hue_to_rgb(0.5)), Color::new(0, 255, 255));
        assert_eq!(color_to8(hue_to_rgb(0.75)), Color::new(127, 0, 255));
    }

    #[test]
    fn grey_when_unsaturated() {
        assert_eq!(color_to8(hsv_to_rgb(0.4, 0.0, 0.5)), Color::new(127, 127, 127));
    }

    #[test]
    fn conversion_truncates() {
        assert_eq!(color_to8(ColorF::new(0.5, 0.999, 0.8)), Color::new(127, 254, 204));
        assert_eq!(scale(Color::new(255, 3, 1), 0.5), Color::new(127, 1, 0));
    }

    #[test]
    fn lerp_endpoints() {
        let a = ColorF::new(1.0, 0.0, 0.0);
        let b = ColorF::new(1.0, 0.5, 0.0);

        assert_eq!(color_to8(lerp(a, b, 0.0)), Color::new(255, 0, 0));
        assert_eq!(color_to8(lerp(a, b, 1.0)), Color::new(255, 127, 0));
        assert_eq!(color_to8(lerp(a, b, 0.5)), Color::new(255, 63, 0));
    }
}
