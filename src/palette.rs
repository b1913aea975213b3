use macroquad::color::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_color(self, alpha: f32) -> Color {
        Color::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        )
    }
}

/// Returned by [`hex_to_rgb`] when the input is not `#RRGGBB`.
pub const DEFAULT_RGB: Rgb = Rgb::new(255, 107, 107);

pub const DEFAULT_CUSTOM_COLORS: [Rgb; 3] = [
    Rgb::new(0xFF, 0x6B, 0x6B),
    Rgb::new(0x4E, 0xCD, 0xC4),
    Rgb::new(0x45, 0xB7, 0xD1),
];

pub const MAX_CUSTOM_COLORS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Rainbow,
    Custom,
    Gradient,
    Monochrome,
    /// Any unrecognized mode name.
    Fallback,
}

impl ColorMode {
    pub const VALUES: [ColorMode; 4] = [
        ColorMode::Rainbow,
        ColorMode::Custom,
        ColorMode::Gradient,
        ColorMode::Monochrome,
    ];

    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "rainbow" => ColorMode::Rainbow,
            "custom" => ColorMode::Custom,
            "gradient" => ColorMode::Gradient,
            "monochrome" | "mono" => ColorMode::Monochrome,
            _ => ColorMode::Fallback,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorMode::Rainbow => "rainbow",
            ColorMode::Custom => "custom",
            ColorMode::Gradient => "gradient",
            ColorMode::Monochrome => "monochrome",
            ColorMode::Fallback => "default",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::VALUES
            .iter()
            .position(|mode| *mode == self)
            .map(|index| index + 1)
            .unwrap_or(0);
        Self::VALUES[index % Self::VALUES.len()]
    }
}

pub fn parse_hex(hex: &str) -> Option<Rgb> {
    let digits = hex.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

pub fn hex_to_rgb(hex: &str) -> Rgb {
    parse_hex(hex).unwrap_or(DEFAULT_RGB)
}

/// Color for position `index` of `total` at the given intensity.
///
/// Total over its whole domain: intensity is clamped to [0, 1], hue wraps
/// modulo 360, a non-positive `total` reads as position 0, and custom or
/// gradient lookups outside the color set resolve to the first color.
pub fn color_at(index: f32, total: f32, intensity: f32, mode: ColorMode, colors: &[Rgb]) -> Color {
    let ratio = if total > 0.0 && index.is_finite() {
        index / total
    } else {
        0.0
    };
    let intensity = if intensity.is_finite() {
        intensity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    match mode {
        ColorMode::Rainbow => hsl(
            360.0 * ratio,
            70.0 + 30.0 * intensity,
            50.0 + 30.0 * intensity,
            1.0,
        ),
        ColorMode::Custom => pick_custom(ratio, colors).to_color(1.0),
        ColorMode::Gradient => {
            let first = colors.first().copied().unwrap_or(DEFAULT_RGB);
            let second = colors.get(1).copied().unwrap_or(first);
            let t = ratio.clamp(0.0, 1.0);
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() / 255.0;
            Color::new(
                mix(first.r, second.r),
                mix(first.g, second.g),
                mix(first.b, second.b),
                intensity,
            )
        }
        ColorMode::Monochrome => hsl(220.0, 30.0, 50.0 + 50.0 * intensity, 1.0),
        ColorMode::Fallback => hsl(360.0 * ratio, 80.0, 60.0, 1.0),
    }
}

fn pick_custom(ratio: f32, colors: &[Rgb]) -> Rgb {
    let Some(&first) = colors.first() else {
        return DEFAULT_RGB;
    };
    let slot = (ratio * colors.len() as f32).floor();
    if slot >= 0.0 && (slot as usize) < colors.len() {
        colors[slot as usize]
    } else {
        first
    }
}

/// HSL with hue in degrees and saturation/lightness in percent.
pub fn hsl(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Color {
    let hue = hue.rem_euclid(360.0);
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = if hue < 60.0 {
        (c, x, 0.0)
    } else if hue < 120.0 {
        (x, c, 0.0)
    } else if hue < 180.0 {
        (0.0, c, x)
    } else if hue < 240.0 {
        (0.0, x, c)
    } else if hue < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    Color::new(r + m, g + m, b + m, alpha)
}

pub fn with_alpha(color: Color, alpha: f32) -> Color {
    Color::new(color.r, color.g, color.b, alpha.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn assert_color(color: Color, r: f32, g: f32, b: f32, a: f32) {
        assert!(
            close(color.r, r) && close(color.g, g) && close(color.b, b) && close(color.a, a),
            "got {color:?}, want ({r}, {g}, {b}, {a})"
        );
    }

    fn valid(color: Color) -> bool {
        [color.r, color.g, color.b, color.a]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(hex_to_rgb("#FF6B6B"), Rgb::new(255, 107, 107));
        assert_eq!(hex_to_rgb("#4ecdc4"), Rgb::new(0x4E, 0xCD, 0xC4));
        assert_eq!(hex_to_rgb("45B7D1"), Rgb::new(0x45, 0xB7, 0xD1));
    }

    #[test]
    fn malformed_hex_uses_default() {
        for input in [
            "#zzz", "", "#12345", "#1234567", "#gg0000", "#ÿÿÿ", "#+F+F+F", "-1-1-1",
        ] {
            assert_eq!(hex_to_rgb(input), DEFAULT_RGB, "{input}");
        }
        assert_eq!(DEFAULT_RGB, Rgb::new(255, 107, 107));
    }

    #[test]
    fn rainbow_follows_position_and_intensity() {
        let color = color_at(0.0, 10.0, 1.0, ColorMode::Rainbow, &[]);
        assert_color(color, 1.0, 0.6, 0.6, 1.0);
        let color = color_at(120.0, 360.0, 0.0, ColorMode::Rainbow, &[]);
        assert_color(color, 0.15, 0.85, 0.15, 1.0);
    }

    #[test]
    fn rainbow_hue_wraps_past_total() {
        let inside = color_at(30.0, 360.0, 0.5, ColorMode::Rainbow, &[]);
        let wrapped = color_at(390.0, 360.0, 0.5, ColorMode::Rainbow, &[]);
        assert_color(wrapped, inside.r, inside.g, inside.b, inside.a);
    }

    #[test]
    fn custom_picks_bucket_and_clamps_out_of_range() {
        let colors = DEFAULT_CUSTOM_COLORS;
        let first = colors[0].to_color(1.0);
        let third = colors[2].to_color(1.0);
        let picked = color_at(9.0, 10.0, 0.3, ColorMode::Custom, &colors);
        assert_color(picked, third.r, third.g, third.b, 1.0);
        for index in [10.0, 25.0, -1.0] {
            let picked = color_at(index, 10.0, 0.3, ColorMode::Custom, &colors);
            assert_color(picked, first.r, first.g, first.b, 1.0);
        }
    }

    #[test]
    fn gradient_interpolates_with_intensity_alpha() {
        let colors = [Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)];
        let mid = color_at(5.0, 10.0, 0.25, ColorMode::Gradient, &colors);
        assert_color(mid, 128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0, 0.25);
        let past_end = color_at(20.0, 10.0, 2.0, ColorMode::Gradient, &colors);
        assert_color(past_end, 1.0, 1.0, 1.0, 1.0);
    }

    #[test]
    fn monochrome_and_fallback_formulas() {
        let dark = color_at(3.0, 10.0, 0.0, ColorMode::Monochrome, &[]);
        let expected = hsl(220.0, 30.0, 50.0, 1.0);
        assert_color(dark, expected.r, expected.g, expected.b, 1.0);
        let bright = color_at(3.0, 10.0, 1.0, ColorMode::Monochrome, &[]);
        assert_color(bright, 1.0, 1.0, 1.0, 1.0);

        let fallback = color_at(0.0, 10.0, 1.0, ColorMode::from_name("neon"), &[]);
        let expected = hsl(0.0, 80.0, 60.0, 1.0);
        assert_color(fallback, expected.r, expected.g, expected.b, 1.0);
    }

    #[test]
    fn out_of_domain_inputs_stay_valid() {
        let colors = DEFAULT_CUSTOM_COLORS;
        let indices = [-500.0, -1.0, 0.0, 255.5, 1e6, f32::NAN];
        let totals = [0.0, -3.0, 1.0, 256.0];
        let intensities = [-2.0, 0.0, 0.5, 1.0, 7.0, f32::INFINITY];
        for mode in ColorMode::VALUES.into_iter().chain([ColorMode::Fallback]) {
            for index in indices {
                for total in totals {
                    for intensity in intensities {
                        let color = color_at(index, total, intensity, mode, &colors);
                        assert!(valid(color), "{mode:?} {index} {total} {intensity}: {color:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn empty_color_set_uses_default() {
        let expected = DEFAULT_RGB.to_color(1.0);
        let color = color_at(1.0, 2.0, 1.0, ColorMode::Custom, &[]);
        assert_color(color, expected.r, expected.g, expected.b, 1.0);
    }

    #[test]
    fn mode_cycle_skips_fallback() {
        assert_eq!(ColorMode::Monochrome.next(), ColorMode::Rainbow);
        assert_eq!(ColorMode::Fallback.next(), ColorMode::Rainbow);
        assert_eq!(ColorMode::Rainbow.next(), ColorMode::Custom);
    }
}
