mod bars;
mod lines;
mod particle_field;
mod radial;

use macroquad::prelude::{Color, Vec2, vec2};

use crate::{canvas::Canvas, controls::Controls, palette, particles::ParticleField};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualMode {
    Bars,
    MirroredBars,
    CenteredBars,
    RadialBars,
    WaveBars,
    StackedBars,
    CircularSpokes,
    Waveform,
    Particles,
    Spiral,
}

impl VisualMode {
    pub const VALUES: [VisualMode; 10] = [
        VisualMode::Bars,
        VisualMode::MirroredBars,
        VisualMode::CenteredBars,
        VisualMode::RadialBars,
        VisualMode::WaveBars,
        VisualMode::StackedBars,
        VisualMode::CircularSpokes,
        VisualMode::Waveform,
        VisualMode::Particles,
        VisualMode::Spiral,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::VALUES.into_iter().find(|mode| mode.label() == name)
    }

    /// Unknown names select mirrored bars.
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or(VisualMode::MirroredBars)
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisualMode::Bars => "bars",
            VisualMode::MirroredBars => "bars_mirror",
            VisualMode::CenteredBars => "bars_center",
            VisualMode::RadialBars => "radial",
            VisualMode::WaveBars => "wave_bars",
            VisualMode::StackedBars => "stacked",
            VisualMode::CircularSpokes => "circle",
            VisualMode::Waveform => "waveform",
            VisualMode::Particles => "particles",
            VisualMode::Spiral => "spiral",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::VALUES
            .iter()
            .position(|mode| *mode == self)
            .unwrap_or(0);
        Self::VALUES[(index + 1) % Self::VALUES.len()]
    }

    pub fn previous(self) -> Self {
        let index = Self::VALUES
            .iter()
            .position(|mode| *mode == self)
            .unwrap_or(0);
        Self::VALUES[(index + Self::VALUES.len() - 1) % Self::VALUES.len()]
    }
}

/// Per-frame inputs shared by every renderer.
pub struct Frame<'a> {
    pub size: Vec2,
    pub controls: &'a Controls,
    pub time: f32,
}

impl<'a> Frame<'a> {
    pub fn new(size: Vec2, controls: &'a Controls, time: f32) -> Self {
        Self {
            size,
            controls,
            time,
        }
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.size.x * 0.5, self.size.y * 0.5)
    }

    /// Requested band count. Layout pitch, angles and color totals divide by
    /// this even when the sampler hands back fewer bands.
    pub fn band_count(&self) -> usize {
        self.controls.bar_count.max(1)
    }

    pub fn min_side(&self) -> f32 {
        self.size.x.min(self.size.y)
    }

    pub fn color(&self, index: f32, total: f32, intensity: f32) -> Color {
        palette::color_at(
            index,
            total,
            intensity,
            self.controls.color_mode,
            &self.controls.custom_colors,
        )
    }
}

pub fn render<C: Canvas>(
    mode: VisualMode,
    canvas: &mut C,
    frame: &Frame,
    bands: &[f32],
    particles: &mut ParticleField,
) {
    if bands.is_empty() {
        return;
    }
    match mode {
        VisualMode::Bars => bars::linear(canvas, frame, bands),
        VisualMode::MirroredBars => bars::mirrored(canvas, frame, bands),
        VisualMode::CenteredBars => bars::centered(canvas, frame, bands),
        VisualMode::RadialBars => radial::radial_bars(canvas, frame, bands),
        VisualMode::WaveBars => bars::wave(canvas, frame, bands),
        VisualMode::StackedBars => bars::stacked(canvas, frame, bands),
        VisualMode::CircularSpokes => radial::circular_spokes(canvas, frame, bands),
        VisualMode::Waveform => lines::waveform(canvas, frame, bands),
        VisualMode::Particles => particle_field::draw(canvas, frame, bands, particles),
        VisualMode::Spiral => lines::spiral(canvas, frame, bands),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for mode in VisualMode::VALUES {
            assert_eq!(VisualMode::from_name(mode.label()), Some(mode));
        }
        assert_eq!(VisualMode::from_name(" Spiral "), Some(VisualMode::Spiral));
    }

    #[test]
    fn unknown_name_falls_back_to_mirrored_bars() {
        assert_eq!(
            VisualMode::from_name_or_default("kaleidoscope"),
            VisualMode::MirroredBars
        );
    }

    #[test]
    fn cycling_visits_every_mode() {
        let mut mode = VisualMode::Bars;
        for _ in 0..VisualMode::VALUES.len() {
            assert_eq!(mode.next().previous(), mode);
            mode = mode.next();
        }
        assert_eq!(mode, VisualMode::Bars);
    }
}
