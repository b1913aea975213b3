use crate::{
    modes::VisualMode,
    palette::{ColorMode, DEFAULT_CUSTOM_COLORS, MAX_CUSTOM_COLORS, Rgb},
    particles::ParticleField,
    surface::AspectRatio,
};

pub const MIN_BAR_COUNT: usize = 8;
pub const MAX_BAR_COUNT: usize = 1024;

/// Everything the caller can tune. Read-only while a frame renders; the
/// caller swaps in a new value between frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub visual_mode: VisualMode,
    pub color_mode: ColorMode,
    pub custom_colors: Vec<Rgb>,
    pub visualizer_scale: f32,
    pub sensitivity: f32,
    pub bar_thickness: f32,
    pub bar_count: usize,
    pub aspect: AspectRatio,
    pub custom_width: Option<f32>,
    pub custom_height: Option<f32>,
    pub background_opacity: f32,
    pub background_scale: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            visual_mode: VisualMode::MirroredBars,
            color_mode: ColorMode::Rainbow,
            custom_colors: DEFAULT_CUSTOM_COLORS.to_vec(),
            visualizer_scale: 1.0,
            sensitivity: 1.0,
            bar_thickness: 1.0,
            bar_count: 256,
            aspect: AspectRatio::Wide16x9,
            custom_width: None,
            custom_height: None,
            background_opacity: 0.5,
            background_scale: 1.0,
        }
    }
}

impl Controls {
    /// Clamps every numeric control into its documented domain.
    pub fn sanitized(mut self) -> Self {
        let positive = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        self.visualizer_scale = positive(self.visualizer_scale, 1.0).clamp(0.1, 5.0);
        self.sensitivity = positive(self.sensitivity, 1.0).clamp(0.1, 10.0);
        self.bar_thickness = positive(self.bar_thickness, 1.0).clamp(0.1, 4.0);
        self.background_scale = positive(self.background_scale, 1.0).clamp(0.1, 5.0);
        self.background_opacity = if self.background_opacity.is_finite() {
            self.background_opacity.clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.bar_count = self.bar_count.max(1);
        self.custom_colors.truncate(MAX_CUSTOM_COLORS);
        if self.custom_colors.is_empty() {
            self.custom_colors = DEFAULT_CUSTOM_COLORS.to_vec();
        }
        self
    }

    pub fn custom_size(&self) -> (Option<f32>, Option<f32>) {
        (self.custom_width, self.custom_height)
    }

    /// True when switching from `previous` to `self` must re-randomize the
    /// particle population.
    pub fn needs_particle_reset(&self, previous: &Controls) -> bool {
        if self.visual_mode != VisualMode::Particles {
            return false;
        }
        previous.visual_mode != VisualMode::Particles
            || previous.bar_count != self.bar_count
            || ParticleField::population_size(previous.visualizer_scale)
                != ParticleField::population_size(self.visualizer_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let controls = Controls::default();
        assert_eq!(controls.visual_mode, VisualMode::MirroredBars);
        assert_eq!(controls.bar_count, 256);
        assert_eq!(controls.visualizer_scale, 1.0);
        assert_eq!(controls.sensitivity, 1.0);
        assert_eq!(controls.bar_thickness, 1.0);
        assert_eq!(controls.custom_colors.len(), 3);
    }

    #[test]
    fn sanitize_clamps_out_of_domain_values() {
        let controls = Controls {
            visualizer_scale: -2.0,
            sensitivity: f32::NAN,
            bar_thickness: 0.0,
            bar_count: 0,
            background_opacity: 3.0,
            custom_colors: vec![Rgb::new(1, 2, 3); 5],
            ..Controls::default()
        }
        .sanitized();
        assert_eq!(controls.visualizer_scale, 1.0);
        assert_eq!(controls.sensitivity, 1.0);
        assert_eq!(controls.bar_thickness, 1.0);
        assert_eq!(controls.bar_count, 1);
        assert_eq!(controls.background_opacity, 1.0);
        assert_eq!(controls.custom_colors.len(), MAX_CUSTOM_COLORS);
    }

    #[test]
    fn particle_reset_on_selection_and_population_changes() {
        let bars = Controls::default();
        let particles = Controls {
            visual_mode: VisualMode::Particles,
            ..Controls::default()
        };
        assert!(particles.needs_particle_reset(&bars));
        assert!(!particles.needs_particle_reset(&particles));
        assert!(!bars.needs_particle_reset(&particles));

        let rescaled = Controls {
            visualizer_scale: 1.5,
            ..particles.clone()
        };
        assert!(rescaled.needs_particle_reset(&particles));

        let slightly = Controls {
            visualizer_scale: 1.001,
            ..particles.clone()
        };
        assert!(!slightly.needs_particle_reset(&particles));

        let more_bars = Controls {
            bar_count: 128,
            ..particles.clone()
        };
        assert!(more_bars.needs_particle_reset(&particles));
    }
}
