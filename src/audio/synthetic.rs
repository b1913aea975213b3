use super::{AudioError, SpectrumSource};

/// Deterministic stand-in spectrum used when no real audio is playing.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticSpectrum;

impl SyntheticSpectrum {
    pub fn new() -> Self {
        Self
    }

    pub fn fill(out: &mut [u8], time: f32) {
        let len = out.len() as f32;
        for (index, slot) in out.iter_mut().enumerate() {
            let i = index as f32;
            let value = 128.0
                + 64.0 * (2.0 * time + 0.1 * i).sin()
                + 48.0 * (3.3 * time - 0.05 * i).sin() * (1.0 - i / len);
            *slot = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

impl SpectrumSource for SyntheticSpectrum {
    fn read(&mut self, out: &mut [u8], time: f32) -> Result<bool, AudioError> {
        Self::fill(out, time);
        Ok(true)
    }
}
