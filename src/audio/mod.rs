mod analyser;
mod decode;
mod playback;
mod synthetic;

use std::path::PathBuf;

use thiserror::Error;

pub use analyser::{FFT_SIZE, SpectrumAnalyser};
pub use decode::{DecodedAudio, spawn_load};
pub use playback::PendingSpectrum;
pub use synthetic::SyntheticSpectrum;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("{0} contains no samples")]
    Empty(PathBuf),
    #[error("audio decode task was dropped")]
    DecodeCancelled,
    #[error("no default audio output device")]
    NoDevice,
    #[error("output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("building output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("starting output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("output stream reported an error")]
    StreamFailed,
}

/// Producer of one frequency buffer per frame.
pub trait SpectrumSource {
    /// Overwrites `out` with the current magnitudes. `Ok(false)` means no
    /// audio is available yet and `out` was left untouched.
    fn read(&mut self, out: &mut [u8], time: f32) -> Result<bool, AudioError>;

    fn set_paused(&mut self, _paused: bool) {}

    fn is_finished(&self) -> bool {
        false
    }
}
