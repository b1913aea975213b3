use log::{info, warn};

use crate::audio::{SpectrumSource, SyntheticSpectrum};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FrameStep<'a> {
    /// Draw a frame. `None` means no audio yet; show the loading indicator.
    Render(Option<&'a [u8]>),
    Idle,
}

/// Pulls one frequency buffer per frame while playback is active.
pub struct PlaybackDriver {
    source: Box<dyn SpectrumSource>,
    buffer: Vec<u8>,
    state: PlaybackState,
    synthetic: bool,
}

impl PlaybackDriver {
    pub fn new(source: Box<dyn SpectrumSource>, bins: usize) -> Self {
        Self {
            source,
            buffer: vec![0; bins],
            state: PlaybackState::Playing,
            synthetic: false,
        }
    }

    pub fn synthetic(bins: usize) -> Self {
        Self {
            synthetic: true,
            ..Self::new(Box::new(SyntheticSpectrum::new()), bins)
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn step(&mut self, time: f32) -> FrameStep<'_> {
        if self.state != PlaybackState::Playing {
            return FrameStep::Idle;
        }
        if self.source.is_finished() {
            info!("playback finished");
            self.state = PlaybackState::Stopped;
            return FrameStep::Idle;
        }
        let ready = match self.source.read(&mut self.buffer, time) {
            Ok(ready) => ready,
            Err(err) => {
                warn!("audio unavailable ({err}), switching to synthetic spectrum");
                self.source = Box::new(SyntheticSpectrum::new());
                self.synthetic = true;
                self.source.read(&mut self.buffer, time).unwrap_or(false)
            }
        };
        FrameStep::Render(ready.then_some(self.buffer.as_slice()))
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
            PlaybackState::Stopped => PlaybackState::Stopped,
        };
        self.source.set_paused(self.state == PlaybackState::Paused);
        info!("playback {:?}", self.state);
    }

    pub fn stop(&mut self) {
        self.source.set_paused(true);
        self.state = PlaybackState::Stopped;
    }
}
