use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use cpal::{
    SampleFormat, Stream,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use log::{error, info};
use tokio::sync::oneshot::{self, error::TryRecvError};

use super::{AudioError, DecodedAudio, FFT_SIZE, SpectrumAnalyser, SpectrumSource};

pub type SharedTap = Arc<Mutex<SampleTap>>;
type SharedTrack = Arc<Mutex<Track>>;

/// Ring of the most recent samples sent to the device.
pub struct SampleTap {
    buffer: Vec<f32>,
    cursor: usize,
    filled: bool,
}

impl SampleTap {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            cursor: 0,
            filled: false,
        }
    }

    pub fn push(&mut self, value: f32) {
        if let Some(slot) = self.buffer.get_mut(self.cursor) {
            *slot = value;
        }
        self.cursor = (self.cursor + 1) % self.buffer.len();
        if self.cursor == 0 {
            self.filled = true;
        }
    }

    /// Oldest-first copy into `out`, zero-padded at the front while the ring
    /// is still filling.
    pub fn snapshot_into(&self, out: &mut [f32]) {
        out.fill(0.0);
        let (older, newer) = if self.filled {
            (&self.buffer[self.cursor..], &self.buffer[..self.cursor])
        } else {
            (&self.buffer[..0], &self.buffer[..self.cursor])
        };
        let ordered = older.iter().chain(newer);
        let available = older.len() + newer.len();
        let skip = available.saturating_sub(out.len());
        let offset = out.len().saturating_sub(available);
        for (slot, value) in out[offset..].iter_mut().zip(ordered.skip(skip)) {
            *slot = *value;
        }
    }
}

struct Track {
    samples: Vec<f32>,
    position: f64,
    step: f64,
    paused: bool,
}

impl Track {
    fn new(audio: DecodedAudio, device_rate: u32) -> Self {
        Self {
            step: audio.sample_rate as f64 / device_rate.max(1) as f64,
            samples: audio.samples,
            position: 0.0,
            paused: false,
        }
    }

    fn finished(&self) -> bool {
        self.position as usize >= self.samples.len()
    }

    fn next_sample(&mut self) -> f32 {
        if self.paused {
            return 0.0;
        }
        let Some(sample) = self.samples.get(self.position as usize).copied() else {
            return 0.0;
        };
        self.position += self.step;
        sample
    }
}

/// Plays a decoded track on the default output device.
pub struct AudioPlayback {
    _stream: Stream,
    track: SharedTrack,
    tap: SharedTap,
    failed: Arc<AtomicBool>,
}

impl AudioPlayback {
    pub fn start(audio: DecodedAudio, tap_size: usize) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device.default_output_config()?;
        let config = supported.config();
        info!(
            "audio output: {} Hz, {} ch, {:?}",
            config.sample_rate.0,
            config.channels,
            supported.sample_format()
        );

        let track = Arc::new(Mutex::new(Track::new(audio, config.sample_rate.0)));
        let tap = Arc::new(Mutex::new(SampleTap::new(tap_size)));
        let failed = Arc::new(AtomicBool::new(false));
        let shared = StreamShared {
            track: track.clone(),
            tap: tap.clone(),
            failed: failed.clone(),
        };
        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream_f32(&device, &config, shared)?,
            SampleFormat::I16 => build_stream_i16(&device, &config, shared)?,
            SampleFormat::U16 => build_stream_u16(&device, &config, shared)?,
            _ => build_stream_f32(&device, &config, shared)?,
        };
        stream.play()?;
        Ok(Self {
            _stream: stream,
            track,
            tap,
            failed,
        })
    }

    pub fn tap(&self) -> &SharedTap {
        &self.tap
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        if let Ok(mut track) = self.track.lock() {
            track.paused = paused;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.track.lock().map(|track| track.finished()).unwrap_or(true)
    }
}

struct StreamShared {
    track: SharedTrack,
    tap: SharedTap,
    failed: Arc<AtomicBool>,
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: StreamShared,
) -> Result<Stream, AudioError> {
    let channels = config.channels as usize;
    let failed = shared.failed.clone();
    let stream = device.build_output_stream(
        config,
        move |output: &mut [f32], _| {
            fill_output_buffer(output, channels, &shared, |sample| sample);
        },
        move |err| report_stream_error(&failed, err),
        None,
    )?;
    Ok(stream)
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: StreamShared,
) -> Result<Stream, AudioError> {
    let channels = config.channels as usize;
    let failed = shared.failed.clone();
    let stream = device.build_output_stream(
        config,
        move |output: &mut [i16], _| {
            fill_output_buffer(output, channels, &shared, |sample| {
                (sample * i16::MAX as f32) as i16
            });
        },
        move |err| report_stream_error(&failed, err),
        None,
    )?;
    Ok(stream)
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: StreamShared,
) -> Result<Stream, AudioError> {
    let channels = config.channels as usize;
    let failed = shared.failed.clone();
    let stream = device.build_output_stream(
        config,
        move |output: &mut [u16], _| {
            fill_output_buffer(output, channels, &shared, |sample| {
                let scaled = (sample * 0.5 + 0.5).clamp(0.0, 1.0);
                (scaled * u16::MAX as f32) as u16
            });
        },
        move |err| report_stream_error(&failed, err),
        None,
    )?;
    Ok(stream)
}

fn report_stream_error(failed: &AtomicBool, err: cpal::StreamError) {
    if !failed.swap(true, Ordering::Relaxed) {
        error!("audio stream error: {err}");
    }
}

fn fill_output_buffer<T, F>(output: &mut [T], channels: usize, shared: &StreamShared, mut convert: F)
where
    F: FnMut(f32) -> T,
    T: Copy,
{
    let (Ok(mut track), Ok(mut tap)) = (shared.track.lock(), shared.tap.lock()) else {
        return;
    };
    for frame in output.chunks_mut(channels.max(1)) {
        let sample = track.next_sample().clamp(-1.0, 1.0);
        tap.push(sample);
        let value = convert(sample);
        for channel in frame {
            *channel = value;
        }
    }
}

/// Spectrum of whatever the output device is currently playing.
pub struct LiveSpectrum {
    playback: AudioPlayback,
    analyser: SpectrumAnalyser,
    window: Vec<f32>,
}

impl LiveSpectrum {
    pub fn new(playback: AudioPlayback) -> Self {
        Self {
            playback,
            analyser: SpectrumAnalyser::new(FFT_SIZE),
            window: vec![0.0; FFT_SIZE],
        }
    }
}

impl SpectrumSource for LiveSpectrum {
    fn read(&mut self, out: &mut [u8], _time: f32) -> Result<bool, AudioError> {
        if self.playback.has_failed() {
            return Err(AudioError::StreamFailed);
        }
        if let Ok(tap) = self.playback.tap().lock() {
            tap.snapshot_into(&mut self.window);
        }
        self.analyser.process(&self.window, out);
        Ok(true)
    }

    fn set_paused(&mut self, paused: bool) {
        self.playback.set_paused(paused);
    }

    fn is_finished(&self) -> bool {
        self.playback.is_finished()
    }
}

/// Waits for a background decode, then starts playback on first use.
pub struct PendingSpectrum {
    decode: Option<oneshot::Receiver<Result<DecodedAudio, AudioError>>>,
    live: Option<LiveSpectrum>,
    paused: bool,
}

impl PendingSpectrum {
    pub fn new(decode: oneshot::Receiver<Result<DecodedAudio, AudioError>>) -> Self {
        Self {
            decode: Some(decode),
            live: None,
            paused: false,
        }
    }
}

impl SpectrumSource for PendingSpectrum {
    fn read(&mut self, out: &mut [u8], time: f32) -> Result<bool, AudioError> {
        if let Some(live) = self.live.as_mut() {
            return live.read(out, time);
        }
        let Some(rx) = self.decode.as_mut() else {
            return Err(AudioError::DecodeCancelled);
        };
        let audio = match rx.try_recv() {
            Ok(result) => result?,
            Err(TryRecvError::Empty) => return Ok(false),
            Err(TryRecvError::Closed) => return Err(AudioError::DecodeCancelled),
        };
        self.decode = None;
        let playback = AudioPlayback::start(audio, FFT_SIZE)?;
        playback.set_paused(self.paused);
        let live = self.live.insert(LiveSpectrum::new(playback));
        live.read(out, time)
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if let Some(live) = self.live.as_mut() {
            live.set_paused(paused);
        }
    }

    fn is_finished(&self) -> bool {
        self.live.as_ref().is_some_and(LiveSpectrum::is_finished)
    }
}
