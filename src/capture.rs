use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    sync::mpsc,
};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use thiserror::Error;
use tokio::{runtime::Handle, task::JoinHandle};

pub const DEFAULT_BASE_NAME: &str = "visualizer";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture io: {0}")]
    Io(#[from] io::Error),
    #[error("encoding frame: {0}")]
    Encode(#[from] image::ImageError),
    #[error("frame {index} has {len} bytes, expected {expected}")]
    FrameSize {
        index: usize,
        len: usize,
        expected: usize,
    },
    #[error("frame writer stopped unexpectedly")]
    WriterGone,
    #[error("ffmpeg not found on PATH")]
    FfmpegMissing,
    #[error("ffmpeg exited with {0}")]
    Ffmpeg(ExitStatus),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureFormat {
    Webm,
    Mp4,
}

impl CaptureFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "webm" => Some(Self::Webm),
            "mp4" => Some(Self::Mp4),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            CaptureFormat::Webm => "webm",
            CaptureFormat::Mp4 => "mp4",
        }
    }

    fn codec_args(&self) -> [&'static str; 4] {
        match self {
            CaptureFormat::Webm => ["-c:v", "libvpx-vp9", "-c:a", "libopus"],
            CaptureFormat::Mp4 => ["-c:v", "libx264", "-c:a", "aac"],
        }
    }
}

/// MP4 only when it was asked for and the encoder is present.
pub fn resolve_format(requested: CaptureFormat, mp4_supported: bool) -> CaptureFormat {
    match requested {
        CaptureFormat::Mp4 if mp4_supported => CaptureFormat::Mp4,
        _ => CaptureFormat::Webm,
    }
}

pub fn probe_mp4_support() -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stderr(Stdio::null())
        .output()
        .map(|output| String::from_utf8_lossy(&output.stdout).contains("libx264"))
        .unwrap_or(false)
}

/// ISO-8601 with `:` and `.` replaced so the result is a portable file name.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

pub fn output_file_name(base: &str, timestamp: &str, format: CaptureFormat) -> String {
    format!("{base}_visualized_{timestamp}.{}", format.extension())
}

pub fn base_name(audio: Option<&Path>) -> String {
    audio
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string())
}

#[derive(Clone, Debug)]
pub struct CaptureConfig {
    pub fps: u32,
    pub format: CaptureFormat,
    pub output_dir: PathBuf,
    pub audio: Option<PathBuf>,
}

/// Fixed-rate gate against frame time.
#[derive(Clone, Copy, Debug)]
struct FrameThrottle {
    interval: f64,
    next_due: Option<f64>,
}

impl FrameThrottle {
    fn new(fps: u32) -> Self {
        Self {
            interval: 1.0 / fps.max(1) as f64,
            next_due: None,
        }
    }

    fn due(&mut self, now: f64) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            Some(due) => {
                let missed = ((now - due) / self.interval).floor();
                self.next_due = Some(due + (missed + 1.0) * self.interval);
                true
            }
            None => {
                self.next_due = Some(now + self.interval);
                true
            }
        }
    }
}

/// Bottom-up RGBA8 pixels as read back from the render target.
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub struct FinishedCapture {
    pub frames_dir: PathBuf,
    pub frame_count: usize,
    pub output_path: PathBuf,
    pub fps: u32,
    pub format: CaptureFormat,
    pub audio: Option<PathBuf>,
}

pub struct FrameRecorder {
    tx: mpsc::Sender<CapturedFrame>,
    writer: JoinHandle<Result<usize, CaptureError>>,
    throttle: FrameThrottle,
    frames_dir: PathBuf,
    output_path: PathBuf,
    config: CaptureConfig,
}

impl FrameRecorder {
    pub fn start(
        runtime: &Handle,
        config: CaptureConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, CaptureError> {
        let stamp = timestamp(now);
        let base = base_name(config.audio.as_deref());
        let output_path = config
            .output_dir
            .join(output_file_name(&base, &stamp, config.format));
        let frames_dir = config.output_dir.join(format!("{base}_frames_{stamp}"));
        fs::create_dir_all(&frames_dir)?;
        info!(
            "recording {} at {} fps into {}",
            config.format.extension(),
            config.fps,
            frames_dir.display()
        );

        let (tx, rx) = mpsc::channel::<CapturedFrame>();
        let dir = frames_dir.clone();
        let writer = runtime.spawn_blocking(move || {
            let mut written = 0;
            while let Ok(frame) = rx.recv() {
                write_frame(&dir, written, frame)?;
                written += 1;
            }
            Ok(written)
        });

        Ok(Self {
            tx,
            writer,
            throttle: FrameThrottle::new(config.fps),
            frames_dir,
            output_path,
            config,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Grabs and queues a frame if one is due at `time`.
    pub fn offer<F>(&mut self, time: f64, grab: F) -> Result<(), CaptureError>
    where
        F: FnOnce() -> CapturedFrame,
    {
        if !self.throttle.due(time) {
            return Ok(());
        }
        self.tx.send(grab()).map_err(|_| CaptureError::WriterGone)
    }

    /// Stops accepting frames and waits for the writer to drain.
    pub fn close(self, runtime: &Handle) -> Result<FinishedCapture, CaptureError> {
        let Self {
            tx,
            writer,
            frames_dir,
            output_path,
            config,
            ..
        } = self;
        drop(tx);
        let frame_count = runtime
            .block_on(writer)
            .map_err(|_| CaptureError::WriterGone)??;
        debug!("wrote {frame_count} frames to {}", frames_dir.display());
        Ok(FinishedCapture {
            frames_dir,
            frame_count,
            output_path,
            fps: config.fps,
            format: config.format,
            audio: config.audio,
        })
    }

    pub fn finish(self, runtime: &Handle) -> Result<PathBuf, CaptureError> {
        let finished = self.close(runtime)?;
        match mux(&finished) {
            Ok(()) => {
                fs::remove_dir_all(&finished.frames_dir)?;
                info!("saved recording to {}", finished.output_path.display());
                Ok(finished.output_path)
            }
            Err(CaptureError::FfmpegMissing) => {
                warn!(
                    "ffmpeg not found; {} frames left in {}",
                    finished.frame_count,
                    finished.frames_dir.display()
                );
                Ok(finished.frames_dir)
            }
            Err(err) => Err(err),
        }
    }
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:05}.png"))
}

fn write_frame(dir: &Path, index: usize, frame: CapturedFrame) -> Result<(), CaptureError> {
    let expected = frame.width as usize * frame.height as usize * 4;
    let len = frame.rgba.len();
    let mut image = image::RgbaImage::from_raw(frame.width, frame.height, frame.rgba).ok_or(
        CaptureError::FrameSize {
            index,
            len,
            expected,
        },
    )?;
    image::imageops::flip_vertical_in_place(&mut image);
    image.save(frame_path(dir, index))?;
    Ok(())
}

fn mux(finished: &FinishedCapture) -> Result<(), CaptureError> {
    let pattern = finished.frames_dir.join("frame_%05d.png");
    let mut command = Command::new("ffmpeg");
    command
        .args(["-hide_banner", "-loglevel", "error", "-y"])
        .arg("-framerate")
        .arg(finished.fps.to_string())
        .arg("-i")
        .arg(&pattern);
    if let Some(audio) = &finished.audio {
        command.arg("-i").arg(audio).arg("-shortest");
    }
    command
        .args(finished.format.codec_args())
        .args(["-pix_fmt", "yuv420p"])
        .arg(&finished.output_path);

    let status = match command.status() {
        Ok(status) => status,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(CaptureError::FfmpegMissing);
        }
        Err(err) => return Err(err.into()),
    };
    if status.success() {
        Ok(())
    } else {
        Err(CaptureError::Ffmpeg(status))
    }
}
