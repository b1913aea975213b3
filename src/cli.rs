//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use crate::{
    capture::{CaptureConfig, CaptureFormat, resolve_format},
    controls::Controls,
    modes::VisualMode,
    palette::{ColorMode, Rgb, hex_to_rgb, parse_hex},
    surface::AspectRatio,
};

const DEFAULT_HEX: &str = "#FF6B6B";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "spectrum-canvas")]
#[command(about = "Real-time audio spectrum visualizer", long_about = None)]
pub struct Args {
    /// WAV file to play and visualize (synthetic spectrum when omitted)
    #[arg(long, value_name = "WAV")]
    pub audio: Option<PathBuf>,

    /// Background image drawn behind the visualization (png or jpeg)
    #[arg(long, value_name = "IMAGE")]
    pub background: Option<PathBuf>,

    /// Visual mode: bars, bars_mirror, bars_center, radial, wave_bars,
    /// stacked, circle, waveform, particles, spiral
    #[arg(long, value_name = "MODE", default_value = "bars_mirror")]
    pub mode: String,

    /// Color mode: rainbow, custom, gradient, monochrome
    #[arg(long, value_name = "MODE", default_value = "rainbow")]
    pub color_mode: String,

    /// Up to three comma-separated hex colors
    #[arg(long, value_name = "HEX,..", default_value = "#FF6B6B,#4ECDC4,#45B7D1")]
    pub colors: String,

    #[arg(long, default_value = "1.0")]
    pub scale: f32,

    #[arg(long, default_value = "1.0")]
    pub sensitivity: f32,

    #[arg(long, default_value = "1.0")]
    pub thickness: f32,

    /// Number of bands to display
    #[arg(long, value_name = "COUNT", default_value = "256")]
    pub bars: usize,

    /// Surface aspect: fullscreen, 16:9, 21:9, 4:3, 1:1, 9:16, custom
    #[arg(long, default_value = "16:9")]
    pub aspect: String,

    /// Surface width for the custom aspect (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<f32>,

    /// Surface height for the custom aspect (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<f32>,

    /// Background image opacity in [0, 1]
    #[arg(long, default_value = "0.5")]
    pub bg_opacity: f32,

    #[arg(long, default_value = "1.0")]
    pub bg_scale: f32,

    /// Start recording immediately
    #[arg(long)]
    pub record: bool,

    /// Recording container: webm or mp4 (mp4 needs ffmpeg with libx264)
    #[arg(long, default_value = "webm")]
    pub format: String,

    /// Recording frame rate: 30 or 60
    #[arg(long, default_value = "30", value_parser = parse_fps)]
    pub fps: u32,

    #[arg(long, value_name = "DIR", default_value = "recordings")]
    pub output_dir: PathBuf,
}

fn parse_fps(value: &str) -> Result<u32, String> {
    match value.trim() {
        "30" => Ok(30),
        "60" => Ok(60),
        other => Err(format!("unsupported frame rate '{other}', expected 30 or 60")),
    }
}

impl Args {
    /// Builds the initial controls, falling back on unknown names.
    pub fn controls(&self) -> Controls {
        if VisualMode::from_name(&self.mode).is_none() {
            warn!("unknown mode '{}', using bars_mirror", self.mode);
        }
        let visual_mode = VisualMode::from_name_or_default(&self.mode);
        let color_mode = ColorMode::from_name(&self.color_mode);
        if color_mode == ColorMode::Fallback {
            warn!("unknown color mode '{}', using default color", self.color_mode);
        }
        let aspect = AspectRatio::from_name(&self.aspect).unwrap_or_else(|| {
            warn!("unknown aspect '{}', using 16:9", self.aspect);
            AspectRatio::Wide16x9
        });

        Controls {
            visual_mode,
            color_mode,
            custom_colors: self.custom_colors(),
            visualizer_scale: self.scale,
            sensitivity: self.sensitivity,
            bar_thickness: self.thickness,
            bar_count: self.bars,
            aspect,
            custom_width: self.width,
            custom_height: self.height,
            background_opacity: self.bg_opacity,
            background_scale: self.bg_scale,
        }
        .sanitized()
    }

    fn custom_colors(&self) -> Vec<Rgb> {
        self.colors
            .split(',')
            .map(str::trim)
            .filter(|hex| !hex.is_empty())
            .map(|hex| {
                if parse_hex(hex).is_none() {
                    warn!("invalid color '{hex}', using {DEFAULT_HEX}");
                }
                hex_to_rgb(hex)
            })
            .collect()
    }

    pub fn requested_format(&self) -> CaptureFormat {
        CaptureFormat::from_name(&self.format).unwrap_or_else(|| {
            warn!("unknown format '{}', using webm", self.format);
            CaptureFormat::Webm
        })
    }

    /// Capture settings; mp4 degrades to webm without encoder support.
    pub fn capture_config(&self, mp4_supported: bool) -> CaptureConfig {
        let requested = self.requested_format();
        let format = resolve_format(requested, mp4_supported);
        if format != requested {
            info!("mp4 encoding unavailable, recording webm");
        }
        CaptureConfig {
            fps: self.fps,
            format,
            output_dir: self.output_dir.clone(),
            audio: self.audio.clone(),
        }
    }
}
