mod audio;
mod background;
mod canvas;
mod capture;
mod cli;
mod compositor;
mod controls;
mod driver;
mod modes;
mod palette;
mod particles;
mod shortcuts;
mod spectrum;
mod surface;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{debug, error, info};
use ::rand::rngs::ThreadRng;
use macroquad::{prelude::*, text::measure_text};
use tokio::runtime::{Handle, Runtime};

use audio::{PendingSpectrum, spawn_load};
use background::Background;
use canvas::{Canvas, SurfaceCanvas};
use capture::{CapturedFrame, FrameRecorder};
use compositor::render_frame;
use controls::Controls;
use driver::{FrameStep, PlaybackDriver, PlaybackState};
use modes::VisualMode;
use particles::ParticleField;
use shortcuts::{Action, ShortcutController};
use spectrum::{ANALYSIS_BINS, sample_bands};
use surface::SurfaceManager;

const SCREEN_WIDTH: f32 = 1280.0;
const SCREEN_HEIGHT: f32 = 720.0;

const BACKDROP: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};
const HUD_TEXT: Color = Color {
    r: 0.92,
    g: 0.92,
    b: 0.95,
    a: 0.85,
};
const HUD_PANEL: Color = Color {
    r: 0.02,
    g: 0.02,
    b: 0.04,
    a: 0.6,
};
const RECORDING: Color = Color {
    r: 0.95,
    g: 0.2,
    b: 0.2,
    a: 1.0,
};

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run().await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Spectrum Canvas".into(),
        fullscreen: false,
        sample_count: 1,
        window_width: SCREEN_WIDTH as i32,
        window_height: SCREEN_HEIGHT as i32,
        high_dpi: false,
        window_resizable: true,
        ..Default::default()
    }
}

async fn run() -> Result<()> {
    let args = cli::Args::parse();
    let runtime = Runtime::new().context("creating tokio runtime")?;
    let handle = runtime.handle().clone();

    let mut controls = args.controls();
    let mut surface =
        SurfaceManager::new(controls.aspect, controls.custom_size(), viewport());
    let (width, height) = surface.size();
    let mut canvas = SurfaceCanvas::new(width, height);
    info!(
        "surface {width}x{height} ({}), mode {}",
        controls.aspect.label(),
        controls.visual_mode.label()
    );

    let mut background = Background::empty();
    if let Some(path) = &args.background {
        background.load(&handle, path.clone());
    }

    let mut driver = match &args.audio {
        Some(path) => {
            let pending = PendingSpectrum::new(spawn_load(&handle, path.clone()));
            PlaybackDriver::new(Box::new(pending), ANALYSIS_BINS)
        }
        None => {
            info!("no audio file given, using synthetic spectrum");
            PlaybackDriver::synthetic(ANALYSIS_BINS)
        }
    };

    let mut rng = ::rand::rng();
    let mut particles = ParticleField::new();
    if controls.visual_mode == VisualMode::Particles {
        reset_particles(&mut particles, &canvas, &controls, &mut rng);
    }

    let keys = ShortcutController::new();
    let mut recorder = if args.record {
        start_recording(&handle, &args)
    } else {
        None
    };
    let mut show_hud = true;
    let mut showing = None;
    prevent_quit();

    'frames: loop {
        let previous = controls.clone();
        for action in keys.poll() {
            match action {
                Action::Quit => break 'frames,
                Action::TogglePause => driver.toggle_pause(),
                Action::ToggleBackground => background.toggle_visible(),
                Action::ToggleHud => show_hud = !show_hud,
                Action::ToggleRecording => {
                    recorder = match recorder.take() {
                        Some(active) => {
                            stop_recording(active, &handle);
                            None
                        }
                        None => start_recording(&handle, &args),
                    }
                }
                other => {
                    if let Some(next) = shortcuts::apply(other, &controls) {
                        controls = next;
                    }
                }
            }
        }
        if is_quit_requested() {
            break 'frames;
        }
        if controls != previous {
            debug!("controls changed: {controls:?}");
        }

        let resized = surface.update(controls.aspect, controls.custom_size(), viewport());
        if let Some((width, height)) = resized {
            canvas.resize(width, height);
            info!("surface resized to {width}x{height}");
        }
        let particles_moved = resized.is_some() && controls.visual_mode == VisualMode::Particles;
        if particles_moved || controls.needs_particle_reset(&previous) {
            reset_particles(&mut particles, &canvas, &controls, &mut rng);
        }
        background.poll();

        let time = get_time() as f32;
        if let FrameStep::Render(buffer) = driver.step(time) {
            let bands = buffer.map(|buffer| sample_bands(buffer, controls.bar_count));
            canvas.begin();
            let report = render_frame(
                &mut canvas,
                bands.as_deref(),
                &controls,
                background.texture(),
                &mut particles,
                time,
            );
            canvas.end();
            if let Some(err) = report.background_error {
                background.report_draw_failure(&err);
            }
            if showing != Some(report.rendered) {
                debug!("now showing {:?}", report.rendered);
                showing = Some(report.rendered);
            }

            let offered = recorder
                .as_mut()
                .map(|active| active.offer(get_time(), || grab_frame(&canvas)));
            if let Some(Err(err)) = offered {
                error!("recording stopped: {err}");
                recorder = None;
            }
        }

        clear_background(BACKDROP);
        canvas.present(Rect::new(0.0, 0.0, screen_width(), screen_height()));
        if show_hud {
            draw_hud(&controls, &driver, recorder.is_some(), &keys);
        }
        next_frame().await;
    }

    driver.stop();
    if let Some(active) = recorder.take() {
        stop_recording(active, &handle);
    }
    info!("bye");
    Ok(())
}

fn viewport() -> (f32, f32) {
    (screen_width(), screen_height())
}

fn reset_particles(
    particles: &mut ParticleField,
    canvas: &SurfaceCanvas,
    controls: &Controls,
    rng: &mut ThreadRng,
) {
    let size = canvas.size();
    particles.reset(size.x, size.y, controls.visualizer_scale, rng);
    info!("spawned {} particles", particles.len());
}

fn grab_frame(canvas: &SurfaceCanvas) -> CapturedFrame {
    let image = canvas.read_pixels();
    CapturedFrame {
        width: image.width as u32,
        height: image.height as u32,
        rgba: image.bytes,
    }
}

fn start_recording(handle: &Handle, args: &cli::Args) -> Option<FrameRecorder> {
    let config = args.capture_config(capture::probe_mp4_support());
    match FrameRecorder::start(handle, config, Utc::now()) {
        Ok(recorder) => {
            info!("recording to {}", recorder.output_path().display());
            Some(recorder)
        }
        Err(err) => {
            error!("could not start recording: {err}");
            None
        }
    }
}

fn stop_recording(recorder: FrameRecorder, handle: &Handle) {
    info!("finishing recording");
    match recorder.finish(handle) {
        Ok(path) => info!("recording available at {}", path.display()),
        Err(err) => error!("recording failed: {err}"),
    }
}

fn draw_hud(
    controls: &Controls,
    driver: &PlaybackDriver,
    recording: bool,
    keys: &ShortcutController,
) {
    let state = match driver.state() {
        PlaybackState::Playing => "PLAYING",
        PlaybackState::Paused => "PAUSED",
        PlaybackState::Stopped => "STOPPED",
    };
    let source = if driver.is_synthetic() {
        "SYNTHETIC"
    } else {
        "AUDIO"
    };
    let status = format!(
        "{state} ({source})\nMODE {}\nCOLOR {}\nSENSITIVITY {:.1}  SCALE {:.1}  THICKNESS {:.1}\nBARS {}  ASPECT {}  BG {:.0}%",
        controls.visual_mode.label(),
        controls.color_mode.label(),
        controls.sensitivity,
        controls.visualizer_scale,
        controls.bar_thickness,
        controls.bar_count,
        controls.aspect.label(),
        controls.background_opacity * 100.0,
    );
    let help: String = keys
        .bindings()
        .iter()
        .map(|binding| format!("{} {}", binding.label, binding.action.description()))
        .collect::<Vec<_>>()
        .join("  ");

    draw_rectangle(8.0, 8.0, 420.0, 118.0, HUD_PANEL);
    draw_text_block(18.0, 30.0, &status);
    if recording {
        draw_circle(410.0, 24.0, 7.0, RECORDING);
    }
    let measure = measure_text(&help, None, 14, 1.0);
    let y = screen_height() - 12.0;
    draw_rectangle(
        0.0,
        y - measure.height - 8.0,
        screen_width(),
        measure.height + 16.0,
        HUD_PANEL,
    );
    draw_text_ex(
        &help,
        8.0,
        y,
        TextParams {
            font_size: 14,
            color: HUD_TEXT,
            ..Default::default()
        },
    );
}

fn draw_text_block(x: f32, mut y: f32, text: &str) {
    for line in text.lines() {
        draw_text_ex(
            line,
            x,
            y,
            TextParams {
                font_size: 18,
                color: HUD_TEXT,
                ..Default::default()
            },
        );
        y += 22.0;
    }
}
