use macroquad::prelude::{Color, Rect, vec2};

use crate::{
    background,
    canvas::{Canvas, CanvasError, Raster},
    controls::Controls,
    modes::{self, Frame, VisualMode},
    particles::ParticleField,
    spectrum,
};

/// Low-alpha wash painted instead of a clear when there is no background, so
/// earlier frames fade out as trails.
pub const TRAIL_FILL: Color = Color {
    r: 0.04,
    g: 0.04,
    b: 0.06,
    a: 0.1,
};

pub const FALLBACK_FILL: Color = Color {
    r: 0.04,
    g: 0.04,
    b: 0.06,
    a: 1.0,
};

const LOADING_TEXT: &str = "Load an audio file to start visualizing";
const LOADING_TEXT_COLOR: Color = Color {
    r: 0.8,
    g: 0.8,
    b: 0.85,
    a: 0.8,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rendered {
    Loading,
    Mode(VisualMode),
}

#[derive(Debug)]
pub struct FrameReport {
    pub rendered: Rendered,
    pub background_error: Option<CanvasError>,
}

pub fn render_frame<C: Canvas>(
    canvas: &mut C,
    bands: Option<&[f32]>,
    controls: &Controls,
    background: Option<&C::Image>,
    particles: &mut ParticleField,
    time: f32,
) -> FrameReport {
    let size = canvas.size();
    let full = Rect::new(0.0, 0.0, size.x, size.y);
    let frame = Frame::new(size, controls, time);

    let background_error = match background {
        Some(image) => paint_background(canvas, image, controls, full).err(),
        None => {
            canvas.fill_rect(full, TRAIL_FILL);
            None
        }
    };

    canvas.push_scale(frame.center(), controls.visualizer_scale);
    let rendered = match bands.filter(|bands| !spectrum::is_silent(bands)) {
        Some(bands) => {
            modes::render(controls.visual_mode, canvas, &frame, bands, particles);
            Rendered::Mode(controls.visual_mode)
        }
        None => {
            draw_loading(canvas, &frame);
            Rendered::Loading
        }
    };
    canvas.pop_transform();

    FrameReport {
        rendered,
        background_error,
    }
}

fn paint_background<C: Canvas>(
    canvas: &mut C,
    image: &C::Image,
    controls: &Controls,
    full: Rect,
) -> Result<(), CanvasError> {
    canvas.clear(Color::new(0.0, 0.0, 0.0, 0.0));
    let dest = background::placement(
        image.dimensions(),
        vec2(full.w, full.h),
        controls.background_scale,
    );
    if let Err(err) = canvas.draw_image(image, dest) {
        canvas.fill_rect(full, FALLBACK_FILL);
        return Err(err);
    }
    canvas.fill_rect(
        full,
        Color::new(0.0, 0.0, 0.0, 1.0 - controls.background_opacity),
    );
    Ok(())
}

fn draw_loading<C: Canvas>(canvas: &mut C, frame: &Frame) {
    let center = frame.center();
    let base = frame.min_side() * 0.1;
    let radius = base * (1.0 + 0.2 * (frame.time * 3.0).sin());
    let color = frame.color(frame.time * 50.0, 360.0, 0.5);
    canvas.stroke_circle(center, radius, 3.0, color);
    canvas.text(
        LOADING_TEXT,
        center + vec2(0.0, base * 1.2 + 30.0),
        24,
        LOADING_TEXT_COLOR,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        canvas::trace::{DrawCall, TraceCanvas, TraceImage},
        spectrum::sample_bands,
    };

    const W: f32 = 1280.0;
    const H: f32 = 720.0;

    fn inside_transform(canvas: &TraceCanvas) -> &[DrawCall] {
        let start = canvas
            .calls
            .iter()
            .position(|call| matches!(call, DrawCall::PushScale { .. }))
            .expect("scale pushed");
        let end = canvas
            .calls
            .iter()
            .rposition(|call| matches!(call, DrawCall::PopTransform))
            .expect("scale popped");
        &canvas.calls[start + 1..end]
    }

    fn render(
        canvas: &mut TraceCanvas,
        bands: Option<&[f32]>,
        controls: &Controls,
        background: Option<&TraceImage>,
    ) -> FrameReport {
        let mut particles = ParticleField::new();
        render_frame(canvas, bands, controls, background, &mut particles, 1.25)
    }

    #[test]
    fn full_mirrored_bars_reach_forty_percent() {
        let buffer = vec![255u8; 256];
        let bands = sample_bands(&buffer, 256);
        let controls = Controls {
            visual_mode: VisualMode::from_name_or_default("bars_mirror"),
            ..Controls::default()
        };
        let mut canvas = TraceCanvas::new(W, H);
        let report = render(&mut canvas, Some(&bands), &controls, None);
        assert_eq!(report.rendered, Rendered::Mode(VisualMode::MirroredBars));

        let heights: Vec<f32> = inside_transform(&canvas)
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillRect { rect, .. } => Some(rect.h),
                _ => None,
            })
            .collect();
        assert_eq!(heights.len(), 256 * 4);
        assert!(heights.iter().all(|&h| h == H * 0.4));
    }

    #[test]
    fn bar_count_above_buffer_length_keeps_slot_pitch() {
        let bands = sample_bands(&[200u8; 256], 512);
        assert_eq!(bands.len(), 256);
        let controls = Controls {
            visual_mode: VisualMode::Bars,
            bar_count: 512,
            ..Controls::default()
        };
        let mut canvas = TraceCanvas::new(W, H);
        render(&mut canvas, Some(&bands), &controls, None);
        let rects: Vec<Rect> = inside_transform(&canvas)
            .iter()
            .filter_map(|call| match call {
                DrawCall::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(rects.len(), 512);
        assert!(rects.iter().all(|rect| rect.w == W / 512.0));
        assert!(rects.iter().all(|rect| rect.x + rect.w <= W / 2.0));
    }

    #[test]
    fn silent_buffer_draws_only_loading_indicator() {
        let controls = Controls::default();
        for len in [1, 64, 256] {
            let bands = sample_bands(&vec![0u8; len], 128);
            let mut canvas = TraceCanvas::new(W, H);
            let report = render(&mut canvas, Some(&bands), &controls, None);
            assert_eq!(report.rendered, Rendered::Loading);
            let inner = inside_transform(&canvas);
            assert_eq!(inner.len(), 2);
            assert!(matches!(inner[0], DrawCall::StrokeCircle { .. }));
            assert!(matches!(inner[1], DrawCall::Text(_)));
        }
    }

    #[test]
    fn missing_buffer_draws_loading_indicator() {
        let controls = Controls {
            visual_mode: VisualMode::Spiral,
            ..Controls::default()
        };
        let mut canvas = TraceCanvas::new(W, H);
        let report = render(&mut canvas, None, &controls, None);
        assert_eq!(report.rendered, Rendered::Loading);
        assert_eq!(canvas.count(|call| matches!(call, DrawCall::Polyline { .. })), 0);
    }

    #[test]
    fn trail_fill_without_background_never_clears() {
        let controls = Controls::default();
        let mut canvas = TraceCanvas::new(W, H);
        render(&mut canvas, Some(&[10.0, 20.0]), &controls, None);
        assert_eq!(canvas.count(|call| matches!(call, DrawCall::Clear(_))), 0);
        assert_eq!(
            canvas.calls[0],
            DrawCall::FillRect {
                rect: Rect::new(0.0, 0.0, W, H),
                color: TRAIL_FILL,
                glow: None,
            }
        );
    }

    #[test]
    fn background_is_drawn_then_darkened() {
        let controls = Controls {
            background_opacity: 0.75,
            ..Controls::default()
        };
        let image = TraceImage {
            width: 640,
            height: 360,
        };
        let mut canvas = TraceCanvas::new(W, H);
        let report = render(&mut canvas, Some(&[10.0]), &controls, Some(&image));
        assert!(report.background_error.is_none());
        assert!(matches!(canvas.calls[0], DrawCall::Clear(_)));
        assert_eq!(canvas.calls[1], DrawCall::Image(Rect::new(0.0, 0.0, W, H)));
        let DrawCall::FillRect { rect, color, .. } = &canvas.calls[2] else {
            panic!("expected overlay, got {:?}", canvas.calls[2]);
        };
        assert_eq!(*rect, Rect::new(0.0, 0.0, W, H));
        assert!((color.a - 0.25).abs() < 1e-6);
    }

    #[test]
    fn failed_background_falls_back_to_solid_fill() {
        let controls = Controls::default();
        let image = TraceImage {
            width: 640,
            height: 360,
        };
        let mut canvas = TraceCanvas::new(W, H);
        canvas.fail_images = true;
        let report = render(&mut canvas, Some(&[10.0]), &controls, Some(&image));
        assert!(report.background_error.is_some());
        assert_eq!(report.rendered, Rendered::Mode(VisualMode::MirroredBars));
        assert!(canvas.calls.contains(&DrawCall::FillRect {
            rect: Rect::new(0.0, 0.0, W, H),
            color: FALLBACK_FILL,
            glow: None,
        }));
    }

    #[test]
    fn scale_is_applied_about_center_and_undone() {
        let controls = Controls {
            visualizer_scale: 1.5,
            ..Controls::default()
        };
        let mut canvas = TraceCanvas::new(W, H);
        render(&mut canvas, Some(&[50.0]), &controls, None);
        assert_eq!(
            canvas.calls[1],
            DrawCall::PushScale {
                origin: vec2(W / 2.0, H / 2.0),
                factor: 1.5,
            }
        );
        assert_eq!(canvas.calls.last(), Some(&DrawCall::PopTransform));
        assert_eq!(canvas.count(|call| matches!(call, DrawCall::PushScale { .. })), 1);
    }

    #[test]
    fn every_mode_renders_something() {
        let bands: Vec<f32> = (0..64).map(|i| (i * 3 + 10) as f32).collect();
        for mode in VisualMode::VALUES {
            let controls = Controls {
                visual_mode: mode,
                ..Controls::default()
            };
            let mut canvas = TraceCanvas::new(W, H);
            let mut particles = ParticleField::new();
            if mode == VisualMode::Particles {
                use rand::{SeedableRng, rngs::StdRng};
                particles.reset(W, H, 1.0, &mut StdRng::seed_from_u64(1));
            }
            let report = render_frame(&mut canvas, Some(&bands), &controls, None, &mut particles, 0.5);
            assert_eq!(report.rendered, Rendered::Mode(mode));
            assert!(!inside_transform(&canvas).is_empty(), "{mode:?} drew nothing");
        }
    }
}
