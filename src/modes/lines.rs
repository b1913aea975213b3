use std::f32::consts::TAU;

use macroquad::prelude::{Color, Vec2, vec2};

use super::Frame;
use crate::{canvas::Canvas, spectrum};

const HUE_SPEED: f32 = 50.0;
const LINE_WIDTH: f32 = 2.0;
const SPIRAL_TURNS: f32 = 4.0;
const SPIRAL_STEP: f32 = 0.003;
const SPIRAL_PUSH: f32 = 50.0;

/// Oscilloscope-style trace. The baseline is y = 0 of the (scaled) surface,
/// so the trace hangs from the top edge.
pub fn waveform<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let step = if bands.len() > 1 {
        frame.width() / (bands.len() - 1) as f32
    } else {
        0.0
    };
    let sensitivity = frame.controls.sensitivity;
    let points: Vec<Vec2> = bands
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            vec2(
                index as f32 * step,
                value / 128.0 * sensitivity * frame.height() / 2.0,
            )
        })
        .collect();
    let color = trace_color(frame, bands);
    canvas.polyline(&points, LINE_WIDTH * frame.controls.bar_thickness, color);
}

pub fn spiral<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let center = frame.center();
    let growth = SPIRAL_STEP * frame.min_side();
    let count = frame.band_count() as f32;
    let sensitivity = frame.controls.sensitivity;
    let points: Vec<Vec2> = bands
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let angle = index as f32 / count * SPIRAL_TURNS * TAU;
            let amplitude = value / 255.0 * 3.0 * sensitivity;
            let radius = index as f32 * growth + amplitude * SPIRAL_PUSH;
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect();
    let color = trace_color(frame, bands);
    canvas.polyline(&points, LINE_WIDTH * frame.controls.bar_thickness, color);
}

fn trace_color(frame: &Frame, bands: &[f32]) -> Color {
    let level = spectrum::average(bands) / 255.0;
    frame.color(frame.time * HUE_SPEED, 360.0, level)
}
