use std::f32::consts::TAU;

use macroquad::prelude::{Vec2, vec2};

use super::Frame;
use crate::{canvas::Canvas, palette::with_alpha};

const RADIAL_INNER: f32 = 0.15;
const SPOKE_BASE: f32 = 0.2;
const SPOKE_REACH: f32 = 0.3;
const FADED_ALPHA: f32 = 0.2;
const STROKE_WIDTH: f32 = 2.0;

fn direction(index: usize, count: usize) -> Vec2 {
    let angle = index as f32 / count as f32 * TAU;
    vec2(angle.cos(), angle.sin())
}

fn reach(frame: &Frame, value: f32) -> f32 {
    value / 255.0 * SPOKE_REACH * frame.min_side() * frame.controls.sensitivity
}

pub fn radial_bars<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let center = frame.center();
    let inner = RADIAL_INNER * frame.min_side();
    let width = STROKE_WIDTH * frame.controls.bar_thickness;
    let count = frame.band_count();
    for (index, &value) in bands.iter().enumerate() {
        let dir = direction(index, count);
        let color = frame.color(index as f32, count as f32, value / 255.0);
        canvas.gradient_line(
            center + dir * inner,
            center + dir * (inner + reach(frame, value)),
            width,
            color,
            with_alpha(color, color.a * FADED_ALPHA),
        );
    }
}

pub fn circular_spokes<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let center = frame.center();
    let base = SPOKE_BASE * frame.min_side();
    let width = STROKE_WIDTH * frame.controls.bar_thickness;
    let count = frame.band_count();
    for (index, &value) in bands.iter().enumerate() {
        let dir = direction(index, count);
        let color = frame.color(index as f32, count as f32, value / 255.0);
        canvas.line(
            center + dir * base,
            center + dir * (base + reach(frame, value)),
            width,
            color,
        );
    }
}
