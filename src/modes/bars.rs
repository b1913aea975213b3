use macroquad::prelude::Rect;

use super::Frame;
use crate::{
    canvas::{Canvas, Glow},
    palette::with_alpha,
};

const LINEAR_GAIN: f32 = 0.8;
const MIRROR_GAIN: f32 = 0.4;
const REFLECTION_ALPHA: f32 = 0.3;
const MIRROR_GLOW_RADIUS: f32 = 10.0;
const WAVE_AMPLITUDE: f32 = 20.0;
const WAVE_HUE_SPEED: f32 = 50.0;
const STACK_SEGMENTS: usize = 5;
const STACK_ALPHA_STEP: f32 = 0.15;
const STACK_GAP: f32 = 1.0;

struct Slots {
    pitch: f32,
    bar_width: f32,
    count: f32,
}

impl Slots {
    fn new(frame: &Frame) -> Self {
        let count = frame.band_count();
        let pitch = frame.width() / count as f32;
        Self {
            pitch,
            bar_width: pitch * frame.controls.bar_thickness,
            count: count as f32,
        }
    }

    /// Left edge of the bar centered in slot `index`.
    fn x(&self, index: usize) -> f32 {
        index as f32 * self.pitch + (self.pitch - self.bar_width) * 0.5
    }
}

fn bar_height(frame: &Frame, value: f32, gain: f32) -> f32 {
    value / 255.0 * frame.height() * gain * frame.controls.sensitivity
}

pub fn linear<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let slots = Slots::new(frame);
    for (index, &value) in bands.iter().enumerate() {
        let height = bar_height(frame, value, LINEAR_GAIN);
        if height <= 0.0 {
            continue;
        }
        let x = slots.x(index);
        let color = frame.color(index as f32, slots.count, value / 255.0);
        canvas.fill_rect(
            Rect::new(x, frame.height() - height, slots.bar_width, height),
            color,
        );
        canvas.fill_rect(
            Rect::new(x, 0.0, slots.bar_width, height * 0.5),
            with_alpha(color, color.a * REFLECTION_ALPHA),
        );
    }
}

pub fn mirrored<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let slots = Slots::new(frame);
    let middle = frame.height() * 0.5;
    for _ in 0..2 {
        for (index, &value) in bands.iter().enumerate() {
            let height = bar_height(frame, value, MIRROR_GAIN);
            if height <= 0.0 {
                continue;
            }
            let x = slots.x(index);
            let color = frame.color(index as f32, slots.count, value / 255.0);
            canvas.set_glow(Some(Glow {
                radius: MIRROR_GLOW_RADIUS,
                color,
            }));
            canvas.fill_rect(Rect::new(x, middle - height, slots.bar_width, height), color);
            canvas.fill_rect(Rect::new(x, middle, slots.bar_width, height), color);
        }
    }
    canvas.set_glow(None);
}

pub fn centered<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let slots = Slots::new(frame);
    let center_x = frame.width() * 0.5;
    let middle = frame.height() * 0.5;
    let inset = (slots.pitch - slots.bar_width) * 0.5;
    for (index, &value) in bands.iter().enumerate() {
        let height = bar_height(frame, value, LINEAR_GAIN);
        if height <= 0.0 {
            continue;
        }
        let offset = index as f32 * slots.pitch;
        let color = frame.color(index as f32, slots.count, value / 255.0);
        for x in [
            center_x + offset + inset,
            center_x - offset - slots.pitch + inset,
        ] {
            if x < 0.0 || x + slots.bar_width > frame.width() {
                continue;
            }
            canvas.fill_rect(
                Rect::new(x, middle - height * 0.5, slots.bar_width, height),
                color,
            );
        }
    }
}

pub fn wave<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let slots = Slots::new(frame);
    for (index, &value) in bands.iter().enumerate() {
        let ripple = (frame.time * 2.0 + index as f32 * 0.1).sin() * WAVE_AMPLITUDE;
        let height = (bar_height(frame, value, LINEAR_GAIN) + ripple).abs();
        let color = frame.color(
            index as f32 + frame.time * WAVE_HUE_SPEED,
            slots.count,
            value / 255.0,
        );
        canvas.fill_rect(
            Rect::new(slots.x(index), frame.height() - height, slots.bar_width, height),
            color,
        );
    }
}

pub fn stacked<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32]) {
    let slots = Slots::new(frame);
    for (index, &value) in bands.iter().enumerate() {
        let total = bar_height(frame, value, LINEAR_GAIN);
        if total <= 0.0 {
            continue;
        }
        let segment = total / STACK_SEGMENTS as f32;
        let color = frame.color(index as f32, slots.count, value / 255.0);
        for level in 0..STACK_SEGMENTS {
            let top = frame.height() - (level + 1) as f32 * segment;
            let alpha = color.a * (1.0 - STACK_ALPHA_STEP * level as f32);
            canvas.fill_rect(
                Rect::new(
                    slots.x(index),
                    top,
                    slots.bar_width,
                    (segment - STACK_GAP).max(0.0),
                ),
                with_alpha(color, alpha),
            );
        }
    }
}
