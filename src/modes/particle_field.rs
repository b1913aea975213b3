use macroquad::prelude::vec2;

use super::Frame;
use crate::{canvas::Canvas, particles::ParticleField, spectrum};

pub fn draw<C: Canvas>(canvas: &mut C, frame: &Frame, bands: &[f32], field: &mut ParticleField) {
    field.advance(
        bands,
        frame.controls.sensitivity,
        frame.controls.bar_thickness,
    );
    let average = spectrum::average(bands);
    for particle in field.particles() {
        let color = frame.color(particle.hue + average, 360.0, average / 255.0);
        canvas.fill_circle(vec2(particle.x, particle.y), particle.size, color);
    }
}
