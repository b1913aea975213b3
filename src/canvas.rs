use macroquad::prelude::*;
use thiserror::Error;

const GLOW_LAYERS: usize = 3;
const GRADIENT_STEPS: usize = 8;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Soft shadow drawn around filled shapes and strokes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub radius: f32,
    pub color: Color,
}

pub trait Raster {
    fn dimensions(&self) -> (u32, u32);
}

impl Raster for Texture2D {
    fn dimensions(&self) -> (u32, u32) {
        (self.width() as u32, self.height() as u32)
    }
}

/// Drawing surface used by the compositor and the mode renderers.
///
/// Coordinates are in surface pixels, y pointing down. `push_scale` applies a
/// uniform scale about `origin` to everything drawn until the matching
/// `pop_transform`.
pub trait Canvas {
    type Image: Raster;

    fn size(&self) -> Vec2;
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, thickness: f32, color: Color);
    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color);
    fn gradient_line(&mut self, from: Vec2, to: Vec2, thickness: f32, start: Color, end: Color);
    fn polyline(&mut self, points: &[Vec2], thickness: f32, color: Color);
    fn text(&mut self, text: &str, center: Vec2, font_size: u16, color: Color);
    fn draw_image(&mut self, image: &Self::Image, dest: Rect) -> Result<(), CanvasError>;
    fn set_glow(&mut self, glow: Option<Glow>);
    fn push_scale(&mut self, origin: Vec2, factor: f32);
    fn pop_transform(&mut self);
}

/// Model matrix scaling by `factor` about `origin`.
fn scale_about(origin: Vec2, factor: f32) -> Mat4 {
    let pivot = origin.extend(0.0);
    Mat4::from_translation(pivot)
        * Mat4::from_scale(vec3(factor, factor, 1.0))
        * Mat4::from_translation(-pivot)
}

/// Off-screen render target the visualizer draws into.
///
/// The target is never cleared implicitly, so partially transparent fills
/// accumulate across frames.
pub struct SurfaceCanvas {
    target: RenderTarget,
    width: u32,
    height: u32,
    pushed: usize,
    glow: Option<Glow>,
}

impl SurfaceCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let target = render_target(width.max(1), height.max(1));
        target.texture.set_filter(FilterMode::Linear);
        Self {
            target,
            width: width.max(1),
            height: height.max(1),
            pushed: 0,
            glow: None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn begin(&mut self) {
        let mut camera = Camera2D::from_display_rect(Rect::new(
            0.0,
            0.0,
            self.width as f32,
            self.height as f32,
        ));
        camera.render_target = Some(self.target.clone());
        set_camera(&camera);
        self.glow = None;
    }

    pub fn end(&mut self) {
        while self.pushed > 0 {
            self.pop_transform();
        }
        set_default_camera();
    }

    /// Draws the surface centered in `bounds`, preserving its aspect ratio.
    pub fn present(&self, bounds: Rect) {
        let scale = (bounds.w / self.width as f32).min(bounds.h / self.height as f32);
        let size = vec2(self.width as f32 * scale, self.height as f32 * scale);
        let x = bounds.x + (bounds.w - size.x) * 0.5;
        let y = bounds.y + (bounds.h - size.y) * 0.5;
        draw_texture_ex(
            &self.target.texture,
            x,
            y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(size),
                // render targets come back upside down under a y-down camera
                flip_y: true,
                ..Default::default()
            },
        );
    }

    pub fn read_pixels(&self) -> Image {
        self.target.texture.get_texture_data()
    }

    fn glow_layers(&self) -> Vec<(f32, Color)> {
        let Some(glow) = self.glow else {
            return Vec::new();
        };
        (1..=GLOW_LAYERS)
            .rev()
            .map(|layer| {
                let spread = glow.radius * layer as f32 / GLOW_LAYERS as f32;
                let mut color = glow.color;
                color.a *= 0.12;
                (spread, color)
            })
            .collect()
    }
}

impl Canvas for SurfaceCanvas {
    type Image = Texture2D;

    fn size(&self) -> Vec2 {
        vec2(self.width as f32, self.height as f32)
    }

    fn clear(&mut self, color: Color) {
        clear_background(color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        for (spread, glow) in self.glow_layers() {
            draw_rectangle(
                rect.x - spread,
                rect.y - spread,
                rect.w + spread * 2.0,
                rect.h + spread * 2.0,
                glow,
            );
        }
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        for (spread, glow) in self.glow_layers() {
            draw_circle(center.x, center.y, radius + spread, glow);
        }
        draw_circle(center.x, center.y, radius, color);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, thickness: f32, color: Color) {
        draw_circle_lines(center.x, center.y, radius, thickness, color);
    }

    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) {
        for (spread, glow) in self.glow_layers() {
            draw_line(from.x, from.y, to.x, to.y, thickness + spread * 2.0, glow);
        }
        draw_line(from.x, from.y, to.x, to.y, thickness, color);
    }

    fn gradient_line(&mut self, from: Vec2, to: Vec2, thickness: f32, start: Color, end: Color) {
        for step in 0..GRADIENT_STEPS {
            let t0 = step as f32 / GRADIENT_STEPS as f32;
            let t1 = (step + 1) as f32 / GRADIENT_STEPS as f32;
            let p0 = from.lerp(to, t0);
            let p1 = from.lerp(to, t1);
            let mid = (t0 + t1) * 0.5;
            let color = Color::new(
                start.r + (end.r - start.r) * mid,
                start.g + (end.g - start.g) * mid,
                start.b + (end.b - start.b) * mid,
                start.a + (end.a - start.a) * mid,
            );
            draw_line(p0.x, p0.y, p1.x, p1.y, thickness, color);
        }
    }

    fn polyline(&mut self, points: &[Vec2], thickness: f32, color: Color) {
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            draw_line(a.x, a.y, b.x, b.y, thickness, color);
        }
    }

    fn text(&mut self, text: &str, center: Vec2, font_size: u16, color: Color) {
        let measure = measure_text(text, None, font_size, 1.0);
        draw_text_ex(
            text,
            center.x - measure.width * 0.5,
            center.y + measure.height * 0.5,
            TextParams {
                font_size,
                color,
                ..Default::default()
            },
        );
    }

    fn draw_image(&mut self, image: &Texture2D, dest: Rect) -> Result<(), CanvasError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyImage { width, height });
        }
        draw_texture_ex(
            image,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.glow = glow;
    }

    fn push_scale(&mut self, origin: Vec2, factor: f32) {
        // Only touched from the frame loop, between begin and end.
        let gl = unsafe { get_internal_gl() };
        gl.quad_gl.push_model_matrix(scale_about(origin, factor));
        self.pushed += 1;
    }

    fn pop_transform(&mut self) {
        if self.pushed == 0 {
            return;
        }
        let gl = unsafe { get_internal_gl() };
        gl.quad_gl.pop_model_matrix();
        self.pushed -= 1;
    }
}

#[cfg(test)]
pub mod trace {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum DrawCall {
        Clear(Color),
        FillRect {
            rect: Rect,
            color: Color,
            glow: Option<Glow>,
        },
        FillCircle {
            center: Vec2,
            radius: f32,
            color: Color,
        },
        StrokeCircle {
            center: Vec2,
            radius: f32,
            color: Color,
        },
        Line {
            from: Vec2,
            to: Vec2,
            color: Color,
            glow: Option<Glow>,
        },
        GradientLine {
            from: Vec2,
            to: Vec2,
            start: Color,
            end: Color,
        },
        Polyline {
            points: Vec<Vec2>,
            color: Color,
        },
        Text(String),
        Image(Rect),
        PushScale {
            origin: Vec2,
            factor: f32,
        },
        PopTransform,
    }

    pub struct TraceImage {
        pub width: u32,
        pub height: u32,
    }

    impl Raster for TraceImage {
        fn dimensions(&self) -> (u32, u32) {
            (self.width, self.height)
        }
    }

    /// Records every call instead of drawing, in surface coordinates.
    pub struct TraceCanvas {
        size: Vec2,
        glow: Option<Glow>,
        pub calls: Vec<DrawCall>,
        pub fail_images: bool,
    }

    impl TraceCanvas {
        pub fn new(width: f32, height: f32) -> Self {
            Self {
                size: vec2(width, height),
                glow: None,
                calls: Vec::new(),
                fail_images: false,
            }
        }

        pub fn rects(&self) -> Vec<Rect> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    DrawCall::FillRect { rect, .. } => Some(*rect),
                    _ => None,
                })
                .collect()
        }

        pub fn count(&self, matches: impl Fn(&DrawCall) -> bool) -> usize {
            self.calls.iter().filter(|call| matches(call)).count()
        }
    }

    impl Canvas for TraceCanvas {
        type Image = TraceImage;

        fn size(&self) -> Vec2 {
            self.size
        }

        fn clear(&mut self, color: Color) {
            self.calls.push(DrawCall::Clear(color));
        }

        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.calls.push(DrawCall::FillRect {
                rect,
                color,
                glow: self.glow,
            });
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.calls.push(DrawCall::FillCircle {
                center,
                radius,
                color,
            });
        }

        fn stroke_circle(&mut self, center: Vec2, radius: f32, _thickness: f32, color: Color) {
            self.calls.push(DrawCall::StrokeCircle {
                center,
                radius,
                color,
            });
        }

        fn line(&mut self, from: Vec2, to: Vec2, _thickness: f32, color: Color) {
            self.calls.push(DrawCall::Line {
                from,
                to,
                color,
                glow: self.glow,
            });
        }

        fn gradient_line(&mut self, from: Vec2, to: Vec2, _thickness: f32, start: Color, end: Color) {
            self.calls.push(DrawCall::GradientLine {
                from,
                to,
                start,
                end,
            });
        }

        fn polyline(&mut self, points: &[Vec2], _thickness: f32, color: Color) {
            self.calls.push(DrawCall::Polyline {
                points: points.to_vec(),
                color,
            });
        }

        fn text(&mut self, text: &str, _center: Vec2, _font_size: u16, _color: Color) {
            self.calls.push(DrawCall::Text(text.to_string()));
        }

        fn draw_image(&mut self, image: &TraceImage, dest: Rect) -> Result<(), CanvasError> {
            if self.fail_images || image.width == 0 || image.height == 0 {
                return Err(CanvasError::EmptyImage {
                    width: image.width,
                    height: image.height,
                });
            }
            self.calls.push(DrawCall::Image(dest));
            Ok(())
        }

        fn set_glow(&mut self, glow: Option<Glow>) {
            self.glow = glow;
        }

        fn push_scale(&mut self, origin: Vec2, factor: f32) {
            self.calls.push(DrawCall::PushScale { origin, factor });
        }

        fn pop_transform(&mut self) {
            self.calls.push(DrawCall::PopTransform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(matrix: Mat4, point: Vec2) -> Vec2 {
        matrix.transform_point3(point.extend(0.0)).truncate()
    }

    #[test]
    fn scale_about_center_keeps_center_fixed() {
        let center = vec2(400.0, 300.0);
        let matrix = scale_about(center, 1.5);
        assert_eq!(apply(matrix, center), center);
        assert_eq!(apply(matrix, vec2(0.0, 0.0)), vec2(-200.0, -150.0));
        assert_eq!(apply(matrix, vec2(410.0, 300.0)), vec2(415.0, 300.0));
    }

    #[test]
    fn nested_scales_compose() {
        let origin = vec2(100.0, 100.0);
        let matrix = scale_about(origin, 2.0) * scale_about(origin, 0.5);
        let point = apply(matrix, vec2(30.0, 70.0));
        assert!((point - vec2(30.0, 70.0)).length() < 1e-4);
    }

    #[test]
    fn scale_leaves_depth_alone() {
        let matrix = scale_about(vec2(0.0, 0.0), 2.0);
        let point = matrix.transform_point3(vec3(1.0, 2.0, 5.0));
        assert_eq!(point, vec3(2.0, 4.0, 5.0));
    }
}
