pub const DEFAULT_CUSTOM_SIZE: (f32, f32) = (1920.0, 1080.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AspectRatio {
    Fullscreen,
    Wide16x9,
    Ultrawide21x9,
    Standard4x3,
    Square,
    Portrait9x16,
    Custom,
}

impl AspectRatio {
    pub const VALUES: [AspectRatio; 7] = [
        AspectRatio::Fullscreen,
        AspectRatio::Wide16x9,
        AspectRatio::Ultrawide21x9,
        AspectRatio::Standard4x3,
        AspectRatio::Square,
        AspectRatio::Portrait9x16,
        AspectRatio::Custom,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fullscreen" | "full" => Some(AspectRatio::Fullscreen),
            "16:9" => Some(AspectRatio::Wide16x9),
            "21:9" => Some(AspectRatio::Ultrawide21x9),
            "4:3" => Some(AspectRatio::Standard4x3),
            "1:1" => Some(AspectRatio::Square),
            "9:16" => Some(AspectRatio::Portrait9x16),
            "custom" => Some(AspectRatio::Custom),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Fullscreen => "fullscreen",
            AspectRatio::Wide16x9 => "16:9",
            AspectRatio::Ultrawide21x9 => "21:9",
            AspectRatio::Standard4x3 => "4:3",
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Custom => "custom",
        }
    }

    /// Width over height for the fixed selections.
    pub fn ratio(&self) -> Option<f32> {
        match self {
            AspectRatio::Wide16x9 => Some(16.0 / 9.0),
            AspectRatio::Ultrawide21x9 => Some(21.0 / 9.0),
            AspectRatio::Standard4x3 => Some(4.0 / 3.0),
            AspectRatio::Square => Some(1.0),
            AspectRatio::Portrait9x16 => Some(9.0 / 16.0),
            AspectRatio::Fullscreen | AspectRatio::Custom => None,
        }
    }

    pub fn next(self) -> Self {
        let index = Self::VALUES
            .iter()
            .position(|aspect| *aspect == self)
            .unwrap_or(0);
        Self::VALUES[(index + 1) % Self::VALUES.len()]
    }
}

pub fn compute_dimensions(
    aspect: AspectRatio,
    custom_width: Option<f32>,
    custom_height: Option<f32>,
    viewport_width: f32,
    viewport_height: f32,
) -> (f32, f32) {
    match aspect {
        AspectRatio::Fullscreen => (viewport_width, viewport_height),
        AspectRatio::Custom => {
            let valid = |value: Option<f32>| value.filter(|v| v.is_finite() && *v > 0.0);
            let (width, height) = match (valid(custom_width), valid(custom_height)) {
                (Some(width), Some(height)) => (width, height),
                _ => DEFAULT_CUSTOM_SIZE,
            };
            let shrink = (viewport_width / width)
                .min(viewport_height / height)
                .min(1.0);
            (width * shrink, height * shrink)
        }
        fixed => {
            let ratio = fixed.ratio().unwrap_or(16.0 / 9.0);
            let width = viewport_width.min(viewport_height * ratio);
            (width, width / ratio)
        }
    }
}

/// Tracks the surface size and reports when the render target must be rebuilt.
pub struct SurfaceManager {
    aspect: AspectRatio,
    custom: (Option<f32>, Option<f32>),
    viewport: (f32, f32),
    size: (u32, u32),
}

impl SurfaceManager {
    pub fn new(
        aspect: AspectRatio,
        custom: (Option<f32>, Option<f32>),
        viewport: (f32, f32),
    ) -> Self {
        let mut manager = Self {
            aspect,
            custom,
            viewport,
            size: (0, 0),
        };
        manager.size = manager.target_size();
        manager
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Returns the new pixel size when the surface has to be resized.
    ///
    /// Viewport changes only matter in fullscreen mode.
    pub fn update(
        &mut self,
        aspect: AspectRatio,
        custom: (Option<f32>, Option<f32>),
        viewport: (f32, f32),
    ) -> Option<(u32, u32)> {
        let selection_changed = aspect != self.aspect || custom != self.custom;
        let viewport_changed = viewport != self.viewport && aspect == AspectRatio::Fullscreen;
        if !selection_changed && !viewport_changed {
            return None;
        }
        self.aspect = aspect;
        self.custom = custom;
        self.viewport = viewport;
        let size = self.target_size();
        if size == self.size {
            return None;
        }
        self.size = size;
        Some(size)
    }

    fn target_size(&self) -> (u32, u32) {
        let (width, height) = compute_dimensions(
            self.aspect,
            self.custom.0,
            self.custom.1,
            self.viewport.0,
            self.viewport.1,
        );
        (width.round().max(1.0) as u32, height.round().max(1.0) as u32)
    }
}
