use std::path::{Path, PathBuf};

use log::{info, warn};
use macroquad::prelude::{FilterMode, Rect, Texture2D, Vec2};
use thiserror::Error;
use tokio::{
    runtime::Handle,
    sync::oneshot::{self, error::TryRecvError},
};

#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{width}x{height} is too large for a texture")]
    TooLarge { width: u32, height: u32 },
    #[error("background decode task was dropped")]
    Cancelled,
}

pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn decode(path: &Path) -> Result<DecodedImage, BackgroundError> {
    let image = image::open(path)
        .map_err(|source| BackgroundError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}

/// Cover-fits an image of `image` pixels to `surface`, multiplies by `scale`
/// and centers it.
pub fn placement(image: (u32, u32), surface: Vec2, scale: f32) -> Rect {
    let (width, height) = (image.0.max(1) as f32, image.1.max(1) as f32);
    let cover = (surface.x / width).max(surface.y / height) * scale;
    let size = (width * cover, height * cover);
    Rect::new(
        (surface.x - size.0) * 0.5,
        (surface.y - size.1) * 0.5,
        size.0,
        size.1,
    )
}

/// Background texture owned by the frame loop; decoding happens off-thread.
pub struct Background {
    pending: Option<oneshot::Receiver<Result<DecodedImage, BackgroundError>>>,
    texture: Option<Texture2D>,
    visible: bool,
    draw_failed: bool,
}

impl Background {
    pub fn empty() -> Self {
        Self {
            pending: None,
            texture: None,
            visible: true,
            draw_failed: false,
        }
    }

    pub fn load(&mut self, runtime: &Handle, path: PathBuf) {
        let (tx, rx) = oneshot::channel();
        info!("decoding background {}", path.display());
        runtime.spawn_blocking(move || {
            let _ = tx.send(decode(&path));
        });
        self.pending = Some(rx);
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    /// Uploads a finished decode. Call once per frame before drawing.
    pub fn poll(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(BackgroundError::Cancelled),
        };
        self.pending = None;
        match result.and_then(|image| upload(&image)) {
            Ok(texture) => {
                info!(
                    "background ready ({}x{})",
                    texture.width(),
                    texture.height()
                );
                self.texture = Some(texture);
                self.draw_failed = false;
            }
            Err(err) => warn!("background unavailable: {err}"),
        }
    }

    pub fn texture(&self) -> Option<&Texture2D> {
        self.texture.as_ref().filter(|_| self.visible)
    }

    /// Logs a draw failure the first time it happens for the current image.
    pub fn report_draw_failure(&mut self, err: &dyn std::error::Error) {
        if !self.draw_failed {
            warn!("background draw failed, using solid fill: {err}");
            self.draw_failed = true;
        }
    }
}

fn upload(image: &DecodedImage) -> Result<Texture2D, BackgroundError> {
    let too_large = || BackgroundError::TooLarge {
        width: image.width,
        height: image.height,
    };
    let width = u16::try_from(image.width).map_err(|_| too_large())?;
    let height = u16::try_from(image.height).map_err(|_| too_large())?;
    let texture = Texture2D::from_rgba8(width, height, &image.pixels);
    texture.set_filter(FilterMode::Linear);
    Ok(texture)
}
