//! Decoding of the local preview shown before submission.

use crate::error::IntakeRejection;
use crate::intake::ImageFile;
use image::GenericImageView;

/// Width the preview is displayed at, in logical pixels.
pub const PREVIEW_WIDTH: u32 = 500;

/// Tallest preview ever decoded. The GUI lowers it to the GPU texture limit.
pub const PREVIEW_MAX_HEIGHT: u32 = 8192;

/// RGBA pixels of a preview, bounded on both sides.
#[derive(Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PreviewImage({}x{})", self.width, self.height)
    }
}

impl PreviewImage {
    /// Size when drawn at `width`, keeping the aspect ratio.
    pub fn display_size(&self, width: f32) -> [f32; 2] {
        if self.width == 0 {
            return [width, 0.0];
        }
        [width, width * self.height as f32 / self.width as f32]
    }
}

/// Decodes the image, downscaling it to fit `max_width` x `max_height`.
///
/// The aspect ratio is kept, so a tall image may end up narrower than
/// `max_width`. Images already within bounds are never upscaled.
pub fn decode_preview(
    file: &ImageFile,
    max_width: u32,
    max_height: u32,
) -> Result<PreviewImage, IntakeRejection> {
    let img = image::load_from_memory(&file.bytes)
        .map_err(|e| IntakeRejection::Undecodable(format!("{}: {e}", file.name)))?;
    let (w, h) = img.dimensions();
    let rgba = if w > max_width || h > max_height {
        img.thumbnail(max_width.max(1), max_height.max(1)).to_rgba8()
    } else {
        img.to_rgba8()
    };
    let (width, height) = rgba.dimensions();
    tracing::debug!("decoded preview for {}: {w}x{h} -> {width}x{height}", file.name);
    Ok(PreviewImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
