use std::fs::File;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Frame as AnimFrame, Rgba};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{info, warn};

use crate::bbox::BoundingBox;
use crate::gif::frame::Frame;

const OVERLAY_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const TEXT_SCALE: f32 = 16.0;

/// Writes the verification animation: the uncropped frame sequence, with
/// optional bounding-box and frame-index overlays.
pub struct DebugRenderer {
    font: Option<FontVec>,
}

impl DebugRenderer {
    pub fn new(font_path: Option<&Path>) -> Self {
        let font = font_path.and_then(Self::load_font);
        Self { font }
    }

    /// Encode `frames` as a looping animation at `path`, keeping the source
    /// delays so it plays back at the original speed. When `overlay` is
    /// given, the shared crop box is drawn on every frame.
    pub fn write_animation(
        &self,
        frames: &[Frame],
        overlay: Option<&BoundingBox>,
        path: &Path,
    ) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut encoder = GifEncoder::new(file);
        encoder
            .set_repeat(Repeat::Infinite)
            .context("failed to set animation repeat")?;

        let rendered = frames.iter().map(|frame| {
            let mut image = frame.image.clone();

            if let Some(bbox) = overlay {
                let rect = Rect::at(bbox.min_x as i32, bbox.min_y as i32)
                    .of_size(bbox.width(), bbox.height());
                draw_hollow_rect_mut(&mut image, rect, OVERLAY_COLOR);
            }

            if let Some(font) = &self.font {
                let scale = PxScale::from(TEXT_SCALE);
                let label = frame.index.to_string();
                draw_text_mut(&mut image, TEXT_COLOR, 4, 4, scale, font, &label);
            }

            AnimFrame::from_parts(image, 0, 0, frame.delay)
        });

        encoder
            .encode_frames(rendered)
            .with_context(|| format!("failed to encode animation {}", path.display()))?;

        info!(?path, frame_count = frames.len(), "debug animation written");
        Ok(())
    }

    fn load_font(path: &Path) -> Option<FontVec> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read font file");
                return None;
            }
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                info!(path = %path.display(), "loaded debug font");
                Some(font)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse font file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Delay, RgbaImage};

    use super::*;

    fn solid_frame(index: u32, value: u8) -> Frame {
        Frame {
            image: RgbaImage::from_pixel(6, 4, Rgba([value, value, value, 255])),
            index,
            delay: Delay::from_numer_denom_ms(100, 1),
        }
    }

    #[test]
    fn writes_a_decodable_animation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.gif");
        let frames = vec![solid_frame(0, 0), solid_frame(1, 128)];

        let renderer = DebugRenderer::new(None);
        renderer.write_animation(&frames, None, &path).unwrap();

        let decoded = crate::gif::decoder::decode_frames(&path).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].image.dimensions(), (6, 4));
    }

    #[test]
    fn missing_font_degrades_to_no_text() {
        let renderer = DebugRenderer::new(Some(Path::new("/no/such/font.ttf")));
        assert!(renderer.font.is_none());
    }
}
