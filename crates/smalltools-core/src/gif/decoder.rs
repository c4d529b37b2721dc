use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use tracing::info;

use super::frame::Frame;

/// Decode every frame of an animated GIF into RGBA buffers.
///
/// Frames are loaded eagerly: the content bounding box is a reduction over
/// the full sequence, so nothing downstream can start before the last frame
/// is decoded anyway.
pub fn decode_frames(path: &Path) -> Result<Vec<Frame>> {
    if !path.exists() {
        bail!("input gif does not exist: {}", path.display());
    }

    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .with_context(|| format!("failed to read gif header of {}", path.display()))?;

    let raw = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("failed to decode frames of {}", path.display()))?;

    let frames: Vec<Frame> = raw
        .into_iter()
        .enumerate()
        .map(|(i, f)| {
            let delay = f.delay();
            Frame {
                image: f.into_buffer(),
                index: i as u32,
                delay,
            }
        })
        .collect();

    if frames.is_empty() {
        bail!("gif has no frames: {}", path.display());
    }

    info!(
        ?path,
        frame_count = frames.len(),
        width = frames[0].image.width(),
        height = frames[0].image.height(),
        "gif decoded"
    );

    Ok(frames)
}
