use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::{imageops, RgbaImage};
use tracing::{info, warn};

use crate::bbox::{content_bbox, BoundingBox};
use crate::debug::DebugRenderer;
use crate::gif::decoder::decode_frames;
use crate::sample::{relocate_samples, SampleConfig, SampleReport};

/// Parameters for the extraction pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// How many stills go into `sample/` and the first index taken.
    pub samples: SampleConfig,
    /// Draw the computed crop box on the debug animation.
    pub overlay: bool,
    /// Font for frame-index labels on the debug animation, or None for no
    /// labels.
    pub font_path: Option<PathBuf>,
}

/// Summary of one extracted source file.
#[derive(Debug)]
pub struct ExtractReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub frame_count: u32,
    pub bbox: Option<BoundingBox>,
    pub samples: SampleReport,
}

/// Crop a frame to the inclusive box, or return it unchanged when no box
/// exists (an all-background sequence is exported at full size).
pub fn crop_to_box(image: &RgbaImage, bbox: Option<&BoundingBox>) -> RgbaImage {
    match bbox {
        Some(b) => {
            imageops::crop_imm(image, b.min_x, b.min_y, b.width(), b.height()).to_image()
        }
        None => image.clone(),
    }
}

/// Process every `*.gif` directly under `dir`, in name order.
///
/// A decode failure aborts the run; sample misses inside one file do not.
pub fn extract_dir(dir: &Path, config: &ExtractConfig) -> Result<Vec<ExtractReport>> {
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }

    let inputs = gif_inputs(dir)?;
    if inputs.is_empty() {
        warn!(?dir, "no gif files found");
    }

    inputs.iter().map(|p| extract_file(p, config)).collect()
}

/// Explode one animated GIF into cropped, numbered stills.
///
/// Creates a folder named after the file beside it, writes `debug.gif`
/// (the uncropped sequence), then `0.png, 1.png, ...` cropped to the shared
/// content box, and finally relocates the sampled subset into `sample/`.
pub fn extract_file(input: &Path, config: &ExtractConfig) -> Result<ExtractReport> {
    let output_dir = output_dir_for(input)?;
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    info!(?input, ?output_dir, "extracting frames");

    let frames = decode_frames(input)?;
    let bbox = content_bbox(frames.iter().map(|f| &f.image));
    match bbox {
        Some(b) => info!(
            min_x = b.min_x,
            min_y = b.min_y,
            max_x = b.max_x,
            max_y = b.max_y,
            "content bounding box"
        ),
        None => warn!(?input, "no non-background pixels, exporting uncropped"),
    }

    let renderer = DebugRenderer::new(config.font_path.as_deref());
    let overlay = if config.overlay { bbox } else { None };
    renderer.write_animation(&frames, overlay.as_ref(), &output_dir.join("debug.gif"))?;

    for frame in &frames {
        let still = crop_to_box(&frame.image, bbox.as_ref());
        let path = output_dir.join(format!("{}.png", frame.index));
        still
            .save(&path)
            .with_context(|| format!("failed to save {}", path.display()))?;
    }

    let samples = relocate_samples(&output_dir, frames.len() as u32, &config.samples)?;

    info!(
        ?input,
        frame_count = frames.len(),
        sampled = samples.moved,
        "extraction complete"
    );

    Ok(ExtractReport {
        input: input.to_path_buf(),
        output_dir,
        frame_count: frames.len() as u32,
        bbox,
        samples,
    })
}

/// The per-source output folder: the input path with its extension dropped.
fn output_dir_for(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("input has no file name: {}", input.display()))?;
    Ok(input.with_file_name(stem))
}

fn gif_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read entry of {}", dir.display()))?;
        let path = entry.path();
        let is_gif = path.is_file()
            && path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
        if is_gif {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}
