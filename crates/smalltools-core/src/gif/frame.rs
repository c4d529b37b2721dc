use image::{Delay, RgbaImage};

/// A single decoded animation frame with metadata.
pub struct Frame {
    /// The frame's RGBA image data.
    pub image: RgbaImage,
    /// Position in the source animation (0-based).
    pub index: u32,
    /// Display delay carried over from the source animation.
    pub delay: Delay,
}
