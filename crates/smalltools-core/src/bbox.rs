use image::{ImageBuffer, RgbaImage};

/// Exact RGBA value treated as "empty" when computing content bounds.
/// Anything that is not opaque white counts as content, including
/// transparent or translucent white.
pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Minimal read-only view of a pixel buffer, so the bounding-box reduction
/// is not tied to any particular imaging library's frame type.
pub trait PixelGrid {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn rgba(&self, x: u32, y: u32) -> [u8; 4];
}

impl PixelGrid for RgbaImage {
    fn width(&self) -> u32 {
        ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        ImageBuffer::height(self)
    }

    fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).0
    }
}

/// Smallest axis-aligned rectangle enclosing a set of pixels.
/// Bounds are inclusive on both axes, so a single pixel is a 1x1 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    /// The box covering exactly one pixel.
    pub fn at(x: u32, y: u32) -> BoundingBox {
        BoundingBox {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Grow the box to cover one more pixel.
    pub fn include(self, x: u32, y: u32) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(x),
            min_y: self.min_y.min(y),
            max_x: self.max_x.max(x),
            max_y: self.max_y.max(y),
        }
    }

    /// Coordinate-wise union of two boxes.
    pub fn merge(self, other: BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Inclusive pixel extent along x.
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Inclusive pixel extent along y.
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Bounding box of the non-background pixels in one frame, or `None` if the
/// frame is entirely background.
fn frame_bbox(grid: &impl PixelGrid) -> Option<BoundingBox> {
    let mut bbox: Option<BoundingBox> = None;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.rgba(x, y) == BACKGROUND {
                continue;
            }
            bbox = Some(match bbox {
                Some(b) => b.include(x, y),
                None => BoundingBox::at(x, y),
            });
        }
    }
    bbox
}

/// Shared bounding box of the non-background pixels across a frame
/// sequence: each frame's local box is folded into a running global box.
/// Returns `None` when every pixel of every frame is background.
///
/// Comparisons are exact integer equality against [`BACKGROUND`]; there is
/// no tolerance and no early exit.
pub fn content_bbox<'a, G, I>(frames: I) -> Option<BoundingBox>
where
    G: PixelGrid + 'a,
    I: IntoIterator<Item = &'a G>,
{
    let mut global: Option<BoundingBox> = None;
    for frame in frames {
        if let Some(local) = frame_bbox(frame) {
            global = Some(match global {
                Some(g) => g.merge(local),
                None => local,
            });
        }
    }
    global
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn white_image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(BACKGROUND))
    }

    #[test]
    fn all_background_has_no_box() {
        let frames = vec![white_image(8, 6), white_image(8, 6)];
        assert_eq!(content_bbox(frames.iter()), None);
    }

    #[test]
    fn single_pixel_box() {
        let mut img = white_image(10, 10);
        img.put_pixel(3, 4, Rgba([0, 0, 0, 255]));
        let frames = vec![white_image(10, 10), img];
        assert_eq!(content_bbox(frames.iter()), Some(BoundingBox::at(3, 4)));
    }

    #[test]
    fn boxes_merge_across_frames() {
        let mut a = white_image(10, 10);
        a.put_pixel(2, 7, Rgba([10, 20, 30, 255]));
        let mut b = white_image(10, 10);
        b.put_pixel(8, 1, Rgba([10, 20, 30, 255]));

        let frames = vec![a, b];
        let bbox = content_bbox(frames.iter()).unwrap();
        assert_eq!(
            bbox,
            BoundingBox {
                min_x: 2,
                min_y: 1,
                max_x: 8,
                max_y: 7,
            }
        );
        assert_eq!(bbox.width(), 7);
        assert_eq!(bbox.height(), 7);
    }

    #[test]
    fn transparent_white_is_content() {
        // Only the exact opaque-white value is background.
        let mut img = white_image(5, 5);
        img.put_pixel(1, 2, Rgba([255, 255, 255, 0]));
        assert_eq!(content_bbox([&img]), Some(BoundingBox::at(1, 2)));
    }

    #[test]
    fn include_and_merge_keep_extremes() {
        let b = BoundingBox::at(5, 5).include(2, 9).include(7, 3);
        assert_eq!(
            b,
            BoundingBox {
                min_x: 2,
                min_y: 3,
                max_x: 7,
                max_y: 9,
            }
        );

        let merged = b.merge(BoundingBox::at(0, 4));
        assert_eq!(merged.min_x, 0);
        assert_eq!(merged.max_x, 7);
    }
}
