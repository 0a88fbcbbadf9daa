use image::{GrayImage, Luma, RgbImage};
use imageproc::map::map_colors;

/// Collapse an RGB mask to one channel. Any lit channel counts; the masks
/// written by the segmenter carry the same value in all three.
pub fn mask_luma(mask: &RgbImage) -> GrayImage {
    map_colors(mask, |p| Luma([p[0] | p[1] | p[2]]))
}
