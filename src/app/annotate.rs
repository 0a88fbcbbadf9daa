use core::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage};
use imageproc::contours::{find_contours_with_threshold, BorderType};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::error::ClickSamError;
use crate::utils::mask_luma;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Axis-aligned box over a mask region, half-open on both axes: `x_max` and
/// `y_max` are one past the last foreground pixel. A single-pixel region
/// still spans one unit, so degenerate contours are kept, not filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

/// Boxes around every connected foreground region of `mask`. Only outer
/// contours count; holes and nested regions are ignored. The order is
/// whatever the contour tracer yields: stable per input, not spatial.
pub fn bounding_boxes(mask: &RgbImage) -> Vec<BoundingBox> {
    let gray = mask_luma(mask);

    find_contours_with_threshold::<u32>(&gray, 0)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| {
            let mut b = BoundingBox {
                x_min: u32::MAX,
                x_max: 0,
                y_min: u32::MAX,
                y_max: 0,
            };
            for p in &c.points {
                b.x_min = b.x_min.min(p.x);
                b.x_max = b.x_max.max(p.x + 1);
                b.y_min = b.y_min.min(p.y);
                b.y_max = b.y_max.max(p.y + 1);
            }
            b
        })
        .collect()
}

/// Draw each box as a 2px red hollow rectangle on a copy of `image`. The
/// input is untouched, so redrawing the same boxes is idempotent.
pub fn draw_bounding_boxes(image: &RgbImage, boxes: &[BoundingBox]) -> RgbImage {
    let mut out = image.clone();
    for b in boxes {
        let w = b.x_max - b.x_min;
        let h = b.y_max - b.y_min;
        draw_hollow_rect_mut(
            &mut out,
            Rect::at(b.x_min as i32, b.y_min as i32).of_size(w, h),
            BOX_COLOR,
        );
        if w > 2 && h > 2 {
            draw_hollow_rect_mut(
                &mut out,
                Rect::at(b.x_min as i32 + 1, b.y_min as i32 + 1).of_size(w - 2, h - 2),
                BOX_COLOR,
            );
        }
    }
    out
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[x_min: {}, x_max: {}], [y_min: {}, y_max: {}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

impl FromStr for BoundingBox {
    type Err = ClickSamError;

    /// Parse one line of the persisted bbox format back into a box, so the
    /// annotation files round-trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = [0u32; 4];
        let mut count = 0;
        for run in s
            .split(|c: char| !c.is_ascii_digit())
            .filter(|run| !run.is_empty())
        {
            if count == 4 {
                return Err(ClickSamError::BBoxFormat(s.to_string()));
            }
            values[count] = run
                .parse()
                .map_err(|_| ClickSamError::BBoxFormat(s.to_string()))?;
            count += 1;
        }
        if count != 4 || !s.starts_with("[x_min:") {
            return Err(ClickSamError::BBoxFormat(s.to_string()));
        }

        Ok(BoundingBox {
            x_min: values[0],
            x_max: values[1],
            y_min: values[2],
            y_max: values[3],
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mask_with_rect(w: u32, h: u32, b: &BoundingBox) -> RgbImage {
        let mut mask = RgbImage::new(w, h);
        for y in b.y_min..b.y_max {
            for x in b.x_min..b.x_max {
                mask.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        mask
    }

    #[test]
    fn empty_mask_yields_no_boxes() {
        let mask = RgbImage::new(32, 32);
        assert!(bounding_boxes(&mask).is_empty());
    }

    #[test]
    fn one_rectangle_yields_its_box() {
        let expected = BoundingBox {
            x_min: 0,
            x_max: 10,
            y_min: 0,
            y_max: 5,
        };
        let mask = mask_with_rect(32, 32, &expected);

        assert_eq!(bounding_boxes(&mask), vec![expected]);
    }

    #[test]
    fn separate_regions_yield_separate_boxes() {
        let a = BoundingBox {
            x_min: 2,
            x_max: 6,
            y_min: 2,
            y_max: 6,
        };
        let b = BoundingBox {
            x_min: 20,
            x_max: 28,
            y_min: 10,
            y_max: 14,
        };
        let mut mask = mask_with_rect(32, 32, &a);
        for y in b.y_min..b.y_max {
            for x in b.x_min..b.x_max {
                mask.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }

        let mut boxes = bounding_boxes(&mask);
        boxes.sort_by_key(|b| b.x_min);
        assert_eq!(boxes, vec![a, b]);
    }

    #[test]
    fn single_pixel_region_yields_unit_box() {
        let dot = BoundingBox {
            x_min: 7,
            x_max: 8,
            y_min: 9,
            y_max: 10,
        };
        let mask = mask_with_rect(16, 16, &dot);

        assert_eq!(bounding_boxes(&mask), vec![dot]);
    }

    #[test]
    fn drawing_is_idempotent_and_leaves_input_alone() {
        let b = BoundingBox {
            x_min: 4,
            x_max: 12,
            y_min: 4,
            y_max: 12,
        };
        let base = mask_with_rect(16, 16, &b);
        let before = base.clone();

        let first = draw_bounding_boxes(&base, &[b]);
        let second = draw_bounding_boxes(&base, &[b]);

        assert_eq!(base, before);
        assert_eq!(first, second);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let b = BoundingBox {
            x_min: 3,
            x_max: 140,
            y_min: 0,
            y_max: 77,
        };
        let line = b.to_string();

        assert_eq!(line, "[x_min: 3, x_max: 140], [y_min: 0, y_max: 77]");
        assert_eq!(line.parse::<BoundingBox>().unwrap(), b);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!("".parse::<BoundingBox>().is_err());
        assert!("[x_min: 1, x_max: 2]".parse::<BoundingBox>().is_err());
        assert!("1 2 3 4".parse::<BoundingBox>().is_err());
    }
}
