use core::fmt;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbImage;
use strum::IntoEnumIterator;
use tracing::info;
use walkdir::WalkDir;

use super::annotate::BoundingBox;
use crate::error::{ClickSamError, Result};

pub const CLICK_PREFIX: &str = "click_coords_";
pub const BBOX_PREFIX: &str = "bbox_coords_";
pub const MASK_PREFIX: &str = "segmented_image_";
pub const BOXED_PREFIX: &str = "segmented_image_with_boxes_";

/// Disk partition of the annotation layout. All three subtrees are created
/// at startup; clicks write into Training (full record) and Testing (click
/// coordinate only), Evaluation stays empty until filled by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumIter)]
pub enum Category {
    Training,
    Testing,
    Evaluation,
}

/// The numbered annotation layout under one root directory.
pub struct AnnotationStore {
    root: PathBuf,
}

// public
impl AnnotationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AnnotationStore { root: root.into() }
    }

    /// Create all twelve layout directories up front so no write path has to
    /// care about missing parents.
    pub fn ensure_layout(&self) -> Result<()> {
        for category in Category::iter() {
            for dir in [
                self.bbox_coords_dir(category),
                self.bbox_dir(category),
                self.masks_dir(category),
                self.click_dir(category),
            ] {
                std::fs::create_dir_all(&dir).map_err(|err| ClickSamError::persist(&dir, err))?;
            }
        }
        Ok(())
    }

    /// Write the click coordinate alone, numbered against the Testing series.
    /// This series is independent of the one `save_results` draws from; the
    /// two drift apart and are not kept in sync.
    pub fn save_click_coordinates(&self, click: [u32; 2]) -> Result<u32> {
        let dir = self.click_dir(Category::Testing);
        let number = next_file_number(&dir, CLICK_PREFIX, ".txt")?;

        write_text(
            &dir.join(format!("{CLICK_PREFIX}{number:03}.txt")),
            &click_line(click),
        )?;

        Ok(number)
    }

    /// Write all four artifacts of one click under a single number drawn
    /// from the Training click-coordinate series.
    pub fn save_results(
        &self,
        click: [u32; 2],
        boxes: &[BoundingBox],
        mask: &RgbImage,
        annotated: &RgbImage,
    ) -> Result<u32> {
        let number = next_file_number(
            &self.click_dir(Category::Training),
            CLICK_PREFIX,
            ".txt",
        )?;

        write_text(
            &self
                .click_dir(Category::Training)
                .join(format!("{CLICK_PREFIX}{number:03}.txt")),
            &click_line(click),
        )?;

        let mut lines = String::new();
        for b in boxes {
            lines.push_str(&b.to_string());
            lines.push('\n');
        }
        write_text(
            &self
                .bbox_coords_dir(Category::Training)
                .join(format!("{BBOX_PREFIX}{number:03}.txt")),
            &lines,
        )?;

        mask.save(
            self.masks_dir(Category::Training)
                .join(format!("{MASK_PREFIX}{number:03}.png")),
        )?;
        annotated.save(
            self.bbox_dir(Category::Training)
                .join(format!("{BOXED_PREFIX}{number:03}.png")),
        )?;

        info!(number, boxes = boxes.len(), "saved click record");
        Ok(number)
    }
}

// private
impl AnnotationStore {
    fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.to_string())
    }

    fn bbox_coords_dir(&self, category: Category) -> PathBuf {
        self.category_dir(category).join("annotations_boundingbox_coords")
    }

    fn bbox_dir(&self, category: Category) -> PathBuf {
        self.category_dir(category).join("annotations_boundingbox")
    }

    fn masks_dir(&self, category: Category) -> PathBuf {
        self.category_dir(category).join("annotations_masks")
    }

    fn click_dir(&self, category: Category) -> PathBuf {
        self.category_dir(category).join("click_coords")
    }
}

/// Next sequence number for `{prefix}*{extension}` files in `dir`: one past
/// the highest number found, or 1 for a fresh directory. The scan is flat and
/// max-based, so gaps stay gaps. Read-then-write with no lock: two writers
/// against one directory can pick the same number and clobber each other.
pub fn next_file_number(dir: &Path, prefix: &str, extension: &str) -> Result<u32> {
    let mut max = None;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| ClickSamError::persist(dir, io::Error::other(err)))?;
        let name = entry.file_name().to_string_lossy();
        if !name.starts_with(prefix) || !name.ends_with(extension) {
            continue;
        }

        // first run of digits in the name, however long
        let digits: String = name
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let number: u32 = digits.parse().map_err(|_| {
            ClickSamError::persist(
                entry.path(),
                io::Error::new(io::ErrorKind::InvalidData, "file name has no sequence number"),
            )
        })?;

        max = Some(max.map_or(number, |m: u32| m.max(number)));
    }

    Ok(max.map_or(1, |m| m + 1))
}

fn click_line([x, y]: [u32; 2]) -> String {
    format!("Clicked coordinates: {x}, {y}\n")
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|err| ClickSamError::persist(path, err))
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Training => write!(f, "training"),
            Category::Testing => write!(f, "testing"),
            Category::Evaluation => write!(f, "evaluation"),
        }
    }
}
