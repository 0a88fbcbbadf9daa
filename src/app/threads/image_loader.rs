use std::path::PathBuf;

use image::DynamicImage;

use crate::error::{ClickSamError, Result};

pub struct Image {
    pub data: DynamicImage,
    pub path: PathBuf,
    pub size: [u32; 2],
}

impl Image {
    pub fn load(path: PathBuf) -> Result<Self> {
        let data = image::ImageReader::open(&path)
            .map_err(|err| ClickSamError::persist(&path, err))?
            .decode()?;
        let size = [data.width(), data.height()];

        Ok(Image { data, path, size })
    }
}
