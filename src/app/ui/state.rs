use crate::app::annotate::BoundingBox;
use crate::app::threads::image_loader::Image;

use image::RgbImage;

use core::fmt;

pub struct UiState {
    pub status: String,

    pub img: Option<Image>,
    pub embedded: bool,

    pub result_view: ResultView,

    pub last_click: Option<[u32; 2]>,
    pub score: Option<f32>,
    pub boxes: Vec<BoundingBox>,
    pub save_number: Option<u32>,

    pub mask: Option<RgbImage>,
    pub annotated: Option<RgbImage>,
}

#[derive(PartialEq, strum_macros::EnumIter, Copy, Clone)]
pub enum ResultView {
    Both,
    Mask,
    Boxes,
}

impl UiState {
    pub fn new() -> Self {
        UiState {
            status: "Load an image first".to_string(),

            img: None,
            embedded: false,

            result_view: ResultView::Both,

            last_click: None,
            score: None,
            boxes: Vec::new(),
            save_number: None,

            mask: None,
            annotated: None,
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultView::Both => write!(f, "Both"),
            ResultView::Mask => write!(f, "Mask"),
            ResultView::Boxes => write!(f, "Boxes"),
        }
    }
}
