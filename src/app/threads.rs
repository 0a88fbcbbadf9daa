pub mod image_loader;

use std::{
    fmt,
    path::PathBuf,
    sync::mpsc::{Receiver, Sender},
    thread,
};

use image::RgbImage;
use tracing::{error, info};

use super::annotate::{self, BoundingBox};
use super::model::sam::SamModel;
use super::store::AnnotationStore;
use crate::config::Config;
use crate::error::Result;

#[derive(Debug)]
pub enum Command {
    LoadImage(PathBuf),
    Click([u32; 2]),
    End,
}

pub enum Return {
    Img(image_loader::Image),
    Segmented(Box<SegmentResult>),
    Failure(String),
    Void,
}

/// Everything one click produced, as shown in the UI after the artifacts
/// have been written.
pub struct SegmentResult {
    pub click: [u32; 2],
    pub score: f32,
    pub boxes: Vec<BoundingBox>,
    pub mask: RgbImage,
    pub annotated: RgbImage,
    pub save_number: u32,
}

/// State owned by the compute thread: the model session with its cached
/// embedding, plus the annotation store. Nothing here is shared; the UI only
/// talks to it over the channels.
pub struct ComputationData {
    model: SamModel,
    store: AnnotationStore,

    sender: Sender<Return>,
    receiver: Receiver<Command>,
}

// public
impl ComputationData {
    pub fn new(sender: Sender<Return>, receiver: Receiver<Command>, config: &Config) -> Result<Self> {
        let store = AnnotationStore::new(&config.data_root);
        store.ensure_layout()?;

        Ok(ComputationData {
            model: SamModel::new(&config.sam_e_path, &config.sam_d_path)?,
            store,
            sender,
            receiver,
        })
    }
}

pub fn run(mut data: ComputationData) {
    thread::spawn(move || {
        while let Ok(task) = data.receiver.recv() {
            match task {
                Command::End => break,
                _ => data.run_task(task),
            }
        }
    });
}

// private
impl ComputationData {
    fn run_task(&mut self, task: Command) {
        let timer = std::time::Instant::now();
        let msg = task.to_string();

        let ret = match task {
            Command::LoadImage(path) => self.load_image(path),
            Command::Click(click) => self.click(click),
            Command::End => Ok(Return::Void),
        };
        // a failed command must not take the worker down with it
        let ret = ret.unwrap_or_else(|err| {
            error!(%err, task = %msg, "task failed");
            Return::Failure(err.to_string())
        });

        info!(task = %msg, elapsed = ?timer.elapsed(), "task done");
        if self.sender.send(ret).is_err() {
            error!("result channel closed, dropping result");
        }
    }

    fn load_image(&mut self, path: PathBuf) -> Result<Return> {
        let img = image_loader::Image::load(path)?;
        self.model.set_image(&img.data)?;

        Ok(Return::Img(img))
    }

    /// The full per-click pipeline. Both persistence paths fire on every
    /// click: the standalone click-coordinate write (Testing series) and the
    /// four-artifact record (Training series), numbered independently.
    fn click(&mut self, click: [u32; 2]) -> Result<Return> {
        let [x, y] = click;
        info!(x, y, "clicked coordinates");

        let (mask, score) = self.model.segment(x, y)?;
        let boxes = annotate::bounding_boxes(&mask);
        let annotated = annotate::draw_bounding_boxes(&mask, &boxes);

        self.store.save_click_coordinates(click)?;
        let save_number = self.store.save_results(click, &boxes, &mask, &annotated)?;

        Ok(Return::Segmented(Box::new(SegmentResult {
            click,
            score,
            boxes,
            mask,
            annotated,
            save_number,
        })))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::LoadImage(_) => write!(f, "Load Image"),
            Command::Click(_) => write!(f, "Click"),
            Command::End => write!(f, "End"),
        }
    }
}
