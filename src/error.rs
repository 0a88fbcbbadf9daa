use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClickSamError>;

#[derive(Error, Debug)]
pub enum ClickSamError {
    /// config.json is missing or malformed. Fatal at startup.
    #[error("config: {0}")]
    Config(String),

    /// Weight files are missing or a session failed to build. Fatal at startup.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Encoder or decoder run failed mid-session.
    #[error("inference: {0}")]
    Inference(#[from] ort::Error),

    #[error("tensor shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// A click arrived before an image embedding was computed. Recoverable:
    /// the user is told to load an image first.
    #[error("no image embedding set, load an image first")]
    NoEmbedding,

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    /// A line did not match the persisted bounding-box format.
    #[error("bounding box line {0:?}")]
    BBoxFormat(String),

    /// Disk or permission failure while reading or writing annotation state,
    /// including an artifact name the numbering scan cannot parse. Surfaced
    /// to the caller, never retried.
    #[error("i/o at {path:?}: {source}")]
    Persist { path: PathBuf, source: io::Error },

    #[error("ui: {0}")]
    Ui(String),
}

impl ClickSamError {
    pub fn persist(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ClickSamError::Persist {
            path: path.into(),
            source,
        }
    }
}
