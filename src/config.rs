use serde::Deserialize;

use crate::error::{ClickSamError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SAM image encoder weights (onnx).
    pub sam_e_path: String,
    /// SAM prompt decoder weights (onnx).
    pub sam_d_path: String,
    /// Root directory of the annotation layout. The training/testing/
    /// evaluation subtrees are created under it at startup.
    pub data_root: String,
}

impl Config {
    pub fn load() -> Result<Config> {
        Self::load_path("config.json")
    }

    pub fn load_path(path: &str) -> Result<Config> {
        let json_content = std::fs::read_to_string(path)
            .map_err(|err| ClickSamError::Config(format!("read {path}: {err}")))?;

        serde_json::from_str(&json_content)
            .map_err(|err| ClickSamError::Config(format!("parse {path}: {err}")))
    }
}
