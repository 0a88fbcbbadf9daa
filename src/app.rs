pub mod annotate;
pub mod model;
pub mod store;
mod threads;
mod ui;

use crate::config::Config;
use crate::error::Result;
use std::sync::mpsc;
use threads::{Command, Return};

pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        App { config }
    }

    pub fn run(&self) -> Result<()> {
        let (task_sender, task_receiver) = mpsc::channel::<Command>();
        let (result_sender, result_receiver) = mpsc::channel::<Return>();

        // model load and layout creation are fatal here, before any window
        let data = threads::ComputationData::new(result_sender, task_receiver, &self.config)?;
        threads::run(data);

        ui::UiData::new(task_sender.clone(), result_receiver).run()?;

        // UI closed, let the worker drain and stop
        task_sender.send(Command::End).ok();
        Ok(())
    }
}
