use std::sync::Mutex;

use anyhow::anyhow;
use tch::Tensor;
use vision::{Labels, Model, Prediction, Transform};

use crate::config::ServerConfig;

/// Shared by all workers. libtorch calls must run on the blocking pool.
#[derive(Debug)]
pub struct AppState {
    model: Mutex<Model>,
    labels: Labels,
    transform: Transform,
    config: ServerConfig,
}

impl AppState {
    pub fn load(config: ServerConfig) -> anyhow::Result<Self> {
        let model = Model::load(&config.model_file)?;
        Ok(Self {
            model: Mutex::new(model),
            labels: Labels::imagenet(),
            transform: Transform::default(),
            config,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn preprocess(&self, data: &[u8]) -> anyhow::Result<Tensor> {
        self.transform.from_memory(data)
    }

    pub fn predict(&self, image: &Tensor) -> anyhow::Result<Prediction> {
        let model = self
            .model
            .lock()
            .map_err(|_| anyhow!("Model lock is poisoned"))?;
        model.predict(image, &self.labels, self.config.top)
    }

    /// Predicts the class of the configured fixture image.
    pub fn self_check(&self) -> anyhow::Result<Prediction> {
        let image = self.transform.load_image(&self.config.fixture_file)?;
        self.predict(&image)
    }
}
