use std::path::PathBuf;

use crate::Args;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub model_file: PathBuf,
    pub fixture_file: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub top: usize,
    pub workers: usize,
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        Self {
            bind: args.bind.clone(),
            model_file: PathBuf::from(&args.model),
            fixture_file: PathBuf::from(&args.fixture),
            upload_dir: PathBuf::from(&args.upload_dir),
            max_upload_size: args.max_upload_size,
            top: args.top,
            workers: args.workers.unwrap_or_else(num_cpus::get),
        }
    }
}
