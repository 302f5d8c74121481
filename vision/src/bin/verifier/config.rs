use std::path::PathBuf;

use vision::Transform;

use crate::Args;

#[derive(Debug)]
pub struct VerificationConfig {
    pub model_file: PathBuf,
    pub image_file: PathBuf,
    pub transform: Transform,
    pub labels_file: Option<PathBuf>,
    pub top: usize,
    pub repeat: usize,
}

impl TryFrom<&Args> for VerificationConfig {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> anyhow::Result<Self> {
        Ok(Self {
            model_file: PathBuf::from(&args.model),
            image_file: PathBuf::from(&args.image),
            transform: Transform::new(args.resize, args.crop, args.normalization)?,
            labels_file: args.labels.as_ref().map(PathBuf::from),
            top: args.top,
            repeat: args.repeat as usize,
        })
    }
}
