mod config;
mod verify;

use clap::Parser;
use simplelog::LevelFilter;
use vision::Normalization;

use crate::config::VerificationConfig;
use crate::verify::verify;

#[derive(Parser)]
#[clap(about = "Runs a converted model on one image and prints debug tensors.")]
pub struct Args {
    /// TorchScript model file.
    #[clap(short, long, env = "MODEL_PATH", default_value = "model/resnet34.ot")]
    model: String,

    /// Input image.
    #[clap(short, long, default_value = "lion.jpg")]
    image: String,

    /// Length of the shorter image side after resizing.
    #[clap(long, default_value_t = 256)]
    resize: u32,

    /// Side of the center crop fed to the model.
    #[clap(long, default_value_t = 224)]
    crop: u32,

    /// Input normalization, plain [0, 1] scaling by default.
    #[clap(value_enum, long, default_value = "none")]
    normalization: Normalization,

    /// Labels file, one label per line. ImageNet labels by default.
    #[clap(long)]
    labels: Option<String>,

    /// Number of best classes to print.
    #[clap(long, default_value_t = 5)]
    top: usize,

    /// Number of forward passes, the predicted class must not change between them.
    #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,

    /// Number of libtorch threads, all cores by default.
    #[clap(long)]
    threads: Option<i32>,

    /// Log level.
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    vision::init_logger(args.log_level)?;
    tch::set_num_threads(args.threads.unwrap_or(num_cpus::get() as i32));

    let config = VerificationConfig::try_from(&args)?;
    let (prediction, timings) = verify(&config)?;

    println!("Predicted class: {}", prediction.class);
    if let Some(label) = &prediction.label {
        println!("Predicted label: {label}");
    }

    if timings.count() > 1 {
        println!(
            "Elapsed: {:.02}s. Run time: min/max/avg={:0.3}s/{:.03}s/{:.03}s",
            timings.sum().unwrap_or_default(),
            timings.min().unwrap_or_default(),
            timings.max().unwrap_or_default(),
            timings.avg().unwrap_or_default()
        );
    }

    Ok(())
}
