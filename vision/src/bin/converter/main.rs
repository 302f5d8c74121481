mod config;

use anyhow::Context;
use clap::Parser;
use kdam::term::Colorizer;
use simplelog::LevelFilter;
use vision::{convert, ConversionConfig, Network, Profile};

#[derive(Parser)]
#[clap(about = "Converts a pretrained network into an optimized TorchScript model.")]
pub struct Args {
    /// Network name.
    #[clap(value_enum, short, long, default_value = "resnet34")]
    network: Network,

    /// Pretrained weights file. Default "weights/[NETWORK NAME].ot".
    #[clap(short, long)]
    weights: Option<String>,

    /// Output model file. Default "model/[NETWORK NAME].ot".
    #[clap(short, long)]
    output: Option<String>,

    /// Optimization profile.
    #[clap(value_enum, short, long, default_value = "mobile")]
    profile: Profile,

    /// Download the pretrained weights when the weights file is missing.
    #[clap(long, action)]
    download: bool,

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

    let config = ConversionConfig::from(&args);
    log::debug!("Converting {} with {config:?}", args.network);

    let report = match convert(&args.network, &config) {
        Ok(report) => report,
        Err(error) => {
            print!("{}", "\tFailure ".colorize("red"));
            println!("Couldn't convert {}.", args.network);
            return Err(error).context("Converting the model");
        }
    };

    print!("{}", "\tSuccess ".colorize("bold green"));
    println!(
        "{} is saved to {} ({} bytes, {} classes) in {:.02}s.",
        args.network,
        report.output_file.display(),
        report.size,
        report.classes,
        report.elapsed.as_secs_f64()
    );

    Ok(())
}
