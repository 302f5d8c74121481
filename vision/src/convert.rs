use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{ensure, Context};
use clap::ValueEnum;
use tch::nn::ModuleT;
use tch::vision::imagenet;
use tch::{kind, CModule, Tensor};

use crate::inference::Model;
use crate::networks::Network;
use crate::zoo;

/// How the traced graph is prepared for deployment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Frozen parameters, traced in inference mode.
    #[clap(name = "mobile")]
    Mobile,
    /// Plain evaluation-mode trace.
    #[clap(name = "none")]
    Unoptimized,
}

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub weights_file: PathBuf,
    pub output_file: PathBuf,
    pub profile: Profile,
    pub download: bool,
}

impl ConversionConfig {
    pub fn for_network(network: &Network) -> Self {
        Self {
            weights_file: network.default_weights_file(),
            output_file: network.default_model_file(),
            profile: Profile::Mobile,
            download: false,
        }
    }
}

#[derive(Debug)]
pub struct ConversionReport {
    pub output_file: PathBuf,
    pub size: u64,
    pub classes: i64,
    pub elapsed: Duration,
}

/// Builds `network` from pretrained weights, traces it and writes a TorchScript model.
///
/// An existing output file is overwritten. The written model is loaded back and run once
/// on a blank input before reporting success.
pub fn convert(network: &Network, config: &ConversionConfig) -> anyhow::Result<ConversionReport> {
    let timer = Instant::now();

    if !config.weights_file.exists() {
        ensure!(
            config.download,
            "Weights file does not exist, path={}",
            config.weights_file.display()
        );
        zoo::download_weights(network, &config.weights_file)?;
    }

    let mut vs = network.create_varstore();
    let net = network.create_network(&vs.root());
    network.load_weights(&mut vs, &config.weights_file)?;
    log::info!(
        "Loaded {network} weights from {}",
        config.weights_file.display()
    );

    let input = Tensor::zeros(network.input_shape(), kind::FLOAT_CPU);

    let module = match config.profile {
        Profile::Mobile => {
            vs.freeze();
            tch::no_grad(|| trace(network, net.as_ref(), &input))?
        }
        Profile::Unoptimized => trace(network, net.as_ref(), &input)?,
    };

    if let Some(parent) = config.output_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating directory {}", parent.display()))?;
    }
    module
        .save(&config.output_file)
        .with_context(|| format!("Saving model to {}", config.output_file.display()))?;

    let classes = check_model(&config.output_file, &input)?;

    let size = fs::metadata(&config.output_file)
        .with_context(|| format!("Reading metadata of {}", config.output_file.display()))?
        .len();
    ensure!(size > 0, "Model file is empty");

    Ok(ConversionReport {
        output_file: config.output_file.clone(),
        size,
        classes,
        elapsed: timer.elapsed(),
    })
}

fn trace(network: &Network, net: &dyn ModuleT, input: &Tensor) -> anyhow::Result<CModule> {
    let mut forward = |inputs: &[Tensor]| vec![net.forward_t(&inputs[0], /*train=*/ false)];
    CModule::create_by_tracing(
        &network.module_name(),
        "forward",
        &[input.shallow_clone()],
        &mut forward,
    )
    .with_context(|| format!("Tracing {network}"))
}

fn check_model(path: &Path, input: &Tensor) -> anyhow::Result<i64> {
    let model = Model::load(path).context("Reloading the converted model")?;
    let output = model.forward(input)?;
    let classes = output.size().last().copied().unwrap_or_default();
    ensure!(
        classes == imagenet::CLASS_COUNT,
        "Converted model returns {classes} classes, expected {}",
        imagenet::CLASS_COUNT
    );
    Ok(classes)
}
