use std::time::Instant;

use anyhow::{ensure, Context};
use kdam::term::Colorizer;
use kdam::tqdm;
use tch::Tensor;
use vision::{Labels, Model, Prediction, Timings};

use crate::config::VerificationConfig;

/// Loads the model and the image, runs the forward pass `repeat` times and prints
/// the input and output tensors along with the best classes.
pub fn verify(config: &VerificationConfig) -> anyhow::Result<(Prediction, Timings)> {
    let model = match Model::load(&config.model_file) {
        Ok(model) => {
            print!("{}", "\tSuccess ".colorize("bold green"));
            println!("Model is loaded from {}.", config.model_file.display());
            model
        }
        Err(error) => {
            print!("{}", "\tFailure ".colorize("red"));
            println!(
                "Couldn't load model from {}.",
                config.model_file.display()
            );
            return Err(error);
        }
    };

    let labels = match &config.labels_file {
        Some(path) => Labels::from_file(path)?,
        None => Labels::imagenet(),
    };

    let image = config
        .transform
        .load_image(&config.image_file)
        .context("Preprocessing the image")?;

    println!("Input tensor shape: {:?}", image.size());
    println!("Input tensor dtype: {:?}", image.kind());
    println!("Input tensor as array:");
    image.print();

    let mut timings = Timings::new();
    let mut last: Option<(Tensor, Prediction)> = None;

    for _ in tqdm!(
        0..config.repeat,
        desc = "Predicting",
        animation = "fillup",
        unit = "run",
        disable = config.repeat == 1
    ) {
        let timer = Instant::now();
        let output = model.forward(&image)?;
        let prediction = Prediction::from_logits(&output, &labels, config.top)?;
        timings = timings.push(timer.elapsed());

        if let Some((_, previous)) = &last {
            ensure!(
                previous.class == prediction.class,
                "Predicted class is not stable: {} then {}",
                previous.class,
                prediction.class
            );
        }
        last = Some((output, prediction));
    }

    let (output, prediction) = last.context("No forward pass was run")?;

    println!("Output tensor shape: {:?}", output.size());
    println!("Output tensor dtype: {:?}", output.kind());

    for score in &prediction.top {
        println!(
            "{:50} {:5.2}%",
            score.label.as_deref().unwrap_or("-"),
            100.0 * score.probability
        );
    }

    Ok((prediction, timings))
}
