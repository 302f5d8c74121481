use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use tch::{CModule, Device, Kind, Tensor};

use crate::labels::Labels;

/// A converted TorchScript classifier, in evaluation mode.
#[derive(Debug)]
pub struct Model {
    module: CModule,
    path: PathBuf,
}

impl Model {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        ensure!(
            path.exists(),
            "Model file does not exist, path={}",
            path.display()
        );

        let mut module = CModule::load_on_device(path, Device::Cpu)
            .with_context(|| format!("Loading model from {}", path.display()))?;
        module.set_eval();

        log::info!("Loaded model from {}", path.display());
        Ok(Self {
            module,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw logits, computed without gradient tracking.
    pub fn forward(&self, input: &Tensor) -> anyhow::Result<Tensor> {
        tch::no_grad(|| self.module.forward_ts(&[input])).context("Forward pass")
    }

    pub fn predict(&self, input: &Tensor, labels: &Labels, top: usize) -> anyhow::Result<Prediction> {
        let logits = self.forward(input)?;
        Prediction::from_logits(&logits, labels, top)
    }
}

/// Softmax over the class dimension of a single-sample output.
pub fn probabilities(logits: &Tensor) -> anyhow::Result<Tensor> {
    let logits = match logits.size().as_slice() {
        [_] => logits.shallow_clone(),
        [1, _] => logits.get(0),
        shape => bail!("Unexpected output shape {shape:?}, expected [classes] or [1, classes]"),
    };
    Ok(logits.softmax(-1, Kind::Float))
}

pub(crate) fn to_vec(tensor: &Tensor) -> anyhow::Result<Vec<f32>> {
    let tensor = tensor.to_kind(Kind::Float).flatten(0, -1).contiguous();
    let numel = tensor.numel();
    let mut values = vec![0f32; numel];
    tensor
        .f_copy_data(&mut values, numel)
        .context("Copying tensor data")?;
    Ok(values)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub class: usize,
    pub label: Option<String>,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: usize,
    pub label: Option<String>,
    pub probability: f64,
    /// Best `k` classes, most probable first.
    pub top: Vec<Score>,
}

impl Prediction {
    pub fn from_logits(logits: &Tensor, labels: &Labels, top: usize) -> anyhow::Result<Self> {
        let probabilities = probabilities(logits)?;
        Self::from_probabilities(&to_vec(&probabilities)?, labels, top)
    }

    pub fn from_probabilities(
        probabilities: &[f32],
        labels: &Labels,
        top: usize,
    ) -> anyhow::Result<Self> {
        let class = max_index(probabilities).context("Empty probability vector")?;

        let score = |class: usize| Score {
            class,
            label: labels.get(class).map(ToOwned::to_owned),
            probability: f64::from(probabilities[class]),
        };

        let mut ranked = (0..probabilities.len()).collect::<Vec<_>>();
        ranked.sort_by(|&a, &b| rank(probabilities[b], probabilities[a]).then(a.cmp(&b)));

        let best = score(class);
        Ok(Self {
            class: best.class,
            label: best.label,
            probability: best.probability,
            top: ranked.into_iter().take(top).map(score).collect(),
        })
    }
}

/// Orders like `partial_cmp` with NaN below every number.
fn rank(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Index of the first maximum, NaNs never win.
pub fn max_index<T>(values: &[T]) -> Option<usize>
where
    T: PartialOrd + Copy,
{
    let mut max: Option<(usize, T)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match max {
            None if value.partial_cmp(&value).is_some() => max = Some((idx, value)),
            Some((_, current)) if value > current => max = Some((idx, value)),
            _ => {}
        }
    }
    max.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_index() {
        assert_eq!(None, max_index::<f32>(&[]));
        assert_eq!(Some(0), max_index(&[1.0]));
        assert_eq!(Some(2), max_index(&[0.1, 0.2, 0.7]));
        assert_eq!(Some(1), max_index(&[0.1, 0.5, 0.5]));
        assert_eq!(Some(1), max_index(&[f32::NAN, 0.3, 0.1]));
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let logits = Tensor::from_slice(&[1.0f32, 2.0, 3.0, -1.0]).view([1, 4]);
        let values = to_vec(&probabilities(&logits).unwrap()).unwrap();
        assert_eq!(4, values.len());
        assert!((values.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert_eq!(Some(2), max_index(&values));
    }

    #[test]
    fn test_probabilities_rejects_batches() {
        let logits = Tensor::zeros([2, 4], tch::kind::FLOAT_CPU);
        assert!(probabilities(&logits).is_err());
    }

    #[test]
    fn test_prediction_top() {
        let labels = Labels::from_lines("ad\nmusic\ntalk");
        let prediction =
            Prediction::from_probabilities(&[0.2, 0.5, 0.3, 0.0], &labels, 3).unwrap();

        assert_eq!(1, prediction.class);
        assert_eq!(Some("music".to_owned()), prediction.label);
        assert_eq!(
            vec![1, 2, 0],
            prediction.top.iter().map(|s| s.class).collect::<Vec<_>>()
        );
        assert!((prediction.top[1].probability - 0.3).abs() < 1e-6);

        let prediction =
            Prediction::from_probabilities(&[0.2, 0.5, 0.3, 0.0], &labels, 10).unwrap();
        assert_eq!(4, prediction.top.len());
        assert_eq!(None, prediction.top[3].label);
    }

    #[test]
    fn test_prediction_with_nan() {
        let labels = Labels::from_lines("ad\nmusic\ntalk");
        let prediction =
            Prediction::from_probabilities(&[0.2, f32::NAN, 0.7], &labels, 3).unwrap();

        assert_eq!(2, prediction.class);
        assert_eq!(
            vec![2, 0, 1],
            prediction.top.iter().map(|s| s.class).collect::<Vec<_>>()
        );
        assert_eq!(prediction.class, prediction.top[0].class);
    }

    #[test]
    fn test_prediction_empty() {
        assert!(Prediction::from_probabilities(&[], &Labels::from_lines(""), 1).is_err());
    }

    #[test]
    fn test_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Model::load(dir.path().join("missing.ot")).is_err());

        let broken = dir.path().join("broken.ot");
        std::fs::write(&broken, b"not a torchscript archive").unwrap();
        assert!(Model::load(&broken).is_err());
    }
}
