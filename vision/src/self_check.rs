use serde::{Deserialize, Serialize};
use tch::{Device, Tensor};

/// Descriptive information about the tensor built by [`cpu_self_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSummary {
    pub size: Vec<i64>,
    pub numel: usize,
    pub dim: usize,
    pub kind: String,
    pub device: String,
}

impl TensorSummary {
    pub fn size_string(&self) -> String {
        self.size
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Verifies the libtorch bindings work on CPU without any model.
pub fn cpu_self_check() -> TensorSummary {
    let t = Tensor::from_slice(&[3i64, 1, 4]).to_device(Device::Cpu);

    let summary = TensorSummary {
        size: t.size(),
        numel: t.numel(),
        dim: t.dim(),
        kind: format!("{:?}", t.kind()),
        device: format!("{:?}", t.device()),
    };
    log::info!("Self check tensor: {t:?}, {summary:?}");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_self_check() {
        let summary = cpu_self_check();
        assert_eq!(vec![3], summary.size);
        assert_eq!("3", summary.size_string());
        assert_eq!(3, summary.numel);
        assert_eq!(1, summary.dim);
        assert_eq!("Int64", summary.kind);
        assert_eq!("Cpu", summary.device);
    }

    #[test]
    fn test_size_string() {
        let summary = TensorSummary {
            size: vec![1, 3, 224, 224],
            numel: 150528,
            dim: 4,
            kind: "Float".to_owned(),
            device: "Cpu".to_owned(),
        };
        assert_eq!("1, 3, 224, 224", summary.size_string());
    }
}
