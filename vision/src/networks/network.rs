use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use tch::nn::{self, ModuleT};
use tch::vision::{alexnet, densenet, imagenet, inception, mobilenet, resnet, squeezenet, vgg};

use crate::transform::{Normalization, Transform};

/// Pretrained ImageNet architectures from the tch model zoo.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Network {
    #[clap(name = "alexnet")]
    AlexNet,
    #[clap(name = "densenet121")]
    DenseNet121,
    #[clap(name = "inception-v3")]
    InceptionV3,
    #[clap(name = "mobilenet-v2")]
    MobileNetV2,
    #[clap(name = "resnet18")]
    ResNet18,
    #[clap(name = "resnet34")]
    ResNet34,
    #[clap(name = "squeezenet1_0")]
    SqueezeNet1_0,
    #[clap(name = "squeezenet1_1")]
    SqueezeNet1_1,
    #[clap(name = "vgg13")]
    Vgg13,
    #[clap(name = "vgg16")]
    Vgg16,
    #[clap(name = "vgg19")]
    Vgg19,
}

impl Default for Network {
    fn default() -> Self {
        Network::ResNet34
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

impl Network {
    /// File stem shared by the pretrained weights and the converted model.
    pub fn stem(&self) -> &'static str {
        match self {
            Network::AlexNet => "alexnet",
            Network::DenseNet121 => "densenet121",
            Network::InceptionV3 => "inception-v3",
            Network::MobileNetV2 => "mobilenet-v2",
            Network::ResNet18 => "resnet18",
            Network::ResNet34 => "resnet34",
            Network::SqueezeNet1_0 => "squeezenet1_0",
            Network::SqueezeNet1_1 => "squeezenet1_1",
            Network::Vgg13 => "vgg13",
            Network::Vgg16 => "vgg16",
            Network::Vgg19 => "vgg19",
        }
    }

    /// Name of the traced TorchScript module, must be a valid identifier.
    pub fn module_name(&self) -> String {
        self.stem().replace('-', "_")
    }

    pub fn default_weights_file(&self) -> PathBuf {
        PathBuf::from(format!("weights/{}.ot", self.stem()))
    }

    pub fn default_model_file(&self) -> PathBuf {
        PathBuf::from(format!("model/{}.ot", self.stem()))
    }

    pub fn input_size(&self) -> i64 {
        match self {
            Network::InceptionV3 => 299,
            _ => 224,
        }
    }

    pub fn input_shape(&self) -> [i64; 4] {
        let side = self.input_size();
        [1, 3, side, side]
    }

    pub fn transform(&self) -> Transform {
        match self {
            Network::InceptionV3 => Transform {
                resize: 342,
                crop: 299,
                normalization: Normalization::Imagenet,
            },
            _ => Transform::default(),
        }
    }

    pub fn create_varstore(&self) -> nn::VarStore {
        nn::VarStore::new(tch::Device::Cpu)
    }

    pub fn create_network(&self, path: &nn::Path) -> Box<dyn ModuleT> {
        let classes = imagenet::CLASS_COUNT;
        match self {
            Network::AlexNet => Box::new(alexnet::alexnet(path, classes)),
            Network::DenseNet121 => Box::new(densenet::densenet121(path, classes)),
            Network::InceptionV3 => Box::new(inception::v3(path, classes)),
            Network::MobileNetV2 => Box::new(mobilenet::v2(path, classes)),
            Network::ResNet18 => Box::new(resnet::resnet18(path, classes)),
            Network::ResNet34 => Box::new(resnet::resnet34(path, classes)),
            Network::SqueezeNet1_0 => Box::new(squeezenet::v1_0(path, classes)),
            Network::SqueezeNet1_1 => Box::new(squeezenet::v1_1(path, classes)),
            Network::Vgg13 => Box::new(vgg::vgg13(path, classes)),
            Network::Vgg16 => Box::new(vgg::vgg16(path, classes)),
            Network::Vgg19 => Box::new(vgg::vgg19(path, classes)),
        }
    }

    /// Loads pretrained weights into a store that already holds this network's variables.
    ///
    /// Fails when the file misses any variable, e.g. weights of another architecture.
    pub fn load_weights(&self, vs: &mut nn::VarStore, weight_file: &Path) -> anyhow::Result<()> {
        vs.load(weight_file).with_context(|| {
            format!(
                "Loading {} weights from {}",
                self.stem(),
                weight_file.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_files() {
        let network = Network::default();
        assert_eq!(Network::ResNet34, network);
        assert_eq!(PathBuf::from("weights/resnet34.ot"), network.default_weights_file());
        assert_eq!(PathBuf::from("model/resnet34.ot"), network.default_model_file());
    }

    #[test]
    fn test_value_names_match_stems() {
        for network in Network::value_variants() {
            let value = network.to_possible_value().expect("every network is selectable");
            assert_eq!(network.stem(), value.get_name());
            assert_eq!(Ok(*network), Network::from_str(network.stem(), false));
        }
    }

    #[test]
    fn test_module_name() {
        assert_eq!("inception_v3", Network::InceptionV3.module_name());
        assert_eq!("squeezenet1_1", Network::SqueezeNet1_1.module_name());
    }

    #[test]
    fn test_input_shape() {
        assert_eq!([1, 3, 224, 224], Network::ResNet34.input_shape());
        assert_eq!([1, 3, 299, 299], Network::InceptionV3.input_shape());
        assert_eq!(299, Network::InceptionV3.transform().crop);
    }

    #[test]
    fn test_weights_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let weights = dir.path().join("resnet18.ot");

        let vs = Network::ResNet18.create_varstore();
        let _net = Network::ResNet18.create_network(&vs.root());
        vs.save(&weights).unwrap();

        let mut vs = Network::ResNet34.create_varstore();
        let _net = Network::ResNet34.create_network(&vs.root());
        assert!(Network::ResNet34.load_weights(&mut vs, &weights).is_err());

        let mut vs = Network::ResNet18.create_varstore();
        let _net = Network::ResNet18.create_network(&vs.root());
        assert!(Network::ResNet18.load_weights(&mut vs, &weights).is_ok());
    }
}
