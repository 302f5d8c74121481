use vision::{ConversionConfig, Network};

use crate::Args;

impl From<&Args> for ConversionConfig {
    fn from(args: &Args) -> Self {
        let defaults = ConversionConfig::for_network(&args.network);
        Self {
            weights_file: args
                .weights
                .as_ref()
                .map_or(defaults.weights_file, Into::into),
            output_file: args
                .output
                .as_ref()
                .map_or(defaults.output_file, Into::into),
            profile: args.profile,
            download: args.download,
        }
    }
}
