pub mod convert;
pub mod inference;
pub mod labels;
pub mod networks;
pub mod self_check;
pub mod transform;
pub mod zoo;

mod logging;
mod timings;

pub use crate::convert::{convert, ConversionConfig, ConversionReport, Profile};
pub use crate::inference::{Model, Prediction, Score};
pub use crate::labels::Labels;
pub use crate::logging::init_logger;
pub use crate::networks::Network;
pub use crate::timings::Timings;
pub use crate::transform::{Normalization, Transform};
