use std::path::Path;

use anyhow::{ensure, Context};
use clap::ValueEnum;
use image::imageops::{self, FilterType};
use image::DynamicImage;
use ndarray::Array4;
use tch::Tensor;

pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Normalization {
    /// Per-channel ImageNet mean and standard deviation.
    #[clap(name = "imagenet")]
    Imagenet,
    /// Plain [0, 1] scaling.
    #[clap(name = "none")]
    Identity,
}

impl Normalization {
    fn apply(&self, channel: usize, value: f32) -> f32 {
        match self {
            Normalization::Imagenet => (value - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel],
            Normalization::Identity => value,
        }
    }
}

/// Resize, center crop, to-tensor and normalize, in that order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transform {
    /// Target length of the shorter image side.
    pub resize: u32,
    /// Side of the square center crop.
    pub crop: u32,
    pub normalization: Normalization,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            resize: 256,
            crop: 224,
            normalization: Normalization::Imagenet,
        }
    }
}

impl Transform {
    pub fn new(resize: u32, crop: u32, normalization: Normalization) -> anyhow::Result<Self> {
        ensure!(crop > 0, "Crop size must be greater than 0");
        ensure!(
            crop <= resize,
            "Crop size must not exceed resize, crop={crop}, resize={resize}"
        );
        Ok(Self {
            resize,
            crop,
            normalization,
        })
    }

    pub fn input_shape(&self) -> [i64; 4] {
        [1, 3, self.crop as i64, self.crop as i64]
    }

    pub fn load_image<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<Tensor> {
        let path = path.as_ref();
        let image =
            image::open(path).with_context(|| format!("Loading image {}", path.display()))?;
        self.apply(&image)
    }

    pub fn from_memory(&self, data: &[u8]) -> anyhow::Result<Tensor> {
        let image = image::load_from_memory(data).context("Decoding image")?;
        self.apply(&image)
    }

    /// Returns a Float tensor of shape [1, 3, crop, crop].
    pub fn apply(&self, image: &DynamicImage) -> anyhow::Result<Tensor> {
        let array = self.to_array(image)?;
        let shape = array.shape().iter().map(|&d| d as i64).collect::<Vec<_>>();
        let data = array
            .as_slice()
            .context("Image array must have the standard layout")?;
        Ok(Tensor::from_slice(data).view(shape.as_slice()))
    }

    /// Crops the source region that covers the center window of the resized image, then
    /// resizes only that region, so the work is bounded by the crop size.
    pub fn to_array(&self, image: &DynamicImage) -> anyhow::Result<Array4<f32>> {
        let rgb = image.to_rgb8();
        let (width, height) = (rgb.width(), rgb.height());
        let (resized_width, resized_height) = resized_dimensions(width, height, self.resize)?;

        ensure!(
            resized_width >= self.crop && resized_height >= self.crop,
            "Resized image {resized_width}x{resized_height} is smaller than the crop {}",
            self.crop
        );
        let (left, region_width) = source_span(
            width,
            resized_width,
            center_offset(resized_width, self.crop),
            self.crop,
        );
        let (top, region_height) = source_span(
            height,
            resized_height,
            center_offset(resized_height, self.crop),
            self.crop,
        );
        let region = imageops::crop_imm(&rgb, left, top, region_width, region_height).to_image();
        let cropped = imageops::resize(&region, self.crop, self.crop, FilterType::Triangle);

        let side = self.crop as usize;
        Ok(Array4::from_shape_fn((1, 3, side, side), |(_, c, y, x)| {
            let value = cropped[(x as u32, y as u32)][c] as f32 / 255.0;
            self.normalization.apply(c, value)
        }))
    }
}

/// Scales the shorter side to `shorter` preserving the aspect ratio.
/// The longer side is truncated, not rounded.
pub fn resized_dimensions(width: u32, height: u32, shorter: u32) -> anyhow::Result<(u32, u32)> {
    ensure!(
        width > 0 && height > 0,
        "Image must not be empty, given {width}x{height}"
    );
    ensure!(shorter > 0, "Resize target must be greater than 0");

    let scale = |long: u32, short: u32| {
        u32::try_from(u64::from(shorter) * u64::from(long) / u64::from(short))
            .with_context(|| format!("Image {width}x{height} is too elongated"))
    };
    Ok(if width <= height {
        (shorter, scale(height, width)?)
    } else {
        (scale(width, height)?, shorter)
    })
}

/// Start and length of the source pixels that land in `[offset, offset + crop)` once an axis
/// of `length` pixels is scaled to `resized`. Never empty.
pub fn source_span(length: u32, resized: u32, offset: u32, crop: u32) -> (u32, u32) {
    let (length, resized) = (u64::from(length), u64::from(resized));
    let start = (u64::from(offset) * length / resized).min(length - 1);
    let end = ((u64::from(offset) + u64::from(crop)) * length + resized - 1) / resized;
    let end = end.clamp(start + 1, length);
    (start as u32, (end - start) as u32)
}

/// Offset of a centered crop; a half pixel rounds to even.
pub fn center_offset(length: u32, crop: u32) -> u32 {
    let diff = length.saturating_sub(crop);
    let half = diff / 2;
    if diff % 2 == 1 && half % 2 == 1 {
        half + 1
    } else {
        half
    }
}
