use std::fs;
use std::path::Path;

use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::Url;

use crate::networks::Network;

/// Release hosting the tch-compatible pretrained ImageNet weights.
pub const WEIGHTS_ENDPOINT: &str = "https://github.com/LaurentMazare/tch-rs/releases/download/mw/";

pub fn weights_url(network: &Network) -> anyhow::Result<Url> {
    Url::parse(WEIGHTS_ENDPOINT)?
        .join(&format!("{}.ot", network.stem()))
        .context("Building weights URL")
}

/// Downloads the pretrained weights of `network` into `destination`, replacing any existing file.
pub fn download_weights(network: &Network, destination: &Path) -> anyhow::Result<u64> {
    let url = weights_url(network)?;
    log::info!("Downloading {network} weights from {url}");

    let response = Client::new()
        .get(url.clone())
        .send()
        .and_then(|response| response.error_for_status())
        .with_context(|| format!("Fetching {url}"))?;
    let content = response.bytes().context("Reading weights")?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating directory {}", parent.display()))?;
    }
    fs::write(destination, &content)
        .with_context(|| format!("Writing weights to {}", destination.display()))?;

    log::info!(
        "Stored {} bytes of {network} weights in {}",
        content.len(),
        destination.display()
    );
    Ok(content.len() as u64)
}
