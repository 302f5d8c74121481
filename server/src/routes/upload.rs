use std::fs;
use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use actix_web::web::{Bytes, BytesMut};
use actix_web::{error, post, web, Error, HttpResponse};
use anyhow::{anyhow, Context};
use futures::TryStreamExt;
use serde_json::json;

use crate::state::AppState;

pub struct Upload {
    pub filename: Option<String>,
    pub data: Bytes,
}

impl Upload {
    /// Client file name without any directory part.
    pub fn file_name(&self) -> PathBuf {
        self.filename
            .as_deref()
            .map(Path::new)
            .and_then(Path::file_name)
            .map_or_else(|| PathBuf::from("upload"), PathBuf::from)
    }
}

/// Reads the first field of a multipart payload, at most `limit` bytes.
pub async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Option<Upload>, Error> {
    let Some(mut field) = payload.try_next().await? else {
        return Ok(None);
    };

    let filename = field
        .content_disposition()
        .get_filename()
        .map(ToOwned::to_owned);

    let mut data = BytesMut::new();
    while let Some(chunk) = field.try_next().await? {
        if data.len() + chunk.len() > limit {
            return Err(error::ErrorPayloadTooLarge(format!(
                "Upload exceeds {limit} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    log::debug!("Read upload {filename:?}, {} bytes", data.len());

    Ok(Some(Upload {
        filename,
        data: data.freeze(),
    }))
}

fn store(directory: &Path, upload: &Upload) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Creating directory {}", directory.display()))?;
    let path = directory.join(upload.file_name());
    fs::write(&path, &upload.data).with_context(|| format!("Writing {}", path.display()))?;
    Ok(path)
}

#[post("/check_image_upload")]
pub async fn check_image_upload(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    log::info!("route: /check_image_upload");

    let stored = match read_upload(payload, state.config().max_upload_size).await {
        Ok(Some(upload)) => {
            let directory = state.config().upload_dir.clone();
            web::block(move || store(&directory, &upload)).await?
        }
        Ok(None) => Err(anyhow!("No file in the payload")),
        Err(e) => Err(anyhow!("{e}")),
    };

    let result = match stored {
        Ok(path) => {
            log::info!("Stored upload in {}", path.display());
            json!({ "status": "success", "filepath": path })
        }
        Err(e) => {
            log::error!("route: /check_image_upload, error: {e:#}");
            json!({ "status": "error", "error": format!("{e:#}") })
        }
    };

    Ok(HttpResponse::Ok().json(result))
}
