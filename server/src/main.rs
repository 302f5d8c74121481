mod config;
mod routes;
mod state;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use simplelog::LevelFilter;

use crate::config::ServerConfig;
use crate::state::AppState;

#[derive(Parser)]
#[clap(about = "Serves predictions of a converted model over HTTP.")]
pub struct Args {
    /// Address to listen on.
    #[clap(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// TorchScript model file.
    #[clap(short, long, env = "MODEL_PATH", default_value = "model/resnet34.ot")]
    model: String,

    /// Image used by the prediction self check.
    #[clap(long, default_value = "tests/fixtures/lion.jpg")]
    fixture: String,

    /// Directory for uploads of the upload self check.
    #[clap(long, default_value = "tmp/check_image_upload")]
    upload_dir: String,

    /// Maximum upload size, in bytes.
    #[clap(long, default_value_t = 10 * 1024 * 1024)]
    max_upload_size: usize,

    /// Number of best classes in a prediction.
    #[clap(long, default_value_t = 5)]
    top: usize,

    /// Number of HTTP workers, all cores by default.
    #[clap(short, long)]
    workers: Option<usize>,

    /// Log level.
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    vision::init_logger(args.log_level)?;

    let config = ServerConfig::from(&args);
    let state = web::Data::new(AppState::load(config.clone()).context("Loading the model")?);

    log::info!("Listening on {}", config.bind);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes::config)
    })
    .bind(config.bind.as_str())?
    .workers(config.workers)
    .run()
    .await?;

    Ok(())
}
