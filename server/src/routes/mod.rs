mod checks;
mod index;
mod predict;
mod upload;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(index::index)
        .service(predict::predict)
        .service(upload::check_image_upload)
        .service(checks::check_pytorch_cpu)
        .service(checks::check_image_prediction);
}

fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "status": "error", "message": message.into() }))
}
