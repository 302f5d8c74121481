use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{post, web, Error, HttpResponse};
use serde_json::json;

use super::error_response;
use super::upload::read_upload;
use crate::state::AppState;

/// Classifies the image in the first multipart field.
#[post("/predict")]
pub async fn predict(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse, Error> {
    log::info!("route: /predict");

    let upload = match read_upload(payload, state.config().max_upload_size).await? {
        Some(upload) => upload,
        None => return Ok(error_response(StatusCode::BAD_REQUEST, "No file in the payload")),
    };

    let image = {
        let state = state.clone();
        web::block(move || state.preprocess(&upload.data)).await?
    };
    let image = match image {
        Ok(image) => image,
        Err(e) => {
            log::error!("route: /predict, invalid image: {e:#}");
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid image: {e:#}"),
            ));
        }
    };

    match web::block(move || state.predict(&image)).await? {
        Ok(prediction) => {
            log::info!("route: /predict, result: {prediction:?}");
            Ok(HttpResponse::Ok().json(json!({ "status": "success", "result": prediction })))
        }
        Err(e) => {
            log::error!("route: /predict, prediction failed: {e:#}");
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Prediction failed: {e:#}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};

    use super::*;
    use crate::routes::testing;

    #[actix_web::test]
    async fn test_predict() {
        let fixture = testing::fixture();
        let app = test::init_service(
            App::new()
                .app_data(fixture.state.clone())
                .configure(crate::routes::config),
        )
        .await;

        let image = testing::png(640, 480);
        let mut classes = Vec::new();
        for _ in 0..2 {
            let req = testing::multipart("/predict", "image.png", &image).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(StatusCode::OK, resp.status());

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!("success", body["status"]);

            let result = &body["result"];
            assert!(result["class"].as_u64().unwrap() < 1000);
            assert!(result["label"].is_string());
            assert_eq!(3, result["top"].as_array().unwrap().len());
            assert_eq!(result["class"], result["top"][0]["class"]);
            classes.push(result["class"].as_u64());
        }
        assert_eq!(classes[0], classes[1]);
    }

    #[actix_web::test]
    async fn test_predict_invalid_image() {
        let fixture = testing::fixture();
        let app = test::init_service(
            App::new()
                .app_data(fixture.state.clone())
                .configure(crate::routes::config),
        )
        .await;

        let req = testing::multipart("/predict", "image.jpg", b"definitely not a jpeg").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, resp.status());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!("error", body["status"]);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid image"));
    }
}
