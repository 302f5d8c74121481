use actix_web::http::StatusCode;
use actix_web::{get, web, Error, HttpResponse};
use serde_json::json;
use vision::self_check::cpu_self_check;

use super::error_response;
use crate::state::AppState;

#[get("/check_pytorch_cpu")]
pub async fn check_pytorch_cpu() -> Result<HttpResponse, Error> {
    let summary = web::block(cpu_self_check).await?;
    log::info!("route: /check_pytorch_cpu, tensor: {summary:?}");

    let message = format!(
        "PyTorch CPU: self check successful with tensor: {}",
        summary.size_string()
    );
    Ok(HttpResponse::Ok().json(message))
}

/// Runs the served model on the fixture image.
#[get("/check_image_prediction")]
pub async fn check_image_prediction(state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    match web::block(move || state.self_check()).await? {
        Ok(prediction) => {
            log::info!("route: /check_image_prediction, result: {prediction:?}");
            Ok(HttpResponse::Ok().json(json!({ "status": "success", "result": prediction })))
        }
        Err(e) => {
            log::error!("route: /check_image_prediction, error: {e:#}");
            Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Image prediction self check failed: {e:#}"),
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
    async fn test_check_pytorch_cpu() {
        let app = test::init_service(App::new().service(check_pytorch_cpu)).await;
        let req = test::TestRequest::get().uri("/check_pytorch_cpu").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());

        let body: String = test::read_body_json(resp).await;
        assert_eq!("PyTorch CPU: self check successful with tensor: 3", body);
    }

    #[actix_web::test]
    async fn test_check_image_prediction() {
        let fixture = testing::fixture();
        let app = test::init_service(
            App::new()
                .app_data(fixture.state.clone())
                .configure(crate::routes::config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/check_image_prediction")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, resp.status());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!("success", body["status"]);
        assert_eq!(3, body["result"]["top"].as_array().unwrap().len());

        std::fs::remove_file(&fixture.state.config().fixture_file).unwrap();
        let req = test::TestRequest::get()
            .uri("/check_image_prediction")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, resp.status());
    }
}
