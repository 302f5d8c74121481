use actix_web::{get, HttpResponse};

pub const USAGE: &str = "Send an image payload using curl with the following command:\n\
curl -X POST -H \"Content-Type: multipart/form-data\" -F \"image=@/path/to/your/image.jpg\" http://127.0.0.1:8080/predict";

#[get("/")]
pub async fn index() -> HttpResponse {
    log::info!("route: /");
    HttpResponse::Ok().content_type("text/plain").body(USAGE)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use super::*;

    #[actix_web::test]
    async fn test_index() {
        let app = test::init_service(App::new().service(index)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(StatusCode::OK, resp.status());
        let body = test::read_body(resp).await;
        assert_eq!(USAGE.as_bytes(), &body[..]);
    }
}
