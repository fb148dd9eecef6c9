use actix_web::body::MessageBody;
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::middleware::Next;
use actix_web::web::Bytes;
use actix_web::Error;
use common::util::sanitize::sanitize_value;
use log::debug;

fn is_json(req: &ServiceRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

fn bytes_to_payload(buf: Bytes) -> Payload {
    let (_, mut pl) = actix_http::h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}

/// 清洗 JSON 请求体中以 `$` 开头的键名后再交给后续处理；非 JSON 或无法解析的请求体原样放行
pub async fn mongo_sanitize(mut req: ServiceRequest, next: Next<impl MessageBody>) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if is_json(&req) {
        let body = req.extract::<Bytes>().await?;
        let body = match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(mut value) => {
                if sanitize_value(&mut value) {
                    debug!("sanitized request body for {}", req.path());
                    Bytes::from(serde_json::to_vec(&value)?)
                } else {
                    body
                }
            }
            Err(_) => body,
        };
        req.set_payload(bytes_to_payload(body));
    }
    next.call(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::middleware::from_fn;
    use actix_web::{post, test, web, App, HttpResponse, Responder};
    use serde_json::{json, Value};

    #[post("/echo")]
    async fn echo(body: web::Json<Value>) -> impl Responder {
        HttpResponse::Ok().json(body.into_inner())
    }

    #[actix_web::test]
    async fn operator_keys_never_reach_handlers() {
        let app = test::init_service(App::new().wrap(from_fn(mongo_sanitize)).service(echo)).await;
        let req = test::TestRequest::post()
            .uri("/echo")
            .set_json(json!({ "name": { "$ne": "" }, "$where": "1" }))
            .to_request();
        let echoed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(echoed, json!({ "name": { "_ne": "" }, "_where": "1" }));
    }

    #[actix_web::test]
    async fn unparsable_json_passes_through_untouched() {
        let app = test::init_service(App::new().wrap(from_fn(mongo_sanitize)).service(echo)).await;
        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"$where\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }

    #[actix_web::test]
    async fn clean_bodies_pass_through() {
        let app = test::init_service(App::new().wrap(from_fn(mongo_sanitize)).service(echo)).await;
        let body = json!({ "name": "Wakanda", "alpha2Code": "WK" });
        let req = test::TestRequest::post().uri("/echo").set_json(body.clone()).to_request();
        let echoed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(echoed, body);
    }
}
