use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use biz_service::biz_service::country_service::CountryService;
use biz_service::entitys::country_code::CountryKey;
use biz_service::entitys::country_entity::{CountryEntity, CountryPatch, CountryView};
use common::errors::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(country_list);
    cfg.service(country_create);
    cfg.service(country_get);
    cfg.service(country_update);
    cfg.service(country_delete);
}

fn views(list: Vec<CountryEntity>) -> Vec<CountryView> {
    list.into_iter().map(CountryView::from).collect()
}

#[utoipa::path(
    get,
    path = "/countries",
    tag = "Country",
    summary = "List all countries",
    responses((status = 200, description = "All stored countries", body = Vec<CountryView>))
)]
#[get("/countries")]
pub async fn country_list(service: web::Data<CountryService>) -> Result<impl Responder, AppError> {
    let list = service.list().await?;
    Ok(HttpResponse::Ok().json(views(list)))
}

#[utoipa::path(
    post,
    path = "/countries",
    tag = "Country",
    summary = "Create a country",
    request_body = CountryCreateDto,
    responses(
        (status = 201, description = "Created", body = CountryView),
        (status = 400, description = "Missing field or name already exists", body = String)
    )
)]
#[post("/countries")]
pub async fn country_create(dto: web::Json<CountryCreateDto>, service: web::Data<CountryService>) -> Result<impl Responder, AppError> {
    dto.validate()?;
    let dto = dto.into_inner();
    let (Some(name), Some(alpha2_code), Some(alpha3_code)) = (dto.name, dto.alpha2_code, dto.alpha3_code) else {
        return Err(AppError::Validation("Please provide all required fields".to_string()));
    };
    let created = service.create(&name, &alpha2_code, &alpha3_code).await?;
    Ok(HttpResponse::Created().json(CountryView::from(created)))
}

#[utoipa::path(
    get,
    path = "/countries/{key}",
    tag = "Country",
    summary = "Get by 2/3 letter code (array) or by id (object)",
    params(("key" = String, Path, description = "alpha2Code, alpha3Code or document id")),
    responses(
        (status = 200, description = "Matching countries for a code, or the country for an id", body = CountryView),
        (status = 404, description = "Unknown id", body = String)
    )
)]
#[get("/countries/{key}")]
pub async fn country_get(key: web::Path<String>, service: web::Data<CountryService>) -> Result<impl Responder, AppError> {
    match CountryKey::parse(&key) {
        CountryKey::Code(field, code) => {
            let list = service.find_by_code(field, &code).await?;
            Ok(HttpResponse::Ok().json(views(list)))
        }
        CountryKey::Id(id) => {
            let country = service.get_by_id(&id).await?;
            Ok(HttpResponse::Ok().json(CountryView::from(country)))
        }
    }
}

#[utoipa::path(
    put,
    path = "/countries/{key}",
    tag = "Country",
    summary = "Update by code or id",
    params(("key" = String, Path, description = "alpha2Code, alpha3Code or document id")),
    request_body = CountryUpdateDto,
    responses(
        (status = 200, description = "Updated country", body = CountryView),
        (status = 400, description = "Empty field value", body = String),
        (status = 404, description = "Country does not exist", body = String)
    )
)]
#[put("/countries/{key}")]
pub async fn country_update(
    key: web::Path<String>,
    dto: web::Json<CountryUpdateDto>,
    service: web::Data<CountryService>,
) -> Result<impl Responder, AppError> {
    dto.validate().map_err(|_| AppError::Validation("Fields must not be empty".to_string()))?;
    let patch = dto.into_inner().into_patch();
    let updated = match CountryKey::parse(&key) {
        CountryKey::Code(field, code) => service.update_by_code(field, &code, &patch).await?,
        CountryKey::Id(id) => service.update_by_id(&id, &patch).await?,
    };
    Ok(HttpResponse::Ok().json(CountryView::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/countries/{key}",
    tag = "Country",
    summary = "Delete by code or id",
    params(("key" = String, Path, description = "alpha2Code, alpha3Code or document id")),
    responses(
        (status = 200, description = "Deleted country", body = CountryView),
        (status = 400, description = "Unknown id", body = String),
        (status = 404, description = "Unknown code", body = String)
    )
)]
#[delete("/countries/{key}")]
pub async fn country_delete(key: web::Path<String>, service: web::Data<CountryService>) -> Result<impl Responder, AppError> {
    let deleted = match CountryKey::parse(&key) {
        CountryKey::Code(field, code) => service.delete_by_code(field, &code).await?,
        CountryKey::Id(id) => service.delete_by_id(&id).await?,
    };
    Ok(HttpResponse::Ok().json(CountryView::from(deleted)))
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CountryCreateDto {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub alpha2_code: Option<String>,
    #[validate(required, length(min = 1))]
    pub alpha3_code: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CountryUpdateDto {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub alpha2_code: Option<String>,
    #[validate(length(min = 1))]
    pub alpha3_code: Option<String>,
}

impl CountryUpdateDto {
    pub fn into_patch(self) -> CountryPatch {
        CountryPatch { name: self.name, alpha2_code: self.alpha2_code, alpha3_code: self.alpha3_code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers;
    use crate::middleware::mongo_sanitize;
    use actix_web::body::MessageBody;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{test, App};
    use actix_http::Request;
    use serde_json::{json, Value};

    async fn app() -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
        test::init_service(
            App::new()
                .wrap(from_fn(mongo_sanitize))
                .app_data(web::Data::new(CountryService::with_memory()))
                .configure(handlers::configure),
        )
        .await
    }

    fn wakanda() -> Value {
        json!({ "name": "Wakanda", "alpha2Code": "WK", "alpha3Code": "WKD" })
    }

    async fn create(
        app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
        body: Value,
    ) -> CountryView {
        let req = test::TestRequest::post().uri("/countries").set_json(body).to_request();
        let resp = test::call_service(app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        test::read_body_json(resp).await
    }

    #[actix_web::test]
    async fn wakanda_lifecycle() {
        let app = app().await;
        let created = create(&app, wakanda()).await;
        assert_eq!(created.name, "Wakanda");
        assert_eq!(created.id.len(), 24);

        let req = test::TestRequest::get().uri("/countries/WK").to_request();
        let found: Vec<CountryView> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found, vec![created.clone()]);

        let req = test::TestRequest::delete().uri(&format!("/countries/{}", created.id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let deleted: CountryView = test::read_body_json(resp).await;
        assert_eq!(deleted, created);

        let req = test::TestRequest::get().uri(&format!("/countries/{}", created.id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(resp).await, "Country not found");
    }

    #[actix_web::test]
    async fn get_by_id_returns_the_stored_record() {
        let app = app().await;
        let created = create(&app, wakanda()).await;

        let req = test::TestRequest::get().uri(&format!("/countries/{}", created.id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let found: CountryView = test::read_body_json(resp).await;
        assert_eq!(found, created);
        assert_eq!(found.name, "Wakanda");
        assert_eq!(found.alpha2_code, "WK");
        assert_eq!(found.alpha3_code, "WKD");
        assert_eq!(found.version, 0);
    }

    #[actix_web::test]
    async fn operator_keys_in_body_are_ignored() {
        let app = app().await;
        let created = create(&app, wakanda()).await;

        let req = test::TestRequest::put()
            .uri(&format!("/countries/{}", created.id))
            .set_json(json!({ "$set": { "name": "Hijacked" } }))
            .to_request();
        let unchanged: CountryView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(unchanged, created);
    }

    #[actix_web::test]
    async fn create_without_content_type_is_a_bad_request() {
        let app = app().await;
        let req = test::TestRequest::post()
            .uri("/countries")
            .set_payload(wakanda().to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn list_returns_all_records() {
        let app = app().await;
        create(&app, wakanda()).await;
        create(&app, json!({ "name": "Genovia", "alpha2Code": "GV", "alpha3Code": "GNV" })).await;

        let req = test::TestRequest::get().uri("/countries").to_request();
        let list: Vec<CountryView> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 2);
    }

    #[actix_web::test]
    async fn create_requires_all_three_fields() {
        let app = app().await;
        for body in [
            json!({ "alpha2Code": "WK", "alpha3Code": "WKD" }),
            json!({ "name": "Wakanda", "alpha3Code": "WKD" }),
            json!({ "name": "Wakanda", "alpha2Code": "WK" }),
            json!({ "name": "Wakanda", "alpha2Code": "", "alpha3Code": "WKD" }),
        ] {
            let req = test::TestRequest::post().uri("/countries").set_json(body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(test::read_body(resp).await, "Please provide all required fields");
        }

        let req = test::TestRequest::get().uri("/countries").to_request();
        let list: Vec<CountryView> = test::call_and_read_body_json(&app, req).await;
        assert!(list.is_empty());
    }

    #[actix_web::test]
    async fn create_rejects_duplicate_name_and_codes() {
        let app = app().await;
        create(&app, wakanda()).await;

        let req = test::TestRequest::post()
            .uri("/countries")
            .set_json(json!({ "name": "Wakanda", "alpha2Code": "WA", "alpha3Code": "WAK" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(test::read_body(resp).await, "Country already exists");

        let req = test::TestRequest::post()
            .uri("/countries")
            .set_json(json!({ "name": "New Wakanda", "alpha2Code": "WK", "alpha3Code": "NWK" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("duplicate key"));
    }

    #[actix_web::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app().await;
        let req = test::TestRequest::post()
            .uri("/countries")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn code_lookup_matches_the_field_chosen_by_length() {
        let app = app().await;
        let created = create(&app, wakanda()).await;

        let req = test::TestRequest::get().uri("/countries/WKD").to_request();
        let found: Vec<CountryView> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found, vec![created]);

        // "WK" is only ever an alpha2 code, so a 3-letter lookup must not see it
        let req = test::TestRequest::get().uri("/countries/XWK").to_request();
        let found: Vec<CountryView> = test::call_and_read_body_json(&app, req).await;
        assert!(found.is_empty());
    }

    #[actix_web::test]
    async fn unknown_ids_are_not_found() {
        let app = app().await;
        for uri in ["/countries/64b7f0c2e1a2b3c4d5e6f7a8", "/countries/W", "/countries/Wakanda"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }

        let req = test::TestRequest::put()
            .uri("/countries/64b7f0c2e1a2b3c4d5e6f7a8")
            .set_json(json!({ "name": "Nowhere" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(resp).await, "Country does not exist");

        let req = test::TestRequest::delete().uri("/countries/64b7f0c2e1a2b3c4d5e6f7a8").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(test::read_body(resp).await, "Country does not exist");
    }

    #[actix_web::test]
    async fn update_by_id_and_by_code() {
        let app = app().await;
        let created = create(&app, wakanda()).await;

        let req = test::TestRequest::put()
            .uri(&format!("/countries/{}", created.id))
            .set_json(json!({ "name": "Wakanda Kingdom", "ignored": true }))
            .to_request();
        let updated: CountryView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.name, "Wakanda Kingdom");
        assert_eq!(updated.id, created.id);

        let req = test::TestRequest::put().uri("/countries/WKD").set_json(json!({ "alpha2Code": "WA" })).to_request();
        let updated: CountryView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.alpha2_code, "WA");

        let req = test::TestRequest::put().uri("/countries/WK").set_json(json!({ "name": "Gone" })).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put().uri("/countries/WA").set_json(json!({ "name": "" })).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn delete_by_code_answers_every_request() {
        let app = app().await;
        let created = create(&app, wakanda()).await;

        let req = test::TestRequest::delete().uri("/countries/WKD").to_request();
        let deleted: CountryView = test::call_and_read_body_json(&app, req).await;
        assert_eq!(deleted, created);

        let req = test::TestRequest::delete().uri("/countries/WKD").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(resp).await, "Country does not exist");
    }
}
