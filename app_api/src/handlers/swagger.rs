use crate::handlers::country_handler::*;
use actix_web::{get, web, HttpResponse, Responder};
use biz_service::entitys::country_entity::CountryView;
use common::errors::AppError;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        country_list,
        country_create,
        country_get,
        country_update,
        country_delete,
    ),
    components(schemas(
        CountryView,
        CountryCreateDto,
        CountryUpdateDto,
    )),
    tags(
        (name = "Country", description = "Country CRUD endpoints")
    )
)]
struct ApiDoc;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}

#[get("/openapi.json")]
async fn openapi_json() -> Result<impl Responder, AppError> {
    let body = ApiDoc::openapi().to_json()?;
    Ok(HttpResponse::Ok().content_type("application/json").body(body))
}
