mod country_handler;
mod swagger;

use actix_web::web;
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // 请求体不是合法 JSON 时按 400 返回解析错误
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    );
    swagger::configure(cfg);
    country_handler::configure(cfg);
}
