use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use mongodb::error::Error as MongoError;
use thiserror::Error;

/// 应用错误类型
///
/// 响应体为纯文本：业务错误返回提示信息，其余错误原样返回错误描述。
#[derive(Debug, Error)]
pub enum AppError {
    // ==== 常规业务错误 ====
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    // ==== 系统错误 ====
    /// 内存存储触发的唯一索引冲突
    #[error("{0}")]
    DuplicateKey(String),
    #[error("{0}")]
    Mongo(#[from] MongoError),
    #[error("{0}")]
    Bson(#[from] mongodb::bson::ser::Error),
    #[error("{0}")]
    BsonDe(#[from] mongodb::bson::de::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(_: validator::ValidationErrors) -> Self {
        AppError::Validation("Please provide all required fields".to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{:?}", self);
        }
        HttpResponse::build(status).insert_header(ContentType::plaintext()).body(self.to_string())
    }
}
