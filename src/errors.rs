use actix_web::{error::BlockingError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::checkout::StockFailure;
use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{message}")]
    BadRequest {
        message: String,
        failures: Vec<StockFailure>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            failures: Vec::new(),
        }
    }
}

/// Error body returned for every 4xx/5xx except 401.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Present when checkout was rejected for stock reasons.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StockFailureResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockFailureResponse {
    /// `InsufficientStock`, `UnknownProduct` or `InvalidQuantity`.
    pub error_name: String,
    pub stock_product_id: Uuid,
    pub requested_quantity: i32,
    pub stock_quantity: Option<i32>,
}

impl From<&StockFailure> for StockFailureResponse {
    fn from(f: &StockFailure) -> Self {
        StockFailureResponse {
            error_name: format!("{:?}", f.error_name),
            stock_product_id: f.stock_product_id,
            requested_quantity: f.requested_quantity,
            stock_quantity: f.stock_quantity,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::StockUnavailable(failures) => AppError::BadRequest {
                message: DomainError::StockUnavailable(Vec::new()).to_string(),
                failures,
            },
            DomainError::ProductNotFound(_)
            | DomainError::InvalidQuantity(_)
            | DomainError::InsufficientStock { .. }
            | DomainError::EmptyCart => AppError::bad_request(e.to_string()),
            DomainError::LineItemNotFound(_) => AppError::NotFound(e.to_string()),
            DomainError::AlreadyCheckedOut => AppError::Conflict(e.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<BlockingError> for AppError {
    fn from(e: BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::Unauthorized => return HttpResponse::Unauthorized().finish(),
            AppError::Internal(msg) => {
                log::error!("request failed: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let failures = match self {
            AppError::BadRequest { failures, .. } => {
                failures.iter().map(StockFailureResponse::from).collect()
            }
            _ => Vec::new(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse { error, failures })
    }
}
