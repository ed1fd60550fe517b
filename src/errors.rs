use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::{DomainError, FieldChecks};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Duplicate order")]
    Duplicate { order_id: String },

    #[error("Missing required fields")]
    Validation { details: FieldChecks },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Duplicate { order_id } => AppError::Duplicate { order_id },
            DomainError::MissingFields(details) => AppError::Validation { details },
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Duplicate { .. } => StatusCode::CONFLICT,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Duplicate { order_id } => HttpResponse::Conflict().json(json!({
                "error": self.to_string(),
                "orderId": order_id,
            })),
            AppError::Validation { details } => HttpResponse::BadRequest().json(json!({
                "error": self.to_string(),
                "details": details,
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;

    use super::*;
    use crate::domain::errors::FieldStatus;

    #[test]
    fn duplicate_returns_409() {
        let err = AppError::Duplicate {
            order_id: "order_1755000000000_ab12".to_string(),
        };
        assert_eq!(err.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_returns_400() {
        let mut details = FieldChecks::new();
        details.insert("items", FieldStatus::Required);
        let err = AppError::Validation { details };
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_returns_500_with_generic_body() {
        let err = AppError::Internal("mail relay exploded".to_string());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_duplicate_maps_to_app_duplicate() {
        let app_err: AppError = DomainError::Duplicate {
            order_id: "x".to_string(),
        }
        .into();
        assert!(matches!(app_err, AppError::Duplicate { .. }));
    }

    #[test]
    fn domain_missing_fields_maps_to_validation() {
        let app_err: AppError = DomainError::MissingFields(FieldChecks::new()).into();
        assert!(matches!(app_err, AppError::Validation { .. }));
    }
}
