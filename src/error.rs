use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure a route or engine can surface. Handlers return these
/// directly; the `IntoResponse` impl turns them into a tagged JSON body so
/// callers can branch on `error` without parsing the message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Insufficient stock! Only {available} units available.")]
    InsufficientStock { available: i32 },

    #[error("Product not available")]
    ProductUnavailable,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient privileges")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::ProductUnavailable => "product_unavailable",
            AppError::OrderNotFound => "order_not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::Database(_) => "transaction_failure",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
            AppError::ProductUnavailable => StatusCode::CONFLICT,
            AppError::OrderNotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(ref err) = self {
            log::error!("transaction failed: {}", err);
        }

        let status = self.status();
        let mut body = json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let AppError::InsufficientStock { available } = &self {
            body["available"] = json!(available);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            AppError::Validation("bad input".to_string()),
            AppError::InsufficientStock { available: 3 },
            AppError::ProductUnavailable,
            AppError::OrderNotFound,
            AppError::Unauthorized,
            AppError::Forbidden,
        ];

        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn insufficient_stock_reports_available_quantity() {
        let err = AppError::InsufficientStock { available: 42 };
        assert!(err.to_string().contains("42"));
    }
}
