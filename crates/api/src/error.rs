//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{ConsumeError, DomainError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Consume workflow error.
    Consume(ConsumeError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Consume(err) => consume_error_to_response(err),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        metrics::counter!("http_errors_total", "status" => status.as_u16().to_string())
            .increment(1);

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = if err.is_invalid_input() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_conflict() {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}

fn consume_error_to_response(err: ConsumeError) -> (StatusCode, String) {
    match err {
        ConsumeError::AccountNotFound(_) | ConsumeError::ProductNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        ConsumeError::Domain(err) => domain_error_to_response(err),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ConsumeError> for ApiError {
    fn from(err: ConsumeError) -> Self {
        ApiError::Consume(err)
    }
}

#[cfg(test)]
mod tests {
    use common::{AggregateId, Money};
    use domain::{AccountError, CoffeeError, MachineError};
    use event_store::{EventStoreError, Version};

    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        assert_eq!(
            status_of(DomainError::Account(AccountError::OwnerRequired)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::Coffee(CoffeeError::InvalidPrice {
                price: Money::zero()
            })),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_missing_things_are_not_found() {
        assert_eq!(
            status_of(DomainError::NotFound {
                aggregate_type: "Account",
                aggregate_id: AggregateId::from("unknown-id"),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::Machine(MachineError::NotLoaded)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ConsumeError::ProductNotFound(AggregateId::from("x"))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict() {
        let err = DomainError::Storage {
            operation: "execute",
            target: "a".to_string(),
            source: EventStoreError::ConcurrencyConflict {
                aggregate_id: AggregateId::from("a"),
                expected: Version::new(1),
                actual: Version::new(2),
            },
        };
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_corrupt_history_is_internal() {
        let err = DomainError::CorruptHistory {
            aggregate_type: "Coffee",
            aggregate_id: AggregateId::from("c1"),
            reason: "bad price".to_string(),
        };
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
