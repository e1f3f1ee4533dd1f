use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use crate::errors::AppError;

// The IntoResponse trait implementation converts AppError into a well-formed HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Unknown ids are client errors and never retried by the master
            AppError::JobNotFound(_)
            | AppError::WorkerNotFound(_)
            | AppError::WorkPackageNotFound(_)
            | AppError::SequenceNotFound(_) => StatusCode::NOT_FOUND,

            AppError::JobNotDone(_) => StatusCode::CONFLICT,

            AppError::Forbidden(_) => StatusCode::FORBIDDEN,

            // Malformed submissions are bad requests
            AppError::InvalidRequest(_) | AppError::Upload(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn maps_errors_to_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(AppError::JobNotFound(id).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::WorkerNotFound(id).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::WorkPackageNotFound(id).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::JobNotDone(id).into_response().status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Forbidden("deletion disabled".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidRequest("missing sequence".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
