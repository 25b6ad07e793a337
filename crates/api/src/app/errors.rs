use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use gridcat_infra::ServiceError;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::NotFound(_) => json_error(StatusCode::NOT_FOUND, err.messages()),
        ServiceError::Validation(messages) => json_error(StatusCode::BAD_REQUEST, messages),
        ServiceError::Store(e) => {
            error!(error = %e, "store failure while handling request");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, [UNEXPECTED_ERROR])
        }
    }
}

/// A path or query parameter that could not be converted.
pub fn invalid_parameter(name: &str, raw: &str) -> Response {
    json_error(
        StatusCode::BAD_REQUEST,
        [format!("Invalid value for parameter '{name}': '{raw}'")],
    )
}

/// Unreadable request body. Syntax and data errors are both a 400.
pub fn json_rejection(rejection: JsonRejection) -> Response {
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
        other => other.status(),
    };
    json_error(status, [rejection.body_text()])
}

pub fn json_error<I>(status: StatusCode, messages: I) -> Response
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let errors: Vec<String> = messages.into_iter().map(Into::into).collect();
    (status, axum::Json(json!({ "errors": errors }))).into_response()
}
