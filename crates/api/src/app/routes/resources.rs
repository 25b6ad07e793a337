use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use gridcat_core::ResourceId;
use gridcat_resources::ResourcePatch;

use crate::app::dto::{DataEnvelope, ResourceRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/add", post(add_resource))
        .route("/sendAll", get(send_all))
        .route(
            "/:id",
            get(get_resource)
                .put(replace_resource)
                .patch(patch_resource)
                .delete(delete_resource),
        )
}

fn parse_id(raw: &str) -> Result<ResourceId, Response> {
    raw.parse().map_err(|_| errors::invalid_parameter("id", raw))
}

pub async fn add_resource(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ResourceRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    let resource = match body.into_resource(None) {
        Ok(r) => r,
        Err(violations) => return errors::json_error(StatusCode::BAD_REQUEST, violations),
    };

    match services.resources().add(resource).await {
        Ok(saved) => Json(DataEnvelope::single(saved)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.resources().get(id).await {
        Ok(resource) => Json(DataEnvelope::single(resource)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn replace_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ResourceRequest>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    let resource = match body.into_resource(Some(id)) {
        Ok(r) => r,
        Err(violations) => return errors::json_error(StatusCode::BAD_REQUEST, violations),
    };

    match services.resources().update(resource).await {
        Ok(saved) => Json(DataEnvelope::single(saved)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn patch_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ResourcePatch>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.resources().update_partial(id, patch).await {
        Ok(saved) => Json(DataEnvelope::single(saved)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.resources().remove(id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn send_all(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.resources().send_all().await {
        Ok(report) => report.to_string().into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
