use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::errors::AppError;
use crate::models::CaseRequest;
use crate::service::case_service::CaseService;

pub fn router(service: CaseService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any) // set specific to your clients
        .allow_methods([Method::OPTIONS, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/create-support-case",
            post(create_support_case_handler).options(options_handler),
        )
        .layer(cors)
        .with_state(service)
}

/// `OPTIONS /api/create-support-case` — always 200; the CORS layer supplies
/// the headers.
async fn options_handler() -> StatusCode {
    StatusCode::OK
}

/// `POST /api/create-support-case` — schema validation, then the submission
/// flow. The raw body is deserialized here so malformed JSON yields our own
/// 400 instead of the framework's rejection.
async fn create_support_case_handler(
    State(service): State<CaseService>,
    body: Bytes,
) -> Response {
    let request: CaseRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(&AppError::invalid_request(format!(
                "Request schema invalid: {e}"
            )))
        }
    };

    if let Err(e) = validate(&request) {
        return error_response(&e);
    }

    match service.create_support_case(&request).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Required string fields must be non-empty, not just present.
fn validate(request: &CaseRequest) -> Result<(), AppError> {
    let required = [
        ("formDetails.firstName", &request.form_details.first_name),
        ("formDetails.email", &request.form_details.email),
        ("client.currentUrl", &request.client.current_url),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::invalid_request(format!(
                "Request schema invalid: '{field}' must not be empty"
            )));
        }
    }
    Ok(())
}

/// Validation failures are actionable by the caller and get a descriptive
/// body; everything else is logged in full and surfaced as an opaque 500.
fn error_response(err: &AppError) -> Response {
    if err.is_invalid_request() {
        let body = serde_json::json!({
            "type": "InvalidRequest",
            "message": err.to_string(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    } else {
        error!("Support case submission failed: {err}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
