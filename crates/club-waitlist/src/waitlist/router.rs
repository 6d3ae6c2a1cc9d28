use std::sync::Arc;

use crate::error::AppError;
use axum::{
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde_json::{json, Map, Value};

use super::domain::{PayloadError, RawSubmission};
use super::lifecycle::{FAILURE_MESSAGE, REJECTED_MESSAGE, SUCCESS_MESSAGE};
use super::repository::WaitlistStore;
use super::service::{SubmissionResult, WaitlistSubmissionService};

pub const WAITLIST_PATH: &str = "/api/v1/waitlist";

/// Router builder exposing the signup endpoint.
pub fn waitlist_router<S>(service: Arc<WaitlistSubmissionService<S>>) -> Router
where
    S: WaitlistStore + ?Sized + 'static,
{
    Router::new()
        .route(WAITLIST_PATH, post(submit_handler::<S>))
        .with_state(service)
}

/// Accepts the HTML form encoding or a JSON object of strings. Unreadable
/// bodies are answered with 400 so they never look like a validation 422.
pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<WaitlistSubmissionService<S>>>,
    request: Request,
) -> Result<Response, AppError>
where
    S: WaitlistStore + ?Sized + 'static,
{
    let raw = read_submission(request).await?;
    Ok(submission_response(service.submit(raw).await))
}

async fn read_submission(request: Request) -> Result<RawSubmission, PayloadError> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        let Json(object) = Json::<Map<String, Value>>::from_request(request, &())
            .await
            .map_err(|rejection| PayloadError::Malformed(rejection.body_text()))?;
        RawSubmission::from_json_object(object)
    } else {
        let Form(raw) = Form::<RawSubmission>::from_request(request, &())
            .await
            .map_err(|rejection| PayloadError::Malformed(rejection.body_text()))?;
        Ok(raw)
    }
}

pub(crate) fn submission_response(result: SubmissionResult) -> Response {
    match result {
        SubmissionResult::Success(_) => {
            let payload = json!({
                "status": "success",
                "message": SUCCESS_MESSAGE,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        SubmissionResult::Rejected(violations) => {
            let payload = json!({
                "status": "rejected",
                "message": REJECTED_MESSAGE,
                "violations": violations,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        SubmissionResult::Failure { .. } => {
            let payload = json!({
                "status": "error",
                "message": FAILURE_MESSAGE,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
