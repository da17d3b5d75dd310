use std::convert::Infallible;
use std::sync::Arc;

use log::{error, warn};
use serde::Serialize;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

use super::types::{
    ApiError, ApiResponse, HealthResponse, ListResponse, MessageResponse, SignatureRequest,
};
use crate::agreement::AgreementDraft;
use crate::attendance::{SessionEntryDraft, SessionEntryUpdate, SignatureParty};
use crate::configuration::types::PaginationConfig;
use crate::error_handling::types::StorageError;
use crate::storage::filters::{self, RawQuery};
use crate::storage::storage_trait::Storage;
use crate::storage::types::PageInfo;

pub type Route = BoxedFilter<(Response,)>;

/// Signature images are sent inline, so bodies may be large.
const MAX_BODY_BYTES: u64 = 5 * 1024 * 1024;

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    reply::with_status(reply::json(body), status).into_response()
}

fn error_reply(err: &StorageError) -> Response {
    match err {
        StorageError::NotFound(_) => json_reply(&ApiError::new(err.to_string()), StatusCode::NOT_FOUND),
        StorageError::Validation(_) => {
            warn!("Rejected request: {}", err);
            json_reply(&ApiError::new(err.to_string()), StatusCode::BAD_REQUEST)
        }
        StorageError::ConnectionFailed(_)
        | StorageError::MigrationFailed(_)
        | StorageError::QueryFailed(_) => {
            error!("Database failure while handling request: {}", err);
            json_reply(
                &ApiError::with_detail("Database error", err.to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

fn bad_request(message: String) -> Response {
    json_reply(&ApiError::new(message), StatusCode::BAD_REQUEST)
}

fn parse_path_id(raw: &str, what: &str) -> Result<i32, Response> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| bad_request(format!("Invalid {} id", what)))
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// GET /health
pub fn health_route(storage: Arc<dyn Storage>) -> Route {
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(move || {
            let storage = storage.clone();
            async move {
                let res = match storage.ping().await {
                    Ok(()) => json_reply(
                        &HealthResponse {
                            status: "ok",
                            database: "up",
                        },
                        StatusCode::OK,
                    ),
                    Err(e) => {
                        error!("Health check failed: {}", e);
                        json_reply(
                            &HealthResponse {
                                status: "degraded",
                                database: "down",
                            },
                            StatusCode::SERVICE_UNAVAILABLE,
                        )
                    }
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

// ---------------------------------------------------------------------------
// ITA agreements
// ---------------------------------------------------------------------------

/// GET /ita-master
pub fn list_agreements_route(storage: Arc<dyn Storage>, limits: PaginationConfig) -> Route {
    warp::path("ita-master")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<RawQuery>())
        .and_then(move |query: RawQuery| {
            let storage = storage.clone();
            let limits = limits.clone();
            async move {
                let filter = match filters::agreement_filter(&query) {
                    Ok(f) => f,
                    Err(e) => return Ok::<_, Rejection>(bad_request(e.to_string())),
                };
                let page = filters::pagination(&query, &limits);
                let res = match storage.list_agreements(&filter, page).await {
                    Ok(paged) => json_reply(
                        &ListResponse {
                            success: true,
                            pagination: PageInfo::new(page, paged.total),
                            data: paged.items,
                        },
                        StatusCode::OK,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// GET /ita-master/stats/overview
pub fn agreement_stats_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("ita-master" / "stats" / "overview")
        .and(warp::get())
        .and_then(move || {
            let storage = storage.clone();
            async move {
                let res = match storage.agreement_stats().await {
                    Ok(stats) => json_reply(&ApiResponse::ok(stats), StatusCode::OK),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// GET /ita-master/:id
pub fn get_agreement_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("ita-master" / String)
        .and(warp::get())
        .and_then(move |id_str: String| {
            let storage = storage.clone();
            async move {
                let id = match parse_path_id(&id_str, "ITA agreement") {
                    Ok(id) => id,
                    Err(res) => return Ok::<_, Rejection>(res),
                };
                let res = match storage.get_agreement(id).await {
                    Ok(detail) => json_reply(&ApiResponse::ok(detail), StatusCode::OK),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// POST /ita-master
pub fn create_agreement_route(storage: Arc<dyn Storage>) -> Route {
    warp::path("ita-master")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body::<AgreementDraft>())
        .and_then(move |draft: AgreementDraft| {
            let storage = storage.clone();
            async move {
                let input = match draft.validate() {
                    Ok(input) => input,
                    Err(e) => return Ok::<_, Rejection>(error_reply(&e.into())),
                };
                let res = match storage.create_agreement(&input).await {
                    Ok(detail) => json_reply(
                        &ApiResponse::with_message(detail, "ITA agreement created successfully"),
                        StatusCode::CREATED,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// PUT /ita-master/:id
pub fn update_agreement_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("ita-master" / String)
        .and(warp::put())
        .and(json_body::<AgreementDraft>())
        .and_then(move |id_str: String, draft: AgreementDraft| {
            let storage = storage.clone();
            async move {
                let id = match parse_path_id(&id_str, "ITA agreement") {
                    Ok(id) => id,
                    Err(res) => return Ok::<_, Rejection>(res),
                };
                let input = match draft.validate() {
                    Ok(input) => input,
                    Err(e) => return Ok::<_, Rejection>(error_reply(&e.into())),
                };
                let res = match storage.update_agreement(id, &input).await {
                    Ok(detail) => json_reply(
                        &ApiResponse::with_message(detail, "ITA agreement updated successfully"),
                        StatusCode::OK,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// DELETE /ita-master/:id
pub fn delete_agreement_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("ita-master" / String)
        .and(warp::delete())
        .and_then(move |id_str: String| {
            let storage = storage.clone();
            async move {
                let id = match parse_path_id(&id_str, "ITA agreement") {
                    Ok(id) => id,
                    Err(res) => return Ok::<_, Rejection>(res),
                };
                let res = match storage.delete_agreement(id).await {
                    Ok(_) => json_reply(
                        &MessageResponse {
                            success: true,
                            message: "ITA agreement deleted successfully".into(),
                        },
                        StatusCode::OK,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

// ---------------------------------------------------------------------------
// Signed ITA attendance
// ---------------------------------------------------------------------------

/// GET /signed-ita-attendance
pub fn list_entries_route(storage: Arc<dyn Storage>, limits: PaginationConfig) -> Route {
    warp::path("signed-ita-attendance")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<RawQuery>())
        .and_then(move |query: RawQuery| {
            let storage = storage.clone();
            let limits = limits.clone();
            async move {
                let filter = match filters::session_entry_filter(&query) {
                    Ok(f) => f,
                    Err(e) => return Ok::<_, Rejection>(bad_request(e.to_string())),
                };
                let page = filters::pagination(&query, &limits);
                let res = match storage.list_session_entries(&filter, page).await {
                    Ok(paged) => json_reply(
                        &ListResponse {
                            success: true,
                            pagination: PageInfo::new(page, paged.total),
                            data: paged.items,
                        },
                        StatusCode::OK,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// GET /signed-ita-attendance/stats/overview
pub fn entry_stats_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("signed-ita-attendance" / "stats" / "overview")
        .and(warp::get())
        .and_then(move || {
            let storage = storage.clone();
            async move {
                let res = match storage.session_entry_stats().await {
                    Ok(stats) => json_reply(&ApiResponse::ok(stats), StatusCode::OK),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// GET /signed-ita-attendance/progress/:ita_master_id
pub fn progress_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("signed-ita-attendance" / "progress" / String)
        .and(warp::get())
        .and_then(move |id_str: String| {
            let storage = storage.clone();
            async move {
                let id = match parse_path_id(&id_str, "ITA agreement") {
                    Ok(id) => id,
                    Err(res) => return Ok::<_, Rejection>(res),
                };
                let res = match storage.progress(id).await {
                    Ok(view) => json_reply(&ApiResponse::ok(view), StatusCode::OK),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// GET /signed-ita-attendance/:id
pub fn get_entry_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("signed-ita-attendance" / String)
        .and(warp::get())
        .and_then(move |id_str: String| {
            let storage = storage.clone();
            async move {
                let id = match parse_path_id(&id_str, "attendance record") {
                    Ok(id) => id,
                    Err(res) => return Ok::<_, Rejection>(res),
                };
                let res = match storage.get_session_entry(id).await {
                    Ok(detail) => json_reply(&ApiResponse::ok(detail), StatusCode::OK),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// POST /signed-ita-attendance
pub fn create_entry_route(storage: Arc<dyn Storage>) -> Route {
    warp::path("signed-ita-attendance")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body::<SessionEntryDraft>())
        .and_then(move |draft: SessionEntryDraft| {
            let storage = storage.clone();
            async move {
                let entry = match draft.validate() {
                    Ok(entry) => entry,
                    Err(e) => return Ok::<_, Rejection>(error_reply(&e.into())),
                };
                let res = match storage.create_session_entry(&entry).await {
                    Ok(detail) => json_reply(
                        &ApiResponse::with_message(
                            detail,
                            "ITA attendance record created successfully",
                        ),
                        StatusCode::CREATED,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// PUT /signed-ita-attendance/:id
pub fn update_entry_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("signed-ita-attendance" / String)
        .and(warp::put())
        .and(json_body::<SessionEntryUpdate>())
        .and_then(move |id_str: String, update: SessionEntryUpdate| {
            let storage = storage.clone();
            async move {
                let id = match parse_path_id(&id_str, "attendance record") {
                    Ok(id) => id,
                    Err(res) => return Ok::<_, Rejection>(res),
                };
                let update = match update.validate() {
                    Ok(update) => update,
                    Err(e) => return Ok::<_, Rejection>(error_reply(&e.into())),
                };
                let res = match storage.update_session_entry(id, &update).await {
                    Ok(detail) => json_reply(
                        &ApiResponse::with_message(
                            detail,
                            "ITA attendance record updated successfully",
                        ),
                        StatusCode::OK,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// DELETE /signed-ita-attendance/:id
pub fn delete_entry_route(storage: Arc<dyn Storage>) -> Route {
    warp::path!("signed-ita-attendance" / String)
        .and(warp::delete())
        .and_then(move |id_str: String| {
            let storage = storage.clone();
            async move {
                let id = match parse_path_id(&id_str, "attendance record") {
                    Ok(id) => id,
                    Err(res) => return Ok::<_, Rejection>(res),
                };
                let res = match storage.delete_session_entry(id).await {
                    Ok(()) => json_reply(
                        &MessageResponse {
                            success: true,
                            message: "ITA attendance record deleted successfully".into(),
                        },
                        StatusCode::OK,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

/// POST /signed-ita-attendance/:id/student-signature
/// POST /signed-ita-attendance/:id/instructor-signature
pub fn sign_entry_route(storage: Arc<dyn Storage>, party: SignatureParty) -> Route {
    let action = match party {
        SignatureParty::Student => "student-signature",
        SignatureParty::Instructor => "instructor-signature",
    };
    warp::path("signed-ita-attendance")
        .and(warp::path::param::<String>())
        .and(warp::path(action))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body::<SignatureRequest>())
        .and_then(move |id_str: String, request: SignatureRequest| {
            let storage = storage.clone();
            async move {
                let id = match parse_path_id(&id_str, "attendance record") {
                    Ok(id) => id,
                    Err(res) => return Ok::<_, Rejection>(res),
                };
                let signature = request.signature.unwrap_or_default();
                let res = match storage.sign_session_entry(id, party, &signature).await {
                    Ok(detail) => json_reply(
                        &ApiResponse::with_message(
                            detail,
                            &format!("{} signature recorded", capitalize(&party.to_string())),
                        ),
                        StatusCode::OK,
                    ),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
        .boxed()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turns warp rejections into the same JSON error envelope the handlers use.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Route not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected an application/json body".to_string(),
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };
    Ok(json_reply(&ApiError::new(message), status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::types::ValidationError;

    #[test]
    fn test_parse_path_id() {
        assert_eq!(parse_path_id("42", "thing").ok(), Some(42));
        assert!(parse_path_id("abc", "thing").is_err());
        assert!(parse_path_id("0", "thing").is_err());
    }

    #[test]
    fn test_error_status_mapping() {
        let not_found = error_reply(&StorageError::NotFound("ITA agreement".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        let invalid = error_reply(&ValidationError::Invalid("bad".into()).into());
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        let db = error_reply(&StorageError::QueryFailed("boom".into()));
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("student"), "Student");
        assert_eq!(capitalize(""), "");
    }
}
