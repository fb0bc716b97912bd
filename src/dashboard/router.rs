use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::CityFilter;
use super::contact::ContactMessage;
use super::roi::RoiInput;
use super::service::{DashboardError, DashboardService, ListingQuery};
use super::session::{Session, SessionId, SessionStore};

/// Header carrying the client's opaque session id between renders.
pub const SESSION_HEADER: &str = "x-session-id";

/// Router builder exposing the dashboard panels over HTTP.
pub fn dashboard_router<S>(service: Arc<DashboardService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/session/login", post(login_handler::<S>))
        .route("/api/v1/session/logout", post(logout_handler::<S>))
        .route("/api/v1/session", get(session_handler::<S>))
        .route("/api/v1/listings", get(listings_handler::<S>))
        .route("/api/v1/roi", post(roi_handler::<S>))
        .route("/api/v1/contact", post(contact_handler::<S>))
        .with_state(service)
}

fn session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| SessionId(value.to_string()))
}

fn error_response(status: StatusCode, message: impl AsRef<str>) -> Response {
    let payload = json!({ "error": message.as_ref() });
    (status, axum::Json(payload)).into_response()
}

fn service_error_response(error: DashboardError) -> Response {
    match error {
        DashboardError::Credentials(err) => {
            error_response(StatusCode::UNAUTHORIZED, err.to_string())
        }
        DashboardError::NotAuthenticated => {
            error_response(StatusCode::UNAUTHORIZED, error.to_string())
        }
        DashboardError::Roi(err) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingsParams {
    #[serde(default)]
    pub(crate) city: Option<String>,
    #[serde(default)]
    pub(crate) min_price: Option<f64>,
    #[serde(default)]
    pub(crate) max_price: Option<f64>,
}

impl ListingsParams {
    fn into_query(self) -> ListingQuery {
        ListingQuery {
            city: self
                .city
                .as_deref()
                .map(CityFilter::from_selector)
                .unwrap_or_default(),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

pub(crate) async fn login_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<LoginRequest>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.login(session_id(&headers), &payload.email, &payload.password) {
        Ok((id, session)) => {
            let body = json!({
                "session_id": id.0,
                "authenticated": session.authenticated,
                "user": session.user,
                "authenticated_at": session.authenticated_at,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn logout_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
{
    // Logout with no session id is still a reset to the logged-out state.
    let result = match session_id(&headers) {
        Some(id) => service.logout(&id),
        None => Ok(Session::logged_out()),
    };

    match result {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn session_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
{
    let result = match session_id(&headers) {
        Some(id) => service.session(&id),
        None => Ok(Session::logged_out()),
    };

    match result {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn listings_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    headers: HeaderMap,
    Query(params): Query<ListingsParams>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = session_id(&headers).unwrap_or_else(|| SessionId(String::new()));
    match service.search_listings(&id, &params.into_query()) {
        Ok(search) => (StatusCode::OK, axum::Json(search)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn roi_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    headers: HeaderMap,
    axum::Json(input): axum::Json<RoiInput>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = session_id(&headers).unwrap_or_else(|| SessionId(String::new()));
    match service.project_roi(&id, input) {
        Ok(projection) => (StatusCode::OK, axum::Json(projection)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn contact_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    headers: HeaderMap,
    axum::Json(message): axum::Json<ContactMessage>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = session_id(&headers).unwrap_or_else(|| SessionId(String::new()));
    match service.send_contact(&id, message) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(err) => service_error_response(err),
    }
}
