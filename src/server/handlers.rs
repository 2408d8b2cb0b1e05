//! HTTP request handlers for the camwatch API.
//!
//! # Endpoints
//!
//! - `GET /` and `GET /health` - Liveness
//! - `POST /auth/signup`, `POST /auth/login` - Credentials (public)
//! - `POST|GET /camera`, `GET|PUT|DELETE /camera/{id}` - Camera registry (gated)
//! - `GET /alert` - Alert feed (gated)

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request, State,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::alert::{AlertFeed, AlertFilter};
use crate::auth::{CredentialService, PasswordHasher, TokenService};
use crate::camera::{parse_camera_id, CameraRegistry};
use crate::error::{AlertError, AuthError, CameraError, StoreError, ValidationError};
use crate::store::{AlertWithCamera, Camera, CameraFields, Store, UserId};

use super::auth::AuthContext;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state holding the services.
///
/// All services share one injected store handle.
pub struct AppState<S: Store> {
    pub credentials: Arc<CredentialService<S>>,
    pub cameras: Arc<CameraRegistry<S>>,
    pub alerts: Arc<AlertFeed<S>>,
}

impl<S: Store> AppState<S> {
    /// Wire every service to the given store.
    pub fn new(store: Arc<S>, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            credentials: Arc::new(CredentialService::new(Arc::clone(&store), hasher, tokens)),
            cameras: Arc::new(CameraRegistry::new(Arc::clone(&store))),
            alerts: Arc::new(AlertFeed::new(store)),
        }
    }

    /// Token service used for issuing (and by the gate, for verifying).
    pub fn tokens(&self) -> &TokenService {
        self.credentials.tokens()
    }
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            credentials: Arc::clone(&self.credentials),
            cameras: Arc::clone(&self.cameras),
            alerts: Arc::clone(&self.alerts),
        }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /auth/signup` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /camera` and `PUT /camera/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRequest {
    pub name: String,
    pub rtsp_url: String,
    pub location: String,
}

impl From<CameraRequest> for CameraFields {
    fn from(req: CameraRequest) -> Self {
        CameraFields {
            name: req.name,
            rtsp_url: req.rtsp_url,
            location: req.location,
        }
    }
}

/// Query parameters for `GET /alert`.
///
/// Values are kept raw so that bad input becomes a structured validation
/// error instead of a framework rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQueryParams {
    #[serde(default)]
    pub camera_id: Option<String>,

    #[serde(default)]
    pub page: Option<String>,

    #[serde(default)]
    pub limit: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "validation_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Offending request field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            field: None,
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            status: Some(status.as_u16()),
            ..Self::new(error, message)
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response from `POST /auth/signup`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user_id: UserId,
}

/// Response from `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Build the JSON error response and log it by severity:
/// 5xx at ERROR, 404 at DEBUG, other 4xx at WARN.
fn error_response(status: StatusCode, error_type: &str, message: String) -> Response {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            message
        );
    } else if status == StatusCode::NOT_FOUND {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Resource not found: {}",
            message
        );
    } else {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );
    }

    let error_response = ErrorResponse::with_status(error_type, message, status);
    (status, Json(error_response)).into_response()
}

fn validation_response(err: &ValidationError) -> Response {
    let status = StatusCode::BAD_REQUEST;
    warn!(
        error_type = "validation_error",
        status = status.as_u16(),
        field = %err.field,
        "Client error: {}",
        err.message
    );

    let error_response = ErrorResponse::with_status("validation_error", &err.message, status)
        .with_field(&err.field);
    (status, Json(error_response)).into_response()
}

/// Store failures: full detail in the log, a fixed message to the client.
fn store_failure_response(err: &StoreError) -> Response {
    error!(error = %err, "Store operation failed");
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let error_response =
        ErrorResponse::with_status("internal_error", "Internal server error", status);
    (status, Json(error_response)).into_response()
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        validation_response(&self)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::InvalidCredentials => error_response(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid credentials".to_string(),
            ),
            AuthError::UsernameTaken(username) => error_response(
                StatusCode::CONFLICT,
                "conflict",
                format!("Username already taken: {}", username),
            ),
            AuthError::Validation(err) => validation_response(err),
            AuthError::Store(err) => store_failure_response(err),
            AuthError::Internal(message) => {
                error!(error = %message, "Credential operation failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let error_response =
                    ErrorResponse::with_status("internal_error", "Internal server error", status);
                (status, Json(error_response)).into_response()
            }
        }
    }
}

impl IntoResponse for CameraError {
    fn into_response(self) -> Response {
        match &self {
            CameraError::NotFound(_) => error_response(
                StatusCode::NOT_FOUND,
                "not_found",
                "Camera not found".to_string(),
            ),
            CameraError::Validation(err) => validation_response(err),
            CameraError::Store(err) => store_failure_response(err),
        }
    }
}

impl IntoResponse for AlertError {
    fn into_response(self) -> Response {
        match &self {
            AlertError::Validation(err) => validation_response(err),
            AlertError::Store(err) => store_failure_response(err),
        }
    }
}

// =============================================================================
// JSON Body Extractor
// =============================================================================

/// JSON body extractor whose rejection is a [`ValidationError`].
///
/// Missing fields, wrong types, bad syntax and a wrong content type all
/// produce the same structured 400 response as field-level validation.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection_to_validation(&rejection)),
        }
    }
}

fn json_rejection_to_validation(rejection: &JsonRejection) -> ValidationError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ValidationError::new("body", "expected Content-Type: application/json")
        }
        JsonRejection::JsonSyntaxError(_) => ValidationError::new("body", "malformed JSON"),
        JsonRejection::JsonDataError(err) => ValidationError::new("body", err.body_text()),
        other => ValidationError::new("body", other.body_text()),
    }
}

/// Query-string extractor whose rejection is a [`ValidationError`].
///
/// Repeated or undecodable keys get the same structured 400 response as
/// bad parameter values.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(query_rejection_to_validation(&rejection)),
        }
    }
}

fn query_rejection_to_validation(rejection: &QueryRejection) -> ValidationError {
    ValidationError::new("query", rejection.body_text())
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /`
pub async fn root_handler() -> &'static str {
    "Backend is running"
}

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle signup requests.
///
/// # Endpoint
///
/// `POST /auth/signup` with `{"username": "...", "password": "..."}`
///
/// # Response
///
/// - `200 OK`: `{"message": "User created successfully", "userId": 1}`
/// - `400 Bad Request`: Missing or invalid fields
/// - `409 Conflict`: Username already registered
pub async fn signup_handler<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<Json<SignupResponse>, AuthError> {
    let user = state
        .credentials
        .signup(&body.username, &body.password)
        .await?;

    Ok(Json(SignupResponse {
        message: "User created successfully".to_string(),
        user_id: user.id,
    }))
}

/// Handle login requests.
///
/// # Endpoint
///
/// `POST /auth/login` with `{"username": "...", "password": "..."}`
///
/// # Response
///
/// - `200 OK`: `{"token": "<jwt>"}`
/// - `401 Unauthorized`: Unknown username or wrong password
pub async fn login_handler<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let token = state
        .credentials
        .login(&body.username, &body.password)
        .await?;
    Ok(Json(LoginResponse { token }))
}

/// `POST /camera`
pub async fn camera_create_handler<S: Store>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    JsonBody(body): JsonBody<CameraRequest>,
) -> Result<Json<Camera>, CameraError> {
    let camera = state.cameras.create(body.into()).await?;
    info!(user_id = auth.user_id, camera_id = camera.id, "Camera registered by user");
    Ok(Json(camera))
}

/// `GET /camera`
pub async fn camera_list_handler<S: Store>(
    State(state): State<AppState<S>>,
    _auth: AuthContext,
) -> Result<Json<Vec<Camera>>, CameraError> {
    Ok(Json(state.cameras.list().await?))
}

/// `GET /camera/{id}`
pub async fn camera_get_handler<S: Store>(
    State(state): State<AppState<S>>,
    _auth: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<Camera>, CameraError> {
    let id = parse_camera_id(&id)?;
    Ok(Json(state.cameras.get(id).await?))
}

/// `PUT /camera/{id}`
pub async fn camera_update_handler<S: Store>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<CameraRequest>,
) -> Result<Json<Camera>, CameraError> {
    let id = parse_camera_id(&id)?;
    let camera = state.cameras.update(id, body.into()).await?;
    debug!(user_id = auth.user_id, camera_id = id, "Camera updated by user");
    Ok(Json(camera))
}

/// `DELETE /camera/{id}`
///
/// Responds with the plain-text body `Camera deleted`.
pub async fn camera_delete_handler<S: Store>(
    State(state): State<AppState<S>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<&'static str, CameraError> {
    let id = parse_camera_id(&id)?;
    state.cameras.delete(id).await?;
    debug!(user_id = auth.user_id, camera_id = id, "Camera deleted by user");
    Ok("Camera deleted")
}

/// Handle alert listing.
///
/// # Endpoint
///
/// `GET /alert?cameraId=&page=&limit=`
///
/// # Query Parameters
///
/// - `cameraId`: Only alerts for this camera (optional)
/// - `page`: 1-based page number (default: 1)
/// - `limit`: Page size (default: 20, max: 100)
///
/// # Response
///
/// `200 OK` with alerts newest first, each embedding its camera.
pub async fn alert_list_handler<S: Store>(
    State(state): State<AppState<S>>,
    _auth: AuthContext,
    QueryParams(query): QueryParams<AlertQueryParams>,
) -> Result<Json<Vec<AlertWithCamera>>, AlertError> {
    let filter = AlertFilter::from_query(
        query.camera_id.as_deref(),
        query.page.as_deref(),
        query.limit.as_deref(),
    )?;
    Ok(Json(state.alerts.list(filter).await?))
}

// =============================================================================
// Tests
// =============================================================================
