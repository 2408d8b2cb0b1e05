//! Bearer-token gate for protected routes.
//!
//! # Request Flow
//!
//! ```text
//! Authorization: Bearer <token>
//!        │
//!        ▼
//!   auth_gate ──(missing / malformed / invalid)──▶ 401 Unauthorized
//!        │
//!        ▼ AuthContext { user_id } in request extensions
//!   handler(auth: AuthContext, ...)
//! ```
//!
//! Every rejection carries the same body. The concrete reason is only
//! logged.
//!
//! # Example
//!
//! ```ignore
//! use axum::{middleware, routing::get, Router};
//! use camwatch::auth::TokenService;
//! use camwatch::server::auth::auth_gate;
//!
//! let tokens = TokenService::new("secret-key");
//! let app = Router::new()
//!     .route("/camera", get(camera_list_handler))
//!     .route_layer(middleware::from_fn_with_state(tokens, auth_gate));
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::auth::TokenService;
use crate::error::TokenError;
use crate::store::UserId;

use super::handlers::ErrorResponse;

// =============================================================================
// Types
// =============================================================================

/// Why the gate turned a request away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    /// No `Authorization` header
    MissingHeader,

    /// Header present but not `Bearer <token>`
    InvalidScheme,

    /// Token failed verification
    InvalidToken(TokenError),

    /// Handler expected an identity the gate never attached
    MissingContext,
}

impl std::fmt::Display for GateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateRejection::MissingHeader => write!(f, "Missing Authorization header"),
            GateRejection::InvalidScheme => write!(f, "Authorization header is not a bearer token"),
            GateRejection::InvalidToken(err) => write!(f, "Token rejected: {}", err),
            GateRejection::MissingContext => write!(f, "No authenticated identity on request"),
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let status = StatusCode::UNAUTHORIZED;

        // A bad signature may be a forgery attempt; everything else is routine
        match &self {
            GateRejection::InvalidToken(TokenError::InvalidSignature) => {
                warn!(status = status.as_u16(), "Authentication failed: {}", self);
            }
            GateRejection::MissingContext => {
                warn!(status = status.as_u16(), "Authentication failed: {}", self);
            }
            _ => {
                debug!(status = status.as_u16(), "Authentication failed: {}", self);
            }
        }

        let error_response = ErrorResponse::with_status("unauthorized", "Unauthorized", status);
        (status, Json(error_response)).into_response()
    }
}

/// Identity resolved by the gate, scoped to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(GateRejection::MissingContext)
    }
}

// =============================================================================
// Header Parsing
// =============================================================================

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GateRejection> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(GateRejection::MissingHeader)?
        .to_str()
        .map_err(|_| GateRejection::InvalidScheme)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(GateRejection::InvalidScheme)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(GateRejection::InvalidScheme);
    }

    Ok(token)
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Verify the bearer token and attach an [`AuthContext`] to the request.
pub async fn auth_gate(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let user_id = {
        let token = bearer_token(request.headers())?;
        tokens.verify(token).map_err(GateRejection::InvalidToken)?
    };

    request.extensions_mut().insert(AuthContext { user_id });
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
