use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{
        HeaderValue, StatusCode,
        header::{AUTHORIZATION, HOST, WWW_AUTHENTICATE},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::Error;
use crate::server::AppState;
use crate::types::{Domain, User};

/// The tenant selected by the request's `Host` header.
pub struct ForumDomain(pub Domain);

/// Extractor that requires a live session on the request's domain.
pub struct RequireSession {
    pub domain: Domain,
    pub user: User,
    pub token: String,
}

#[derive(Debug)]
pub enum AuthError {
    MissingHost,
    UnknownDomain,
    MissingAuth,
    InvalidScheme,
    InvalidSession,
    SessionExpired,
    UserBanned,
    InternalError,
}

impl From<Error> for AuthError {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound(_) => AuthError::InvalidSession,
            Error::SessionExpired => AuthError::SessionExpired,
            Error::UserBanned => AuthError::UserBanned,
            other => {
                tracing::error!(error = %other, "Session lookup failed");
                AuthError::InternalError
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingHost => (StatusCode::BAD_REQUEST, "Missing Host header"),
            AuthError::UnknownDomain => (StatusCode::NOT_FOUND, "Unknown forum"),
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid session"),
            AuthError::SessionExpired => (StatusCode::UNAUTHORIZED, "Session expired"),
            AuthError::UserBanned => (StatusCode::FORBIDDEN, "User is banned"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"orangeforum\""),
            );
        }

        response
    }
}

/// Drops a trailing `:port` from a Host value; the rest is kept verbatim.
#[must_use]
pub fn strip_port(host: &str) -> &str {
    let Some((name, port)) = host.rsplit_once(':') else {
        return host;
    };
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return host;
    }
    // A bare IPv6 literal has colons of its own and no port.
    if name.contains(':') && !name.ends_with(']') {
        return host;
    }
    name
}

/// Reads `Authorization: Bearer <token>`. `Ok(None)` when the header is absent.
pub fn bearer_token(header: Option<&str>) -> Result<Option<&str>, AuthError> {
    let Some(header) = header else {
        return Ok(None);
    };
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidScheme)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::InvalidSession);
    }
    Ok(Some(token))
}

fn resolve_domain(parts: &Parts, state: &AppState) -> Result<Domain, AuthError> {
    let host = parts
        .headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingHost)?;

    match state.forum.domains().get(strip_port(host)) {
        Ok(domain) => Ok(domain),
        Err(Error::NotFound(_)) => Err(AuthError::UnknownDomain),
        Err(e) => {
            tracing::error!(error = %e, "Domain lookup failed");
            Err(AuthError::InternalError)
        }
    }
}

impl FromRequestParts<Arc<AppState>> for ForumDomain {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_domain(parts, state).map(ForumDomain)
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let domain = resolve_domain(parts, state)?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let token = bearer_token(auth_header)?
            .ok_or(AuthError::MissingAuth)?
            .to_string();

        let user_id = state.forum.sessions().resolve(domain.id, &token)?;
        let user = state.forum.users().get_by_id(domain.id, user_id)?;

        Ok(RequireSession {
            domain,
            user,
            token,
        })
    }
}
