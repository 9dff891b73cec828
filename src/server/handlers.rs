use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::{ForumDomain, RequireSession};
use crate::server::AppState;
use crate::server::dto::{
    DomainResponse, LoginRequest, LogoutAllResponse, SessionResponse, SignupRequest, UserResponse,
};
use crate::server::response::{ApiError, ApiResponse};
use crate::types::RoleFlags;

/// Runs password hashing off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|_| ApiError::internal("Worker task failed"))?
        .map_err(ApiError::from)
}

pub async fn get_domain(ForumDomain(domain): ForumDomain) -> impl IntoResponse {
    Json(ApiResponse::success(DomainResponse::from(domain)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ForumDomain(domain): ForumDomain,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let forum = state.forum.clone();
    let domain_id = domain.id;
    let (user, token) =
        blocking(move || forum.login(domain_id, &req.username, &req.password)).await?;

    tracing::info!(domain = %domain.domain_name, username = %user.username, "Login");

    Ok(Json(ApiResponse::success(SessionResponse {
        token,
        user: user.into(),
    })))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    ForumDomain(domain): ForumDomain,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if domain.read_only {
        return Err(ApiError::forbidden("Forum is read-only"));
    }
    if domain.signup_disabled {
        return Err(ApiError::forbidden("Signup is disabled"));
    }

    let forum = state.forum.clone();
    let domain_id = domain.id;
    let (user, token) = blocking(move || {
        let users = forum.users();
        let user_id = users.create_with_email(
            domain_id,
            &req.username,
            &req.password,
            RoleFlags::USER,
            req.email.as_deref(),
        )?;
        let token = forum.sessions().create(domain_id, user_id)?;
        Ok((users.get_by_id(domain_id, user_id)?, token))
    })
    .await?;

    tracing::info!(domain = %domain.domain_name, username = %user.username, "Signup");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SessionResponse {
            token,
            user: user.into(),
        })),
    ))
}

pub async fn me(session: RequireSession) -> impl IntoResponse {
    Json(ApiResponse::success(UserResponse::from(session.user)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: RequireSession,
) -> Result<impl IntoResponse, ApiError> {
    state
        .forum
        .sessions()
        .destroy(session.domain.id, &session.token)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    session: RequireSession,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = state
        .forum
        .sessions()
        .destroy_all_for_user(session.domain.id, session.user.id)?;
    Ok(Json(ApiResponse::success(LogoutAllResponse { sessions })))
}
