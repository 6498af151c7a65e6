//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{CreateMember, Member, Role},
    AppState,
};

use super::AuthenticatedUser;

/// Staff login request
#[derive(Deserialize, ToSchema)]
pub struct StaffLoginRequest {
    pub username: String,
    pub password: String,
}

/// Member login request
#[derive(Deserialize, ToSchema)]
pub struct MemberLoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with JWT token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub name: String,
    pub role: Role,
}

/// Registration response
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub token: String,
    pub member: Member,
}

/// Current token holder
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub user_id: i32,
    pub sub: String,
    pub role: Role,
}

/// Staff login with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = StaffLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn staff_login(
    State(state): State<AppState>,
    Json(request): Json<StaffLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, librarian) = state
        .services
        .auth
        .login_staff(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        user_id: librarian.id,
        name: format!("{} {}", librarian.first_name, librarian.last_name),
        role: librarian.role,
    }))
}

/// Member login with email and password
#[utoipa::path(
    post,
    path = "/auth/member/login",
    tag = "auth",
    request_body = MemberLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn member_login(
    State(state): State<AppState>,
    Json(request): Json<MemberLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, member) = state
        .services
        .auth
        .login_member(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        user_id: member.id,
        name: format!("{} {}", member.first_name, member.last_name),
        role: Role::Member,
    }))
}

/// Self-service member registration
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member registered", body = RegisterResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, member) = state.services.auth.register_member(&request).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { token, member })))
}

/// Logout acknowledgement. Tokens are stateless, so this only confirms the
/// client should drop its copy.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logged out")
    )
)]
pub async fn logout(AuthenticatedUser(_claims): AuthenticatedUser) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Identity behind the presented token
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(AuthenticatedUser(claims): AuthenticatedUser) -> Json<UserInfo> {
    Json(UserInfo {
        user_id: claims.user_id,
        sub: claims.sub,
        role: claims.role,
    })
}
