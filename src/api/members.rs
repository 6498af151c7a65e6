//! Member management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Capability, CreateMember, Member, MemberDetails, MemberQuery, UpdateMember},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List members with search and filters
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    params(MemberQuery),
    responses(
        (status = 200, description = "Members matching the query", body = PaginatedMembers),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MemberQuery>,
) -> AppResult<Json<PaginatedResponse<MemberDetails>>> {
    claims.require(Capability::ManageMembers)?;

    let (members, total) = state.services.members.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        members,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get a member with borrowing counters. Members can read their own record.
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = MemberDetails),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MemberDetails>> {
    claims.require_self_or(id, Capability::ManageMembers)?;

    let member = state.services.members.get(id).await?;
    Ok(Json(member))
}

/// Create a member account
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = [])),
    request_body = CreateMember,
    responses(
        (status = 201, description = "Member created", body = Member),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<Member>)> {
    claims.require(Capability::ManageMembers)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = state.services.members.create(&request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Update a member. Members can update their own contact details.
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 404, description = "Member not found")
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(mut request): Json<UpdateMember>,
) -> AppResult<Json<Member>> {
    claims.require_self_or(id, Capability::ManageMembers)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Members cannot change their own standing
    if !claims.role.allows(Capability::ManageMembers) {
        request.status = None;
        request.membership_type = None;
    }

    let member = state.services.members.update(id, &request).await?;
    Ok(Json(member))
}

/// Deactivate a member account; the row stays for loan history
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deactivated"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Member still holds borrowed books")
    )
)]
pub async fn deactivate_member(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Capability::ManageMembers)?;
    state.services.members.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
