//! Fine ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{Capability, FineDetails, FineQuery, FineRecord, Role, UpdateFineStatus},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Outstanding balance for a member
#[derive(Serialize, ToSchema)]
pub struct PendingBalance {
    pub member_id: i32,
    pub pending_total: Decimal,
}

/// List fines. Members see their own, staff see everyone's.
#[utoipa::path(
    get,
    path = "/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(FineQuery),
    responses(
        (status = 200, description = "Fines matching the query", body = PaginatedFines)
    )
)]
pub async fn list_fines(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<FineQuery>,
) -> AppResult<Json<PaginatedResponse<FineDetails>>> {
    if claims.role == Role::Member {
        query.member_id = Some(claims.user_id);
    }

    let (fines, total) = state.services.fines.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        fines,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get a single fine
#[utoipa::path(
    get,
    path = "/fines/{id}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    responses(
        (status = 200, description = "Fine record", body = FineRecord),
        (status = 404, description = "Fine not found")
    )
)]
pub async fn get_fine(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<FineRecord>> {
    let fine = state.services.fines.get(id).await?;
    claims.require_self_or(fine.member_id, Capability::ManageFines)?;
    Ok(Json(fine))
}

/// Mark a PENDING fine paid or waived
#[utoipa::path(
    put,
    path = "/fines/{id}/status",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    request_body = UpdateFineStatus,
    responses(
        (status = 200, description = "Fine resolved", body = FineRecord),
        (status = 404, description = "Fine not found"),
        (status = 422, description = "Fine already resolved")
    )
)]
pub async fn set_fine_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateFineStatus>,
) -> AppResult<Json<FineRecord>> {
    claims.require(Capability::ManageFines)?;

    let fine = state.services.fines.resolve(id, request.status).await?;
    Ok(Json(fine))
}

/// Fines for one member. Members can read their own.
#[utoipa::path(
    get,
    path = "/members/{id}/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member fines", body = PaginatedFines)
    )
)]
pub async fn member_fines(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(mut query): Query<FineQuery>,
) -> AppResult<Json<PaginatedResponse<FineDetails>>> {
    claims.require_self_or(id, Capability::ManageFines)?;
    query.member_id = Some(id);

    let (fines, total) = state.services.fines.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        fines,
        total,
        query.page,
        query.per_page,
    )))
}

/// Total PENDING amount owed by a member
#[utoipa::path(
    get,
    path = "/members/{id}/fines/pending",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Pending balance", body = PendingBalance)
    )
)]
pub async fn pending_balance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<PendingBalance>> {
    claims.require_self_or(id, Capability::ManageFines)?;

    let pending_total = state.services.fines.pending_total(id).await?;
    Ok(Json(PendingBalance {
        member_id: id,
        pending_total,
    }))
}
