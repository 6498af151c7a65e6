//! Administration endpoints: staff accounts and the dashboard

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Capability, CreateLibrarian, Librarian, LibrarianQuery, UpdateLibrarian},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Most-borrowed catalog entry
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct TopBook {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub loan_count: i64,
}

/// Headline counters for the staff dashboard
#[derive(Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_books: i64,
    pub total_copies: i64,
    pub active_members: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub pending_fines: i64,
    pub pending_fines_total: Decimal,
    pub recent_loans: Vec<crate::models::LoanDetails>,
    pub top_books: Vec<TopBook>,
}

/// Dashboard statistics
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardStats),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    claims.require(Capability::ViewReports)?;

    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}

/// List librarian accounts
#[utoipa::path(
    get,
    path = "/admin/librarians",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(LibrarianQuery),
    responses(
        (status = 200, description = "Librarian accounts", body = PaginatedLibrarians),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_librarians(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LibrarianQuery>,
) -> AppResult<Json<PaginatedResponse<Librarian>>> {
    claims.require(Capability::ManageStaff)?;

    let (librarians, total) = state.services.staff.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        librarians,
        total,
        query.page,
        query.per_page,
    )))
}

/// Create a librarian account
#[utoipa::path(
    post,
    path = "/admin/librarians",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateLibrarian,
    responses(
        (status = 201, description = "Librarian created", body = Librarian),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn create_librarian(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLibrarian>,
) -> AppResult<(StatusCode, Json<Librarian>)> {
    claims.require(Capability::ManageStaff)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let librarian = state.services.staff.create(&request).await?;
    Ok((StatusCode::CREATED, Json(librarian)))
}

/// Update a librarian account
#[utoipa::path(
    put,
    path = "/admin/librarians/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Librarian ID")),
    request_body = UpdateLibrarian,
    responses(
        (status = 200, description = "Librarian updated", body = Librarian),
        (status = 404, description = "Librarian not found"),
        (status = 409, description = "Would demote the last admin")
    )
)]
pub async fn update_librarian(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateLibrarian>,
) -> AppResult<Json<Librarian>> {
    claims.require(Capability::ManageStaff)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let librarian = state.services.staff.update(id, &request).await?;
    Ok(Json(librarian))
}

/// Delete a librarian account; own account and the last admin are protected
#[utoipa::path(
    delete,
    path = "/admin/librarians/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Librarian ID")),
    responses(
        (status = 204, description = "Librarian deleted"),
        (status = 404, description = "Librarian not found"),
        (status = 409, description = "Account is protected")
    )
)]
pub async fn delete_librarian(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Capability::ManageStaff)?;
    if claims.user_id == id {
        return Err(AppError::Conflict(
            "Cannot delete your own account".to_string(),
        ));
    }

    state.services.staff.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
