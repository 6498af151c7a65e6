//! Circulation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{Capability, IssueLoan, LoanDetails, LoanQuery, LoanRecord, ReturnOutcome, Role},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List loans with derived state.
///
/// Staff see everything; members see their own loans regardless of the
/// member_id filter they pass.
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans matching the query", body = PaginatedLoans)
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    if claims.role == Role::Member {
        query.member_id = Some(claims.user_id);
    }

    let (loans, total) = state.services.circulation.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        loans,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get a loan with book and member context and derived state
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.circulation.get(id).await?;
    claims.require_self_or(loan.member_id, Capability::Circulate)?;
    Ok(Json(loan))
}

/// Issue a book to a member
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = IssueLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanRecord),
        (status = 404, description = "Book or member not found"),
        (status = 409, description = "Member already holds this book"),
        (status = 422, description = "Member inactive or no copies available")
    )
)]
pub async fn issue_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<IssueLoan>,
) -> AppResult<(StatusCode, Json<LoanRecord>)> {
    claims.require(Capability::Circulate)?;

    let loan = state
        .services
        .circulation
        .issue(&request, Some(claims.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book, recording an overdue fine when late
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Book returned", body = ReturnOutcome),
        (status = 404, description = "Loan not found"),
        (status = 422, description = "Loan already returned")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnOutcome>> {
    claims.require(Capability::Circulate)?;

    let outcome = state.services.circulation.return_loan(id).await?;
    Ok(Json(outcome))
}

/// Loans for one member, with derived fields. Members can read their own.
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member loans", body = PaginatedLoans)
    )
)]
pub async fn member_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(mut query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    claims.require_self_or(id, Capability::Circulate)?;
    query.member_id = Some(id);

    let (loans, total) = state.services.circulation.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        loans,
        total,
        query.page,
        query.per_page,
    )))
}

/// Open loans past their due date
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans", body = PaginatedLoans),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_overdue(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    claims.require(Capability::ViewReports)?;
    query.overdue = Some(true);

    let (loans, total) = state.services.circulation.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        loans,
        total,
        query.page,
        query.per_page,
    )))
}
