//! Catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookDetails, BookQuery, Capability, CreateBook, UpdateBook},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List books with search and filters
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Books matching the query", body = PaginatedBooks)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookDetails>>> {
    let (books, total) = state.services.catalog.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        books,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get a single book with its borrowed copy count
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get(id).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require(Capability::ManageCatalog)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.create(&request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require(Capability::ManageCatalog)?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.update(id, &request).await?;
    Ok(Json(book))
}

/// Delete a book; refused while copies are out on loan
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies still on loan")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require(Capability::ManageCatalog)?;
    state.services.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Distinct catalog categories
#[utoipa::path(
    get,
    path = "/books/categories",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Known categories", body = Vec<String>)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<String>>> {
    let categories = state.services.catalog.categories().await?;
    Ok(Json(categories))
}

/// Distinct catalog authors
#[utoipa::path(
    get,
    path = "/books/authors",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Known authors", body = Vec<String>)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<String>>> {
    let authors = state.services.catalog.authors().await?;
    Ok(Json(authors))
}
