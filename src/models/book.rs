//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::BookStatus;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub category: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: Option<String>,
    pub status: BookStatus,
    pub added_date: DateTime<Utc>,
}

/// Book with the number of copies currently out on loan
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub category: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: Option<String>,
    pub status: BookStatus,
    pub added_date: DateTime<Utc>,
    pub borrowed_count: i64,
}

/// Book list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive search over title, author and ISBN
    pub search: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub status: Option<BookStatus>,
    /// When true, only books with available copies are returned
    pub available: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub category: Option<String>,
    /// Total copies; available copies start equal to this (default 1)
    pub total_copies: Option<i32>,
    pub shelf_location: Option<String>,
}

/// Update book request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub category: Option<String>,
    /// Changing total copies shifts available copies by the same delta,
    /// clamped at zero
    pub total_copies: Option<i32>,
    pub shelf_location: Option<String>,
    pub status: Option<BookStatus>,
}
