//! Librarian (staff account) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{MemberStatus, Role};

/// Librarian model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Librarian {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub status: MemberStatus,
    pub created_date: DateTime<Utc>,
}

/// Librarian list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LibrarianQuery {
    /// Case-insensitive search over username, names and email
    pub search: Option<String>,
    pub role: Option<Role>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create librarian request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLibrarian {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    /// Defaults to LIBRARIAN
    pub role: Option<Role>,
}

/// Update librarian request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLibrarian {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<MemberStatus>,
}
