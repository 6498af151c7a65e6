//! Member model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::MemberStatus;

/// Member model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub membership_type: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub join_date: DateTime<Utc>,
    pub status: MemberStatus,
}

/// Member with borrowing counters for lists and detail views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MemberDetails {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub membership_type: String,
    pub join_date: DateTime<Utc>,
    pub status: MemberStatus,
    /// Loans currently in BORROWED status
    pub borrowed_books: i64,
    /// All loans ever recorded for this member
    pub total_loans: i64,
}

/// Member list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MemberQuery {
    /// Case-insensitive search over first name, last name and email
    pub search: Option<String>,
    pub status: Option<MemberStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Defaults to REGULAR
    pub membership_type: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
}

/// Update member request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMember {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub membership_type: Option<String>,
    pub status: Option<MemberStatus>,
}
