//! Fine model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{FineResolution, FineStatus};

/// Fine model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FineRecord {
    pub id: i32,
    pub loan_id: i32,
    pub member_id: i32,
    pub amount: Decimal,
    pub reason: String,
    pub status: FineStatus,
    pub created_date: DateTime<Utc>,
    /// Set once, when the fine first leaves PENDING
    pub paid_date: Option<DateTime<Utc>>,
}

/// Fine joined with member and book context
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FineDetails {
    pub id: i32,
    pub loan_id: i32,
    pub member_id: i32,
    pub amount: Decimal,
    pub reason: String,
    pub status: FineStatus,
    pub created_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub member_first_name: String,
    pub member_last_name: String,
    pub book_title: String,
}

/// Fine list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct FineQuery {
    pub member_id: Option<i32>,
    pub status: Option<FineStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Fine status transition request; only PAID and WAIVED are accepted
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFineStatus {
    pub status: FineResolution,
}
