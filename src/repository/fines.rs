//! Fines repository for database operations

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{FineDetails, FineQuery, FineRecord, FineStatus},
};

use super::filter::{push_filters, push_page, Filter};

const DETAILS_SELECT: &str = "SELECT f.id, f.loan_id, f.member_id, f.amount, f.reason, \
     f.status, f.created_date, f.paid_date, \
     m.first_name AS member_first_name, m.last_name AS member_last_name, \
     b.title AS book_title \
     FROM fines f \
     JOIN members m ON m.id = f.member_id \
     JOIN loans l ON l.id = f.loan_id \
     JOIN books b ON b.id = l.book_id";

#[derive(Clone)]
pub struct FinesRepository {
    pool: Pool<Postgres>,
}

impl FinesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn filters(query: &FineQuery) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(member_id) = query.member_id {
            filters.push(Filter::EqInt("f.member_id", member_id));
        }
        if let Some(status) = query.status {
            filters.push(Filter::EqText("f.status", status.as_str().to_string()));
        }
        filters
    }

    /// List fines matching the query, newest first
    pub async fn list(&self, query: &FineQuery) -> AppResult<Vec<FineDetails>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        push_filters(&mut qb, &Self::filters(query));
        qb.push(" ORDER BY f.created_date DESC, f.id DESC");
        push_page(&mut qb, query.page, query.per_page);

        let fines = qb
            .build_query_as::<FineDetails>()
            .fetch_all(&self.pool)
            .await?;
        Ok(fines)
    }

    /// Count fines matching the query, ignoring pagination
    pub async fn count(&self, query: &FineQuery) -> AppResult<i64> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM fines f");
        push_filters(&mut qb, &Self::filters(query));

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Get fine by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<FineRecord> {
        sqlx::query_as::<_, FineRecord>("SELECT * FROM fines WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", id)))
    }

    /// Total PENDING amount owed by a member
    pub async fn pending_total(&self, member_id: i32) -> AppResult<Decimal> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM fines \
             WHERE member_id = $1 AND status = 'PENDING'",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Move a fine out of PENDING to PAID or WAIVED.
    ///
    /// The row is locked for the check so two concurrent transitions cannot
    /// both succeed. Only the PAID transition stamps paid_date, and only
    /// when it is still NULL; a waived fine keeps no payment timestamp.
    pub async fn set_status(&self, id: i32, target: FineStatus) -> AppResult<FineRecord> {
        let mut tx = self.pool.begin().await?;

        let fine = sqlx::query_as::<_, FineRecord>("SELECT * FROM fines WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", id)))?;
        if fine.status != FineStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Fine is already {}",
                fine.status
            )));
        }

        let updated = sqlx::query_as::<_, FineRecord>(
            "UPDATE fines SET status = $2, \
             paid_date = CASE WHEN $2 = 'PAID' THEN COALESCE(paid_date, $3) \
                              ELSE paid_date END \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(target)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
