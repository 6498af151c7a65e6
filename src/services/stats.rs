//! Dashboard statistics service

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    api::admin::{DashboardStats, TopBook},
    config::LoansConfig,
    error::AppResult,
    models::{LoanQuery, LoanStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    policy: LoansConfig,
}

impl StatsService {
    pub fn new(repository: Repository, policy: LoansConfig) -> Self {
        Self { repository, policy }
    }

    /// Headline counters for the staff dashboard
    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let pool = &self.repository.pool;

        let total_books =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
                .fetch_one(pool)
                .await?;
        let total_copies = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(total_copies), 0)::BIGINT FROM books",
        )
        .fetch_one(pool)
        .await?;
        let active_members = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM members WHERE status = 'ACTIVE'",
        )
        .fetch_one(pool)
        .await?;
        let active_loans = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM loans WHERE status = 'BORROWED'",
        )
        .fetch_one(pool)
        .await?;
        let overdue_loans = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM loans WHERE status = 'BORROWED' AND due_date < NOW()",
        )
        .fetch_one(pool)
        .await?;
        let pending_fines = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM fines WHERE status = 'PENDING'",
        )
        .fetch_one(pool)
        .await?;
        let pending_fines_total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM fines WHERE status = 'PENDING'",
        )
        .fetch_one(pool)
        .await?;

        let mut recent_loans = self
            .repository
            .loans
            .list(&LoanQuery {
                member_id: None,
                book_id: None,
                status: Some(LoanStatus::Borrowed),
                overdue: None,
                issued_after: None,
                issued_before: None,
                page: Some(1),
                per_page: Some(5),
            })
            .await?;
        let now = Utc::now();
        for loan in &mut recent_loans {
            loan.derive(self.policy.daily_fine_rate, now);
        }

        let top_books = sqlx::query_as::<_, TopBook>(
            "SELECT b.id AS book_id, b.title, b.author, COUNT(l.id) AS loan_count \
             FROM books b JOIN loans l ON l.book_id = b.id \
             GROUP BY b.id, b.title, b.author \
             ORDER BY loan_count DESC, b.id LIMIT 5",
        )
        .fetch_all(pool)
        .await?;

        Ok(DashboardStats {
            total_books,
            total_copies,
            active_members,
            active_loans,
            overdue_loans,
            pending_fines,
            pending_fines_total,
            recent_loans,
            top_books,
        })
    }
}
