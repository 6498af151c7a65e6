//! Loans repository: the transactional heart of circulation
//!
//! Issue and return each run inside a single database transaction. The
//! member, book and loan rows involved are taken with SELECT ... FOR UPDATE
//! so concurrent calls serialize on the rows they touch, and the partial
//! unique index on open loans backstops the duplicate check.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{days_overdue, fine_amount},
        Book, BookStatus, IssueLoan, LoanDetails, LoanQuery, LoanRecord, LoanStatus, Member,
        MemberStatus, ReturnOutcome,
    },
};

use super::filter::{push_filters, push_page, Filter};

const DETAILS_SELECT: &str = "SELECT l.id, l.book_id, l.member_id, l.issue_date, l.due_date, \
     l.return_date, l.status, l.created_by, \
     b.title AS book_title, b.author AS book_author, \
     m.first_name AS member_first_name, m.last_name AS member_last_name \
     FROM loans l \
     JOIN books b ON b.id = l.book_id \
     JOIN members m ON m.id = l.member_id";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn filters(query: &LoanQuery) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(member_id) = query.member_id {
            filters.push(Filter::EqInt("l.member_id", member_id));
        }
        if let Some(book_id) = query.book_id {
            filters.push(Filter::EqInt("l.book_id", book_id));
        }
        if let Some(status) = query.status {
            filters.push(Filter::EqText("l.status", status.as_str().to_string()));
        }
        if let Some(after) = query.issued_after {
            filters.push(Filter::After("l.issue_date", after));
        }
        if let Some(before) = query.issued_before {
            filters.push(Filter::Before("l.issue_date", before));
        }
        if query.overdue == Some(true) {
            filters.push(Filter::Clause("l.status = 'BORROWED' AND l.due_date < NOW()"));
        }
        filters
    }

    /// List loans matching the query, most recent first
    pub async fn list(&self, query: &LoanQuery) -> AppResult<Vec<LoanDetails>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        push_filters(&mut qb, &Self::filters(query));
        qb.push(" ORDER BY l.issue_date DESC, l.id DESC");
        push_page(&mut qb, query.page, query.per_page);

        let loans = qb
            .build_query_as::<LoanDetails>()
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Count loans matching the query, ignoring pagination
    pub async fn count(&self, query: &LoanQuery) -> AppResult<i64> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM loans l");
        push_filters(&mut qb, &Self::filters(query));

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanRecord> {
        sqlx::query_as::<_, LoanRecord>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan by ID with book and member context
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetails>(&format!("{} WHERE l.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Issue a book to a member.
    ///
    /// Preconditions are checked in order against locked rows: the member
    /// must exist and be active, the book must exist, be available and have
    /// a free copy, and the member must not already hold this title. On
    /// success the loan row is inserted and the available copy count drops
    /// by one, atomically.
    pub async fn issue(
        &self,
        request: &IssueLoan,
        due_date: DateTime<Utc>,
        created_by: Option<i32>,
    ) -> AppResult<LoanRecord> {
        let mut tx = self.pool.begin().await?;

        let member =
            sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1 FOR UPDATE")
                .bind(request.member_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Member with id {} not found", request.member_id))
                })?;
        if member.status != MemberStatus::Active {
            return Err(AppError::InvalidState(
                "Member account is not active".to_string(),
            ));
        }

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(request.book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Book with id {} not found", request.book_id))
            })?;
        if book.status != BookStatus::Available {
            return Err(AppError::InvalidState(
                "Book is not available for loan".to_string(),
            ));
        }
        if book.available_copies <= 0 {
            return Err(AppError::InvalidState(
                "No copies of this book are available".to_string(),
            ));
        }

        let already_borrowed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM loans \
             WHERE member_id = $1 AND book_id = $2 AND status = 'BORROWED'",
        )
        .bind(request.member_id)
        .bind(request.book_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_borrowed > 0 {
            return Err(AppError::Conflict(
                "Member already has this book on loan".to_string(),
            ));
        }

        let loan = sqlx::query_as::<_, LoanRecord>(
            r#"
            INSERT INTO loans (book_id, member_id, issue_date, due_date, status, created_by)
            VALUES ($1, $2, NOW(), $3, 'BORROWED', $4)
            RETURNING *
            "#,
        )
        .bind(request.book_id)
        .bind(request.member_id)
        .bind(due_date)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Member already has this book on loan".to_string())
            }
            _ => AppError::Database(e),
        })?;

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE id = $1")
            .bind(request.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Return a borrowed book.
    ///
    /// The loan is stamped returned, the copy goes back on the shelf and,
    /// when the return is late, a PENDING fine is recorded in the same
    /// transaction at `daily_rate` per started day overdue. The persisted
    /// fine is frozen at the return instant and never recomputed.
    pub async fn return_loan(&self, id: i32, daily_rate: Decimal) -> AppResult<ReturnOutcome> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, LoanRecord>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;
        if loan.status != LoanStatus::Borrowed {
            return Err(AppError::InvalidState(
                "Loan has already been returned".to_string(),
            ));
        }

        let now = Utc::now();

        let updated = sqlx::query_as::<_, LoanRecord>(
            "UPDATE loans SET return_date = $2, status = 'RETURNED' WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        let days = days_overdue(loan.due_date, now);
        let fine = if days > 0 {
            let amount = fine_amount(days, daily_rate);
            sqlx::query(
                r#"
                INSERT INTO fines (loan_id, member_id, amount, reason, status, created_date)
                VALUES ($1, $2, $3, $4, 'PENDING', $5)
                "#,
            )
            .bind(id)
            .bind(loan.member_id)
            .bind(amount)
            .bind(format!("Overdue fine for {} days", days))
            .bind(now)
            .execute(&mut *tx)
            .await?;
            amount
        } else {
            Decimal::ZERO
        };

        tx.commit().await?;

        Ok(ReturnOutcome {
            loan: updated,
            days_overdue: days,
            fine_amount: fine,
        })
    }
}
