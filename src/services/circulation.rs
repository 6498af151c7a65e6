//! Circulation service: issuing, returning and reading loans
//!
//! Read paths decorate loan rows with a state derived against the current
//! clock. The derivation uses the same day-counting arithmetic the return
//! path persists, so a displayed accrued fine always matches what would be
//! recorded if the book came back at that instant.

use chrono::{Duration, Utc};

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::{IssueLoan, LoanDetails, LoanQuery, LoanRecord, ReturnOutcome},
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    policy: LoansConfig,
}

impl CirculationService {
    pub fn new(repository: Repository, policy: LoansConfig) -> Self {
        Self { repository, policy }
    }

    /// Issue a book to a member. Without an explicit due date the configured
    /// loan period applies.
    pub async fn issue(
        &self,
        request: &IssueLoan,
        created_by: Option<i32>,
    ) -> AppResult<LoanRecord> {
        let due_date = request
            .due_date
            .unwrap_or_else(|| Utc::now() + Duration::days(self.policy.loan_period_days));
        let loan = self.repository.loans.issue(request, due_date, created_by).await?;

        tracing::info!(
            loan_id = loan.id,
            book_id = loan.book_id,
            member_id = loan.member_id,
            "book issued"
        );
        Ok(loan)
    }

    /// Return a borrowed book, recording an overdue fine when late
    pub async fn return_loan(&self, id: i32) -> AppResult<ReturnOutcome> {
        let outcome = self
            .repository
            .loans
            .return_loan(id, self.policy.daily_fine_rate)
            .await?;

        tracing::info!(
            loan_id = outcome.loan.id,
            days_overdue = outcome.days_overdue,
            fined = outcome.days_overdue > 0,
            "book returned"
        );
        Ok(outcome)
    }

    /// List loans with derived state and the total matching count
    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let mut loans = self.repository.loans.list(query).await?;
        let total = self.repository.loans.count(query).await?;
        let now = Utc::now();
        for loan in &mut loans {
            loan.derive(self.policy.daily_fine_rate, now);
        }
        Ok((loans, total))
    }

    pub async fn get(&self, id: i32) -> AppResult<LoanDetails> {
        let mut loan = self.repository.loans.get_details(id).await?;
        loan.derive(self.policy.daily_fine_rate, Utc::now());
        Ok(loan)
    }

    pub async fn get_record(&self, id: i32) -> AppResult<LoanRecord> {
        self.repository.loans.get_by_id(id).await
    }
}
