//! Loan model and the overdue fine arithmetic shared by the return path and
//! the read-time derivation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{LoanState, LoanStatus};

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanRecord {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// Librarian who issued the loan
    pub created_by: Option<i32>,
}

/// Loan joined with book and member names plus derived fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub created_by: Option<i32>,
    pub book_title: String,
    pub book_author: String,
    pub member_first_name: String,
    pub member_last_name: String,
    /// BORROWED, OVERDUE or RETURNED, computed against the current clock
    #[sqlx(default)]
    pub current_state: Option<LoanState>,
    /// Days overdue as of now, zero when on time or returned
    #[sqlx(default)]
    pub days_overdue: Option<i64>,
    /// Fine that would accrue if returned now; informational only
    #[sqlx(default)]
    pub accrued_fine: Option<Decimal>,
}

/// Loan list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub member_id: Option<i32>,
    pub book_id: Option<i32>,
    pub status: Option<LoanStatus>,
    /// When true, only BORROWED loans past their due date are returned
    pub overdue: Option<bool>,
    pub issued_after: Option<DateTime<Utc>>,
    pub issued_before: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Issue (borrow) request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IssueLoan {
    pub book_id: i32,
    pub member_id: i32,
    /// Explicit due date; defaults to issue date plus the configured loan period
    pub due_date: Option<DateTime<Utc>>,
}

/// Result of a return operation. `fine_amount` is zero for an on-time
/// return; a fine row only exists when it is positive.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnOutcome {
    pub loan: LoanRecord,
    pub days_overdue: i64,
    pub fine_amount: Decimal,
}

impl LoanDetails {
    /// Fill in the derived fields against the clock at `at`. Every read path
    /// that hands loans to clients goes through this.
    pub fn derive(&mut self, daily_rate: Decimal, at: DateTime<Utc>) {
        let state = loan_state(self.status, self.due_date, at);
        self.current_state = Some(state);
        if state == LoanState::Overdue {
            let days = days_overdue(self.due_date, at);
            self.days_overdue = Some(days);
            self.accrued_fine = Some(fine_amount(days, daily_rate));
        } else {
            self.days_overdue = Some(0);
            self.accrued_fine = None;
        }
    }
}

/// Whole days overdue, rounded up; any fraction of a day counts as a full day.
/// Returns zero when `at` is on or before `due`.
pub fn days_overdue(due: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    let secs = (at - due).num_seconds();
    if secs <= 0 {
        0
    } else {
        (secs + 86_399) / 86_400
    }
}

/// Fine owed for a number of overdue days at the given daily rate
pub fn fine_amount(days: i64, daily_rate: Decimal) -> Decimal {
    Decimal::from(days) * daily_rate
}

/// Derived state for a loan row at the given instant
pub fn loan_state(status: LoanStatus, due: DateTime<Utc>, at: DateTime<Utc>) -> LoanState {
    match status {
        LoanStatus::Returned => LoanState::Returned,
        LoanStatus::Borrowed if at > due => LoanState::Overdue,
        LoanStatus::Borrowed => LoanState::Borrowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn on_time_return_has_no_overdue_days() {
        let due = due();
        assert_eq!(days_overdue(due, due), 0);
        assert_eq!(days_overdue(due, due - Duration::hours(5)), 0);
    }

    #[test]
    fn partial_days_round_up() {
        let due = due();
        assert_eq!(days_overdue(due, due + Duration::seconds(1)), 1);
        assert_eq!(days_overdue(due, due + Duration::hours(30)), 2);
        assert_eq!(days_overdue(due, due + Duration::days(3)), 3);
        assert_eq!(
            days_overdue(due, due + Duration::days(3) + Duration::minutes(1)),
            4
        );
    }

    #[test]
    fn fine_scales_with_days_and_rate() {
        let one = Decimal::new(100, 2);
        let half = Decimal::new(50, 2);
        assert_eq!(fine_amount(0, one), Decimal::ZERO);
        assert_eq!(fine_amount(2, one), Decimal::new(200, 2));
        assert_eq!(fine_amount(3, half), Decimal::new(150, 2));
    }

    #[test]
    fn derive_fills_state_days_and_accrued_fine() {
        let due = due();
        let mut loan = LoanDetails {
            id: 1,
            book_id: 1,
            member_id: 1,
            issue_date: due - Duration::days(14),
            due_date: due,
            return_date: None,
            status: LoanStatus::Borrowed,
            created_by: None,
            book_title: "Dune".to_string(),
            book_author: "Frank Herbert".to_string(),
            member_first_name: "Ada".to_string(),
            member_last_name: "Lovelace".to_string(),
            current_state: None,
            days_overdue: None,
            accrued_fine: None,
        };

        loan.derive(Decimal::new(100, 2), due + Duration::hours(30));
        assert_eq!(loan.current_state, Some(LoanState::Overdue));
        assert_eq!(loan.days_overdue, Some(2));
        assert_eq!(loan.accrued_fine, Some(Decimal::new(200, 2)));

        loan.derive(Decimal::new(100, 2), due - Duration::hours(1));
        assert_eq!(loan.current_state, Some(LoanState::Borrowed));
        assert_eq!(loan.days_overdue, Some(0));
        assert_eq!(loan.accrued_fine, None);
    }

    #[test]
    fn state_follows_status_and_clock() {
        let due = due();
        assert_eq!(
            loan_state(LoanStatus::Borrowed, due, due - Duration::hours(1)),
            LoanState::Borrowed
        );
        assert_eq!(
            loan_state(LoanStatus::Borrowed, due, due + Duration::hours(1)),
            LoanState::Overdue
        );
        assert_eq!(
            loan_state(LoanStatus::Returned, due, due + Duration::days(30)),
            LoanState::Returned
        );
    }
}
