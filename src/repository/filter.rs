//! Typed WHERE-clause construction for list endpoints
//!
//! List queries collect their optional predicates as [`Filter`] values and
//! apply them through [`push_filters`], which appends the clause to a
//! [`QueryBuilder`] with bound parameters. User input never reaches the SQL
//! text, only the bind list.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

/// A single predicate on a list query
#[derive(Debug, Clone)]
pub enum Filter {
    /// `column = $n`
    EqInt(&'static str, i32),
    /// `column = $n` for text-backed status columns
    EqText(&'static str, String),
    /// `column >= $n` for timestamp lower bounds
    After(&'static str, DateTime<Utc>),
    /// `column <= $n` for timestamp upper bounds
    Before(&'static str, DateTime<Utc>),
    /// Case-insensitive substring match over any of the listed columns
    Search(&'static [&'static str], String),
    /// Fixed predicate with no user-supplied value
    Clause(&'static str),
}

/// Append `WHERE ...` for the given filters; no-op on an empty slice
pub fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for (i, filter) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::EqInt(column, value) => {
                qb.push(*column).push(" = ").push_bind(*value);
            }
            Filter::EqText(column, value) => {
                qb.push(*column).push(" = ").push_bind(value.clone());
            }
            Filter::After(column, value) => {
                qb.push(*column).push(" >= ").push_bind(*value);
            }
            Filter::Before(column, value) => {
                qb.push(*column).push(" <= ").push_bind(*value);
            }
            Filter::Search(columns, term) => {
                let pattern = format!("%{}%", term);
                qb.push("(");
                for (j, column) in columns.iter().enumerate() {
                    if j > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
                }
                qb.push(")");
            }
            Filter::Clause(predicate) => {
                qb.push(*predicate);
            }
        }
    }
}

/// Append `LIMIT ... OFFSET ...` from one-based page parameters
pub fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: Option<i64>, per_page: Option<i64>) {
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let page = page.unwrap_or(1).max(1);
    qb.push(" LIMIT ")
        .push_bind(per_page)
        .push(" OFFSET ")
        .push_bind((page - 1) * per_page);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_render_parameterized_sql() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM books");
        push_filters(
            &mut qb,
            &[
                Filter::EqText("status", "AVAILABLE".to_string()),
                Filter::Search(&["title", "author"], "dune".to_string()),
                Filter::Clause("available_copies > 0"),
            ],
        );
        assert_eq!(
            qb.sql(),
            "SELECT * FROM books WHERE status = $1 \
             AND (title ILIKE $2 OR author ILIKE $3) AND available_copies > 0"
        );
    }

    #[test]
    fn empty_filter_list_leaves_query_untouched() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM loans");
        push_filters(&mut qb, &[]);
        assert_eq!(qb.sql(), "SELECT * FROM loans");
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM members");
        push_page(&mut qb, None, Some(10_000));
        assert_eq!(qb.sql(), "SELECT * FROM members LIMIT $1 OFFSET $2");
    }
}
