//! Members repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{CreateMember, Member, MemberDetails, MemberQuery, UpdateMember},
};

use super::filter::{push_filters, push_page, Filter};

const DETAILS_SELECT: &str = "SELECT m.id, m.first_name, m.last_name, m.email, m.phone, \
     m.address, m.membership_type, m.join_date, m.status, \
     COALESCE(l.borrowed_books, 0) AS borrowed_books, \
     COALESCE(l.total_loans, 0) AS total_loans \
     FROM members m \
     LEFT JOIN ( \
         SELECT member_id, \
                COUNT(*) FILTER (WHERE status = 'BORROWED') AS borrowed_books, \
                COUNT(*) AS total_loans \
         FROM loans GROUP BY member_id \
     ) l ON l.member_id = m.id";

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn filters(query: &MemberQuery) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(search) = &query.search {
            if !search.is_empty() {
                filters.push(Filter::Search(
                    &["m.first_name", "m.last_name", "m.email"],
                    search.clone(),
                ));
            }
        }
        if let Some(status) = query.status {
            filters.push(Filter::EqText("m.status", status.as_str().to_string()));
        }
        filters
    }

    /// List members matching the query with their borrowing counters
    pub async fn list(&self, query: &MemberQuery) -> AppResult<Vec<MemberDetails>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        push_filters(&mut qb, &Self::filters(query));
        qb.push(" ORDER BY m.last_name, m.first_name, m.id");
        push_page(&mut qb, query.page, query.per_page);

        let members = qb
            .build_query_as::<MemberDetails>()
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    /// Count members matching the query, ignoring pagination
    pub async fn count(&self, query: &MemberQuery) -> AppResult<i64> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM members m");
        push_filters(&mut qb, &Self::filters(query));

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Get member by ID with borrowing counters
    pub async fn get_details(&self, id: i32) -> AppResult<MemberDetails> {
        sqlx::query_as::<_, MemberDetails>(&format!("{} WHERE m.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Get member by email, for login
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    /// Create a new member; `password` must already be hashed
    pub async fn create(&self, member: &CreateMember, password_hash: &str) -> AppResult<Member> {
        let membership_type = member.membership_type.as_deref().unwrap_or("REGULAR");

        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (first_name, last_name, email, phone, address,
                                 membership_type, password, join_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), 'ACTIVE')
            RETURNING *
            "#,
        )
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(&member.address)
        .bind(membership_type)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A member with this email already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(created)
    }

    /// Update a member; absent fields are left unchanged
    pub async fn update(&self, id: i32, changes: &UpdateMember) -> AppResult<Member> {
        let updated = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                membership_type = COALESCE($7, membership_type),
                status = COALESCE($8, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.address)
        .bind(&changes.membership_type)
        .bind(changes.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;

        Ok(updated)
    }

    /// Soft delete: the member row stays for loan history, the account is
    /// deactivated. Refused while the member still holds borrowed books.
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists =
            sqlx::query_scalar::<_, i32>("SELECT id FROM members WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }

        let open_loans = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM loans WHERE member_id = $1 AND status = 'BORROWED'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if open_loans > 0 {
            return Err(AppError::Conflict(
                "Cannot deactivate a member with borrowed books".to_string(),
            ));
        }

        sqlx::query("UPDATE members SET status = 'INACTIVE' WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
