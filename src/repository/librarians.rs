//! Librarians repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{CreateLibrarian, Librarian, LibrarianQuery, Role, UpdateLibrarian},
};

use super::filter::{push_filters, push_page, Filter};

#[derive(Clone)]
pub struct LibrariansRepository {
    pool: Pool<Postgres>,
}

impl LibrariansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn filters(query: &LibrarianQuery) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(search) = &query.search {
            if !search.is_empty() {
                filters.push(Filter::Search(
                    &["username", "first_name", "last_name", "email"],
                    search.clone(),
                ));
            }
        }
        if let Some(role) = query.role {
            filters.push(Filter::EqText("role", role.as_str().to_string()));
        }
        filters
    }

    /// List librarian accounts matching the query
    pub async fn list(&self, query: &LibrarianQuery) -> AppResult<Vec<Librarian>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM librarians");
        push_filters(&mut qb, &Self::filters(query));
        qb.push(" ORDER BY username");
        push_page(&mut qb, query.page, query.per_page);

        let librarians = qb
            .build_query_as::<Librarian>()
            .fetch_all(&self.pool)
            .await?;
        Ok(librarians)
    }

    /// Count librarian accounts matching the query, ignoring pagination
    pub async fn count(&self, query: &LibrarianQuery) -> AppResult<i64> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM librarians");
        push_filters(&mut qb, &Self::filters(query));

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Get librarian by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Librarian> {
        sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Librarian with id {} not found", id)))
    }

    /// Get librarian by username, for login
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<Librarian>> {
        let librarian =
            sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(librarian)
    }

    /// Create a new librarian account; `password` must already be hashed
    pub async fn create(
        &self,
        librarian: &CreateLibrarian,
        password_hash: &str,
    ) -> AppResult<Librarian> {
        let role = librarian.role.unwrap_or(Role::Librarian);

        let created = sqlx::query_as::<_, Librarian>(
            r#"
            INSERT INTO librarians (username, first_name, last_name, email,
                                    password, role, status, created_date)
            VALUES ($1, $2, $3, $4, $5, $6, 'ACTIVE', NOW())
            RETURNING *
            "#,
        )
        .bind(&librarian.username)
        .bind(&librarian.first_name)
        .bind(&librarian.last_name)
        .bind(&librarian.email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Username or email already taken".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(created)
    }

    /// Update a librarian. Demoting the last remaining admin is refused so
    /// the system always keeps at least one.
    pub async fn update(&self, id: i32, changes: &UpdateLibrarian) -> AppResult<Librarian> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Librarian with id {} not found", id))
                })?;

        let demoting = current.role == Role::Admin
            && matches!(changes.role, Some(r) if r != Role::Admin);
        if demoting && Self::admin_count(&mut tx).await? <= 1 {
            return Err(AppError::Conflict(
                "Cannot demote the last admin account".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Librarian>(
            r#"
            UPDATE librarians SET
                username = COALESCE($2, username),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                role = COALESCE($6, role),
                status = COALESCE($7, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(changes.role)
        .bind(changes.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a librarian account. Deleting the last admin is refused.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, Librarian>("SELECT * FROM librarians WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Librarian with id {} not found", id))
                })?;

        if current.role == Role::Admin && Self::admin_count(&mut tx).await? <= 1 {
            return Err(AppError::Conflict(
                "Cannot delete the last admin account".to_string(),
            ));
        }

        sqlx::query("DELETE FROM librarians WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn admin_count(tx: &mut sqlx::Transaction<'_, Postgres>) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM librarians WHERE role = 'ADMIN' AND status = 'ACTIVE'",
        )
        .fetch_one(&mut **tx)
        .await?;
        Ok(count)
    }
}
