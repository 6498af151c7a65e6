//! Books repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookDetails, BookQuery, CreateBook, UpdateBook},
};

use super::filter::{push_filters, push_page, Filter};

const DETAILS_SELECT: &str = "SELECT b.id, b.title, b.author, b.isbn, b.publisher, \
     b.publication_year, b.category, b.total_copies, b.available_copies, \
     b.shelf_location, b.status, b.added_date, \
     (b.total_copies - b.available_copies)::BIGINT AS borrowed_count \
     FROM books b";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn filters(query: &BookQuery) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(search) = &query.search {
            if !search.is_empty() {
                filters.push(Filter::Search(
                    &["b.title", "b.author", "b.isbn"],
                    search.clone(),
                ));
            }
        }
        if let Some(category) = &query.category {
            filters.push(Filter::EqText("b.category", category.clone()));
        }
        if let Some(author) = &query.author {
            filters.push(Filter::EqText("b.author", author.clone()));
        }
        if let Some(status) = query.status {
            filters.push(Filter::EqText("b.status", status.as_str().to_string()));
        }
        if query.available == Some(true) {
            filters.push(Filter::Clause("b.available_copies > 0"));
        }
        filters
    }

    /// List books matching the query, newest first
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<BookDetails>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(DETAILS_SELECT);
        push_filters(&mut qb, &Self::filters(query));
        qb.push(" ORDER BY b.added_date DESC, b.id DESC");
        push_page(&mut qb, query.page, query.per_page);

        let books = qb.build_query_as::<BookDetails>().fetch_all(&self.pool).await?;
        Ok(books)
    }

    /// Count books matching the query, ignoring pagination
    pub async fn count(&self, query: &BookQuery) -> AppResult<i64> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM books b");
        push_filters(&mut qb, &Self::filters(query));

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ID with the borrowed copy count
    pub async fn get_details(&self, id: i32) -> AppResult<BookDetails> {
        sqlx::query_as::<_, BookDetails>(&format!("{} WHERE b.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Create a new book; available copies start equal to total copies
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let total = book.total_copies.unwrap_or(1).max(0);

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, publisher, publication_year,
                               category, total_copies, available_copies,
                               shelf_location, status, added_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, 'AVAILABLE', NOW())
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(&book.category)
        .bind(total)
        .bind(&book.shelf_location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A book with this ISBN already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(created)
    }

    /// Update a book. Changing total copies shifts available copies by the
    /// same delta, clamped at zero; the row is locked so a concurrent issue
    /// or return cannot race the adjustment.
    pub async fn update(&self, id: i32, changes: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let (total, available) = match changes.total_copies {
            Some(new_total) => {
                if new_total < 0 {
                    return Err(AppError::Validation(
                        "total_copies cannot be negative".to_string(),
                    ));
                }
                let delta = new_total - current.total_copies;
                (new_total, (current.available_copies + delta).max(0))
            }
            None => (current.total_copies, current.available_copies),
        };

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                publisher = COALESCE($5, publisher),
                publication_year = COALESCE($6, publication_year),
                category = COALESCE($7, category),
                total_copies = $8,
                available_copies = $9,
                shelf_location = COALESCE($10, shelf_location),
                status = COALESCE($11, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.author)
        .bind(&changes.isbn)
        .bind(&changes.publisher)
        .bind(changes.publication_year)
        .bind(&changes.category)
        .bind(total)
        .bind(available)
        .bind(&changes.shelf_location)
        .bind(changes.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A book with this ISBN already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book; refused while copies are still out on loan
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i32>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let open_loans = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND status = 'BORROWED'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if open_loans > 0 {
            return Err(AppError::Conflict(
                "Cannot delete a book with copies out on loan".to_string(),
            ));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Distinct categories for catalog navigation
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM books WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Distinct authors for catalog navigation
    pub async fn authors(&self) -> AppResult<Vec<String>> {
        let authors =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT author FROM books ORDER BY author")
                .fetch_all(&self.pool)
                .await?;
        Ok(authors)
    }
}
