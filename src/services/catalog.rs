//! Catalog service for book management

use crate::{
    error::AppResult,
    models::{Book, BookDetails, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books with the total matching count for pagination
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let books = self.repository.books.list(query).await?;
        let total = self.repository.books.count(query).await?;
        Ok((books, total))
    }

    pub async fn get(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_details(id).await
    }

    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        self.repository.books.create(book).await
    }

    pub async fn update(&self, id: i32, changes: &UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, changes).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    pub async fn categories(&self) -> AppResult<Vec<String>> {
        self.repository.books.categories().await
    }

    pub async fn authors(&self) -> AppResult<Vec<String>> {
        self.repository.books.authors().await
    }
}
