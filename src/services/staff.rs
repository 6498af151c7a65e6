//! Staff account management service

use crate::{
    error::AppResult,
    models::{CreateLibrarian, Librarian, LibrarianQuery, UpdateLibrarian},
    repository::Repository,
};

use super::auth::AuthService;

#[derive(Clone)]
pub struct StaffService {
    repository: Repository,
}

impl StaffService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List librarian accounts with the total matching count
    pub async fn list(&self, query: &LibrarianQuery) -> AppResult<(Vec<Librarian>, i64)> {
        let librarians = self.repository.librarians.list(query).await?;
        let total = self.repository.librarians.count(query).await?;
        Ok((librarians, total))
    }

    pub async fn create(&self, request: &CreateLibrarian) -> AppResult<Librarian> {
        let hash = AuthService::hash_password(&request.password)?;
        self.repository.librarians.create(request, &hash).await
    }

    pub async fn update(&self, id: i32, changes: &UpdateLibrarian) -> AppResult<Librarian> {
        self.repository.librarians.update(id, changes).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.librarians.delete(id).await
    }
}
