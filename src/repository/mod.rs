//! Repository layer for database operations

pub mod books;
pub mod filter;
pub mod fines;
pub mod librarians;
pub mod loans;
pub mod members;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub librarians: librarians::LibrariansRepository,
    pub loans: loans::LoansRepository,
    pub fines: fines::FinesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            librarians: librarians::LibrariansRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            fines: fines::FinesRepository::new(pool.clone()),
            pool,
        }
    }
}
