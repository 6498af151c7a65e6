//! Fine ledger service

use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::{FineDetails, FineQuery, FineRecord, FineResolution},
    repository::Repository,
};

#[derive(Clone)]
pub struct FinesService {
    repository: Repository,
}

impl FinesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List fines with the total matching count for pagination
    pub async fn list(&self, query: &FineQuery) -> AppResult<(Vec<FineDetails>, i64)> {
        let fines = self.repository.fines.list(query).await?;
        let total = self.repository.fines.count(query).await?;
        Ok((fines, total))
    }

    pub async fn get(&self, id: i32) -> AppResult<FineRecord> {
        self.repository.fines.get_by_id(id).await
    }

    /// Resolve a PENDING fine as paid or waived
    pub async fn resolve(&self, id: i32, resolution: FineResolution) -> AppResult<FineRecord> {
        let fine = self.repository.fines.set_status(id, resolution.into()).await?;
        tracing::info!(fine_id = fine.id, status = %fine.status, "fine resolved");
        Ok(fine)
    }

    /// Total PENDING amount owed by a member
    pub async fn pending_total(&self, member_id: i32) -> AppResult<Decimal> {
        self.repository.fines.pending_total(member_id).await
    }
}
