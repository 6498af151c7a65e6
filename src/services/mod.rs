//! Business logic services

pub mod auth;
pub mod catalog;
pub mod circulation;
pub mod fines;
pub mod members;
pub mod staff;
pub mod stats;

use crate::{
    config::{AuthConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub circulation: circulation::CirculationService,
    pub fines: fines::FinesService,
    pub staff: staff::StaffService,
    pub stats: stats::StatsService,
    pool: sqlx::Pool<sqlx::Postgres>,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, loans_config: LoansConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            circulation: circulation::CirculationService::new(
                repository.clone(),
                loans_config.clone(),
            ),
            fines: fines::FinesService::new(repository.clone()),
            staff: staff::StaffService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone(), loans_config),
            pool: repository.pool,
        }
    }

    /// Database pool handle, for readiness probes
    pub fn pool(&self) -> sqlx::Pool<sqlx::Postgres> {
        self.pool.clone()
    }
}
