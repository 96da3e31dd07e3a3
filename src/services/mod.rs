//! Business logic services

pub mod catalog;
pub mod ledger;
pub mod lending;
pub mod members;

use std::sync::Arc;

use crate::{config::LendingConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub lending: lending::LendingService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, lending_config: LendingConfig) -> Self {
        let store = Arc::new(repository.lending.clone());
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            members: members::MembersService::new(repository),
            lending: lending::LendingService::new(store, lending_config.debt_floor),
        }
    }
}
