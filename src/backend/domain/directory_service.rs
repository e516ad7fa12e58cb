//! Service directory lookups for the menus.

use std::sync::Arc;

use anyhow::Result;

use crate::backend::domain::models::service::{Service, ServiceCode};
use crate::backend::storage::traits::ServiceStore;

#[derive(Clone)]
pub struct DirectoryService {
    services: Arc<dyn ServiceStore>,
}

impl DirectoryService {
    pub fn new(services: Arc<dyn ServiceStore>) -> Self {
        Self { services }
    }

    pub fn list(&self) -> Result<Vec<Service>> {
        self.services.list_services()
    }

    pub fn lookup(&self, code: ServiceCode) -> Result<Option<Service>> {
        self.services.get_service(code)
    }
}
