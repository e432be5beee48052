use crate::domain::{default_catalog, load_catalog, validate_catalog, CatalogEntries, CatalogError};
use crate::repositories::activities::{ActivityRepository, InMemoryActivityRepository};
use crate::services::activities::{ActivityService, ActivityServiceImpl};
use crate::settings::{CatalogSettings, Settings};
use std::sync::Arc;

#[derive(Clone)]
pub struct Services {
    pub activity_service: Arc<dyn ActivityService>,
}

/// Resolves the seed catalog: the configured file when set, otherwise the
/// built-in one.
pub fn build_catalog(settings: &CatalogSettings) -> Result<CatalogEntries, CatalogError> {
    let entries = match settings.path.as_deref() {
        Some(path) => {
            tracing::info!(path, "loading activity catalog from file");
            load_catalog(path)?
        }
        None => default_catalog(),
    };
    validate_catalog(entries)
}

pub fn build_services(activity_repo: Arc<dyn ActivityRepository>) -> Services {
    Services {
        activity_service: Arc::new(ActivityServiceImpl::new(activity_repo)),
    }
}

pub fn build_all(settings: &Settings) -> Result<Services, CatalogError> {
    let catalog = build_catalog(&settings.catalog)?;
    tracing::info!(activities = catalog.len(), "activity registry seeded");
    let activity_repo: Arc<dyn ActivityRepository> =
        Arc::new(InMemoryActivityRepository::new(catalog));
    Ok(build_services(activity_repo))
}
