mod catalog_repository;
mod owner_repository;
mod settings_repository;
mod sync_job_repository;

pub use catalog_repository::CatalogRepository;
pub use owner_repository::OwnerRepository;
pub use settings_repository::SettingsRepository;
pub use sync_job_repository::SyncJobRepository;
