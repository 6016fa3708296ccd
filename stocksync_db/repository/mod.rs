mod catalog_repository;
mod owner_repository;
mod settings_repository;
mod sync_job_repository;

pub use catalog_repository::PostgresCatalogRepository;
pub use owner_repository::PostgresOwnerRepository;
pub use settings_repository::PostgresSettingsRepository;
pub use sync_job_repository::PostgresSyncJobRepository;
