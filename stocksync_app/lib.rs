pub mod app;
pub mod auth;
pub mod command_handlers;
pub mod config;
pub mod cqrs;
pub mod ingest;
pub mod jobs;
pub mod pricing;
pub mod queries_handlers;
pub mod repository;
pub mod resolver;
pub mod sweeper;
pub mod uow;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
