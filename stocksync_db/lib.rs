pub mod uow;

mod connection;
mod models;
mod repository;

pub use connection::{
    DbPool, establish_catalog_pool, establish_connection_pool, establish_test_catalog_pool,
    establish_test_connection_pool,
};
pub use repository::*;
