pub mod catalog;
pub mod errors;
pub mod pricing;

pub use errors::Result;
