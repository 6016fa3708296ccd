mod executor;
mod job;
mod log;
mod status;
mod task;

pub use executor::*;
pub use job::*;
pub use log::*;
pub use status::*;
pub use task::*;
