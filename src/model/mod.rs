pub mod common;
pub mod config;
pub mod survey;
pub mod tag;

pub use common::*;
pub use config::*;
pub use survey::*;
pub use tag::*;
