pub mod merge;
pub mod resolve;
pub mod validate;

pub use merge::*;
pub use resolve::*;
pub use validate::*;
