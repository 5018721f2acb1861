pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;

pub use auth::{AuthContext, Role};
pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
