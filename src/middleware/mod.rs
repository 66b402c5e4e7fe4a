pub mod auth;
pub mod response;

pub use auth::{extract_bearer, require_bearer, AuthUser};
pub use response::{ApiResponse, ApiResult};
