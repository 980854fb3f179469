pub mod auth;
pub mod json;
pub mod response;

pub use auth::{identity_middleware, require_user};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
