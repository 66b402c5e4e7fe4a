// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Routes here are always wrapped in `middleware::require_bearer`, which puts
// the verified `AuthUser` into the request extensions.

pub mod session;

pub use session::protected;
