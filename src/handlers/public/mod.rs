// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service banner, health probe and token acquisition (signup/login).

pub mod auth;
pub mod root;

pub use auth::{login, signup};
pub use root::{health, root};
