pub mod auth_service;
pub mod character_service;

pub use auth_service::{AuthError, AuthService, LoginOutcome};
pub use character_service::{CharacterError, CharacterService, STARTING_PROFESSION_LEVEL};
