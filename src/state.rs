use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::DataStore;
use crate::services::{AuthService, CharacterService};

/// Shared handler state. Cloned per request; everything inside is `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DataStore>,
    pub tokens: Arc<TokenIssuer>,
    pub auth: AuthService,
    pub characters: CharacterService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DataStore>) -> Self {
        let tokens = Arc::new(TokenIssuer::from_config(&config.security));
        let auth = AuthService::new(store.clone(), tokens.clone(), config.security.bcrypt_cost);
        let characters = CharacterService::new(store.clone());

        Self {
            config: Arc::new(config),
            store,
            tokens,
            auth,
            characters,
        }
    }
}
