pub mod api;
pub mod auth;
pub mod config;
pub mod store;

use auth::AuthService;
use config::Config;
use store::AuthRepository;

pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let repo = AuthRepository::new(&config.server.data_dir);
        let auth = AuthService::new(repo, config.auth.clone());
        Self { config, auth }
    }
}
