use std::sync::Arc;

use crate::auth::RateLimiter;
use crate::config::Config;
use crate::service::{
    ConsultantService, DashboardService, DoctorActivityService, DoctorService, Recorder,
};
use crate::storage::Storage;

/// Auth material shared by the token extractor and the CLI.
#[derive(Clone)]
pub struct AuthContext {
    pub secret: Arc<str>,
    pub token_ttl_minutes: i64,
    pub limiter: RateLimiter,
}

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub doctors: DoctorService,
    pub consultants: ConsultantService,
    pub activities: DoctorActivityService,
    pub dashboard: DashboardService,
    pub audit: Recorder,
    pub auth: AuthContext,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: &Config) -> Self {
        let audit = Recorder::new(storage.clone());
        let auth = AuthContext {
            secret: config.auth.token_secret.clone().into(),
            token_ttl_minutes: config.auth.token_ttl_minutes,
            limiter: RateLimiter::new(
                config.auth.rate_limit.max_requests,
                config.auth.rate_limit.window_secs,
            ),
        };
        Self {
            doctors: DoctorService::new(storage.clone(), audit.clone()),
            consultants: ConsultantService::new(storage.clone(), audit.clone()),
            activities: DoctorActivityService::new(storage.clone()),
            dashboard: DashboardService::new(storage.clone(), audit.clone()),
            audit,
            auth,
            storage,
        }
    }
}
