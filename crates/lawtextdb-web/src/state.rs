use std::sync::Arc;

use lawtextdb_core::{AuthService, LawTextService, Services};

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub law_texts: Arc<LawTextService>,
}

impl From<Services> for AppState {
    fn from(services: Services) -> Self {
        Self {
            auth: services.auth,
            law_texts: services.law_texts,
        }
    }
}
