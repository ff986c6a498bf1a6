use serde::Deserialize;

/// Body of `/users` and `/login`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `/logout` and the admin-gated law text routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub username: String,
    pub token: String,
}
