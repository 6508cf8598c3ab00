//! Connection settings for the workflow engine.

use crate::error::{ClientError, Result};

pub const ENV_BASE_URL: &str = "ACTIVITI_BASE_URL";
pub const ENV_USERNAME: &str = "ACTIVITI_USERNAME";
pub const ENV_PASSWORD: &str = "ACTIVITI_PASSWORD";

/// Base URL plus the single static credential pair used for basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `ACTIVITI_BASE_URL`, `ACTIVITI_USERNAME` and `ACTIVITI_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| ClientError::Configuration(format!("{name} is not set")))
        };
        let config = Self {
            base_url: var(ENV_BASE_URL)?,
            username: var(ENV_USERNAME)?,
            password: var(ENV_PASSWORD)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// All three settings are required.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.password.is_empty() || self.base_url.is_empty() {
            return Err(ClientError::Configuration(
                "username, password and base URL are required to create a client".to_string(),
            ));
        }
        Ok(())
    }
}

// Keeps the password out of debug output and logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
