//! Login credentials and provisioning jobs.
//!
//! Both are built once from command-line arguments and validated before any
//! connection is opened.

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::session::SessionConfig;

/// Where to connect and who to log in as.
#[derive(Debug)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    /// Validate and build credentials. The username must not be blank.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let username: String = username.into();
        let password: String = password.into();
        if username.trim().is_empty() {
            return Err(ConfigError::InvalidArgument {
                message: "username must not be empty".to_string(),
            });
        }

        Ok(Self {
            host: host.into(),
            port,
            username,
            password: SecretString::from(password),
        })
    }

    /// Session settings for connecting with these credentials.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(&self.host).port(self.port)
    }
}

/// Default base name for provisioned accounts.
pub const DEFAULT_BASE_USERNAME: &str = "unit";

/// Default password for provisioned accounts.
pub const DEFAULT_PROVISION_PASSWORD: &str = "unit123";

/// A batch of numbered accounts to create.
///
/// Accounts are named `base_username` followed by a 1-based index.
#[derive(Debug)]
pub struct ProvisionJob {
    pub base_username: String,
    pub password: SecretString,
    pub count: usize,
}

impl ProvisionJob {
    /// Validate and build a job. The base username must not be blank.
    pub fn new(
        base_username: impl Into<String>,
        password: impl Into<String>,
        count: usize,
    ) -> Result<Self, ConfigError> {
        let base_username: String = base_username.into();
        let password: String = password.into();
        if base_username.trim().is_empty() {
            return Err(ConfigError::InvalidArgument {
                message: "base username must not be empty".to_string(),
            });
        }

        Ok(Self {
            base_username,
            password: SecretString::from(password),
            count,
        })
    }

    /// Job with the default base name and password.
    pub fn with_defaults(count: usize) -> Self {
        Self {
            base_username: DEFAULT_BASE_USERNAME.to_string(),
            password: SecretString::from(DEFAULT_PROVISION_PASSWORD.to_string()),
            count,
        }
    }

    /// The usernames this job will attempt, in order.
    pub fn usernames(&self) -> impl Iterator<Item = String> + '_ {
        (1..=self.count).map(move |i| format!("{}{}", self.base_username, i))
    }
}
