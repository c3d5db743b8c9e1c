use crate::error::{RacError, Result};
use crate::{DEFAULT_RAS_PORT, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;
use std::time::Duration;

/// User name and password pair passed to `rac`.
///
/// Either half may be empty; empty fields are not sent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field(
                "password",
                &if self.password.is_empty() { "" } else { "***" },
            )
            .finish()
    }
}

/// Largest accepted inactivity threshold, one century in hours
pub const MAX_INACTIVE_HOURS: u32 = 24 * 365 * 100;

/// Connection settings for the RAS service and the `rac` utility
#[derive(Debug, Clone)]
pub struct RacConfig {
    /// Path to the `rac` executable
    pub rac_path: PathBuf,
    /// Host running the RAS service
    pub ras_host: String,
    /// RAS port (default: 1545)
    pub ras_port: u16,
    /// Cluster administrator credentials
    pub cluster_auth: Credentials,
    /// Infobase administrator credentials, used by `infobase update`
    pub infobase_auth: Credentials,
    /// Age threshold for inactivity, in hours (default: 24).
    /// Carried into the correlation policy; the current rule is zero sessions.
    pub inactive_hours: u32,
    /// Bound on a single `rac` invocation (default: 30 s)
    pub timeout: Duration,
}

impl RacConfig {
    /// Create a configuration with default settings
    ///
    /// Default configuration:
    /// - RAS on localhost:1545
    /// - no credentials
    /// - 24 h inactivity threshold
    /// - 30 s timeout per call
    pub fn new(rac_path: impl Into<PathBuf>) -> Self {
        Self {
            rac_path: rac_path.into(),
            ras_host: "localhost".to_string(),
            ras_port: DEFAULT_RAS_PORT,
            cluster_auth: Credentials::default(),
            infobase_auth: Credentials::default(),
            inactive_hours: 24,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the RAS host and port
    #[must_use]
    pub fn with_ras(mut self, host: impl Into<String>, port: u16) -> Self {
        self.ras_host = host.into();
        self.ras_port = port;
        self
    }

    /// Set cluster administrator credentials
    #[must_use]
    pub fn with_cluster_auth(mut self, credentials: Credentials) -> Self {
        self.cluster_auth = credentials;
        self
    }

    /// Set infobase administrator credentials
    #[must_use]
    pub fn with_infobase_auth(mut self, credentials: Credentials) -> Self {
        self.infobase_auth = credentials;
        self
    }

    #[must_use]
    pub fn with_inactive_hours(mut self, hours: u32) -> Self {
        self.inactive_hours = hours;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `host:port` endpoint passed as the first `rac` argument
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.ras_host, self.ras_port)
    }

    pub fn inactivity_threshold(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.inactive_hours))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Check the utility exists before anything is invoked
        if !self.rac_path.exists() {
            return Err(RacError::MissingUtility(self.rac_path.clone()));
        }

        if self.ras_host.trim().is_empty() {
            return Err(RacError::InvalidConfig("RAS host must not be empty".to_string()));
        }

        if self.ras_port == 0 {
            return Err(RacError::InvalidConfig("RAS port must not be 0".to_string()));
        }

        if self.inactive_hours > MAX_INACTIVE_HOURS {
            return Err(RacError::InvalidConfig(format!(
                "inactivity threshold must not exceed {MAX_INACTIVE_HOURS} hours"
            )));
        }

        if self.timeout.is_zero() {
            return Err(RacError::InvalidConfig(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}
