//! Configuration for the setup wizard.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ticketdesk_core::TicketdeskError;

use crate::error::Result;
use crate::platform::EntryPointPayload;

/// The platform caps multi-select dropdowns at 25 values.
pub const PLATFORM_MAX_SELECT: usize = 25;

/// Setup wizard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Idle time after which an unfinished session is discarded
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,

    /// What invoking the wizard does while a session is live
    pub restart_policy: RestartPolicy,

    /// Upper bound on support roles per selection
    pub max_support_roles: usize,

    /// Content of the published entry point
    pub entry_point: EntryPointConfig,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            restart_policy: RestartPolicy::Resume,
            max_support_roles: PLATFORM_MAX_SELECT,
            entry_point: EntryPointConfig::default(),
        }
    }
}

/// Behavior of the entry command while a session is already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Re-render the step the session is at
    #[default]
    Resume,
    /// Discard the session and start again at the category step
    Restart,
}

/// Text of the "create ticket" entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPointConfig {
    pub title: String,
    pub description: String,
    pub button_label: String,
}

impl Default for EntryPointConfig {
    fn default() -> Self {
        Self {
            title: "🎫 Create a Ticket".to_string(),
            description: "Click the button below to create a support ticket.".to_string(),
            button_label: "Create Ticket".to_string(),
        }
    }
}

impl EntryPointConfig {
    pub fn payload(&self) -> EntryPointPayload {
        EntryPointPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            button_label: self.button_label.clone(),
        }
    }
}

impl WizardConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TicketdeskError::config_not_found_with_source(path, e)
            } else {
                TicketdeskError::io("reading config", path, e)
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| TicketdeskError::ConfigInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout.is_zero() {
            return Err(TicketdeskError::ConfigValidation {
                message: "idle_timeout must be greater than zero".to_string(),
            }
            .into());
        }
        if self.max_support_roles == 0 || self.max_support_roles > PLATFORM_MAX_SELECT {
            return Err(TicketdeskError::ConfigValidation {
                message: format!(
                    "max_support_roles must be between 1 and {}",
                    PLATFORM_MAX_SELECT
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Create a new config with custom idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Create a new config with custom restart policy.
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    /// Create a new config with custom support role limit.
    pub fn with_max_support_roles(mut self, max: usize) -> Self {
        self.max_support_roles = max;
        self
    }
}

/// Serde support for Duration using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
