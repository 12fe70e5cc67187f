//! Service configuration.
//!
//! Configuration is loaded from environment variables (optionally seeded from
//! a `.env` file) or from TOML, falling back to defaults for anything unset.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Default clock tolerance applied to request lifetimes (10 minutes).
pub const DEFAULT_CLOCK_TOLERANCE_MS: u64 = 600_000;

/// Default capacity of each negotiation session cache.
pub const DEFAULT_NEGOTIATION_SESSIONS: usize = 1024;

/// Default name of the group whose members may use `ActAs`.
pub const DEFAULT_ACT_AS_GROUP: &str = "ActAsUsers";

/// STS configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StsConfig {
    /// Tolerance, in milliseconds, added to both ends of a request lifetime.
    pub clock_tolerance_ms: u64,
    /// Whether SHA-1 digests and RSA-SHA1 signatures are accepted.
    pub allow_sha1: bool,
    /// Maximum number of pending negotiations kept per scheme.
    pub negotiation_sessions: usize,
    /// Group required for `ActAs` requests.
    pub act_as_group: String,
}

impl Default for StsConfig {
    fn default() -> Self {
        Self {
            clock_tolerance_ms: DEFAULT_CLOCK_TOLERANCE_MS,
            allow_sha1: false,
            negotiation_sessions: DEFAULT_NEGOTIATION_SESSIONS,
            act_as_group: DEFAULT_ACT_AS_GROUP.to_string(),
        }
    }
}

impl StsConfig {
    /// Loads configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Recognised variables: `STS_CLOCK_TOLERANCE_MS`, `STS_ALLOW_SHA1`,
    /// `STS_NEGOTIATION_SESSIONS`, `STS_ACT_AS_GROUP`.
    pub fn from_env() -> CoreResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let clock_tolerance_ms = parse_var(&lookup, "STS_CLOCK_TOLERANCE_MS")?
            .unwrap_or(defaults.clock_tolerance_ms);
        let allow_sha1 = parse_var(&lookup, "STS_ALLOW_SHA1")?.unwrap_or(defaults.allow_sha1);
        let negotiation_sessions = parse_var(&lookup, "STS_NEGOTIATION_SESSIONS")?
            .unwrap_or(defaults.negotiation_sessions);
        let act_as_group = lookup("STS_ACT_AS_GROUP").unwrap_or(defaults.act_as_group);

        let config = Self {
            clock_tolerance_ms,
            allow_sha1,
            negotiation_sessions,
            act_as_group,
        };
        config.validate()?;

        tracing::debug!(
            clock_tolerance_ms = config.clock_tolerance_ms,
            allow_sha1 = config.allow_sha1,
            negotiation_sessions = config.negotiation_sessions,
            "loaded STS configuration"
        );
        Ok(config)
    }

    /// Parses configuration from TOML.
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the clock tolerance as a [`Duration`].
    #[must_use]
    pub const fn clock_tolerance(&self) -> Duration {
        Duration::from_millis(self.clock_tolerance_ms)
    }

    /// Configuration suitable for tests: no tolerance, small caches.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            clock_tolerance_ms: 0,
            allow_sha1: false,
            negotiation_sessions: 4,
            act_as_group: DEFAULT_ACT_AS_GROUP.to_string(),
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> CoreResult<()> {
        if self.negotiation_sessions == 0 {
            return Err(CoreError::InvalidConfig(
                "negotiation_sessions must be greater than zero".to_string(),
            ));
        }
        if self.act_as_group.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "act_as_group must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> CoreResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| CoreError::InvalidConfig(format!("{name} has an invalid value: {raw}")))
        })
        .transpose()
}
