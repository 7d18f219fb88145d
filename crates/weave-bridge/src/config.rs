//! Bridge configuration from `WEAVE_*` environment variables.
//!
//! Required configuration missing at startup is a hard error — the process
//! should refuse to start rather than limp along half-configured.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Environment variable naming the agent's working directory.
pub const AGENT_CWD_VAR: &str = "WEAVE_AGENT_CWD";
/// Environment variable overriding the Claude CLI binary name.
pub const CLAUDE_BIN_VAR: &str = "WEAVE_CLAUDE_BIN";
/// Environment variable overriding the idle threshold, in seconds.
pub const SESSION_MAX_IDLE_VAR: &str = "WEAVE_SESSION_MAX_IDLE_SECS";
/// Environment variable overriding the janitor period, in seconds.
pub const JANITOR_PERIOD_VAR: &str = "WEAVE_JANITOR_PERIOD_SECS";

const DEFAULT_CLAUDE_BIN: &str = "claude";
const DEFAULT_SESSION_MAX_IDLE_SECS: u64 = 3600;
const DEFAULT_JANITOR_PERIOD_SECS: u64 = 1800;

/// Configuration load failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// A variable is present but unparsable.
    #[error("environment variable {name} is not a valid {expected}: {value:?}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// What the value should have been.
        expected: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Runtime configuration for the bridge process.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Working directory the agent CLI runs in.
    pub agent_cwd: PathBuf,
    /// Claude CLI binary name or path.
    pub claude_bin: String,
    /// Sessions idle longer than this are evicted.
    pub session_max_idle: Duration,
    /// How often the janitor sweeps.
    pub janitor_period: Duration,
}

impl BridgeConfig {
    /// Load configuration from the process environment.
    ///
    /// `agent_cwd_override` (from the CLI) takes priority over
    /// `WEAVE_AGENT_CWD`; one of the two must be present.
    pub fn load(agent_cwd_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::from_lookup(agent_cwd_override, |name| env::var(name).ok())
    }

    fn from_lookup(
        agent_cwd_override: Option<PathBuf>,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let agent_cwd = match agent_cwd_override {
            Some(cwd) => cwd,
            None => get(AGENT_CWD_VAR)
                .map(PathBuf::from)
                .ok_or(ConfigError::MissingVar(AGENT_CWD_VAR))?,
        };
        let claude_bin = get(CLAUDE_BIN_VAR).unwrap_or_else(|| DEFAULT_CLAUDE_BIN.to_owned());
        let session_max_idle = seconds_var(
            &get,
            SESSION_MAX_IDLE_VAR,
            DEFAULT_SESSION_MAX_IDLE_SECS,
        )?;
        let janitor_period = seconds_var(&get, JANITOR_PERIOD_VAR, DEFAULT_JANITOR_PERIOD_SECS)?;

        Ok(Self {
            agent_cwd,
            claude_bin,
            session_max_idle,
            janitor_period,
        })
    }
}

fn seconds_var(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    match get(name) {
        None => Ok(Duration::from_secs(default_secs)),
        Some(value) => value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidVar {
                name,
                expected: "whole number of seconds",
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| (*v).to_owned())
    }

    #[test]
    fn missing_agent_cwd_is_an_error() {
        let err = BridgeConfig::from_lookup(None, lookup(&[])).unwrap_err();
        assert!(err.to_string().contains(AGENT_CWD_VAR));
    }

    #[test]
    fn defaults_apply() {
        let config =
            BridgeConfig::from_lookup(None, lookup(&[(AGENT_CWD_VAR, "/srv/repo")])).unwrap();
        assert_eq!(config.agent_cwd, PathBuf::from("/srv/repo"));
        assert_eq!(config.claude_bin, "claude");
        assert_eq!(config.session_max_idle, Duration::from_secs(3600));
        assert_eq!(config.janitor_period, Duration::from_secs(1800));
    }

    #[test]
    fn cli_override_beats_env() {
        let config = BridgeConfig::from_lookup(
            Some(PathBuf::from("/from/cli")),
            lookup(&[(AGENT_CWD_VAR, "/from/env")]),
        )
        .unwrap();
        assert_eq!(config.agent_cwd, PathBuf::from("/from/cli"));
    }

    #[test]
    fn seconds_vars_parse() {
        let config = BridgeConfig::from_lookup(
            None,
            lookup(&[
                (AGENT_CWD_VAR, "/srv/repo"),
                (SESSION_MAX_IDLE_VAR, "120"),
                (JANITOR_PERIOD_VAR, "30"),
            ]),
        )
        .unwrap();
        assert_eq!(config.session_max_idle, Duration::from_secs(120));
        assert_eq!(config.janitor_period, Duration::from_secs(30));
    }

    #[test]
    fn invalid_seconds_is_an_error() {
        let err = BridgeConfig::from_lookup(
            None,
            lookup(&[(AGENT_CWD_VAR, "/srv/repo"), (SESSION_MAX_IDLE_VAR, "soon")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains(SESSION_MAX_IDLE_VAR));
    }
}
