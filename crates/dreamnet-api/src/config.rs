//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use dreamnet_narrator::GeminiConfig;
use dreamnet_narrator::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

use crate::error::AppError;
use crate::state::DEFAULT_MAX_SESSIONS;

/// Default deadline for one narrative call.
pub const DEFAULT_NARRATIVE_TIMEOUT_SECS: u64 = 30;

/// Everything `main` needs to start the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address.
    pub addr: SocketAddr,
    /// Narrative service connection.
    pub gemini: GeminiConfig,
    /// Deadline applied to every narrative call.
    pub request_timeout: Duration,
    /// Optional YAML catalog replacing the built-in challenges.
    pub catalog_path: Option<PathBuf>,
    /// Most player sessions held in memory at once.
    pub max_sessions: usize,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "3000".to_owned())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;

        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("GEMINI_API_KEY environment variable must be set".to_owned())
            })?;

        let timeout_secs: u64 = match lookup("NARRATIVE_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("NARRATIVE_TIMEOUT_SECS must be whole seconds: {e}"))
            })?,
            None => DEFAULT_NARRATIVE_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(AppError::Config(
                "NARRATIVE_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }
        let request_timeout = Duration::from_secs(timeout_secs);

        let max_sessions: usize = match lookup("MAX_SESSIONS") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("MAX_SESSIONS must be a count: {e}")))?,
            None => DEFAULT_MAX_SESSIONS,
        };
        if max_sessions == 0 {
            return Err(AppError::Config(
                "MAX_SESSIONS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            addr,
            gemini: GeminiConfig {
                api_key,
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_owned()),
                base_url: lookup("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_owned()),
                // Trails the domain deadline so callers always see `Timeout`.
                timeout: request_timeout + Duration::from_secs(1),
            },
            request_timeout,
            catalog_path: lookup("CHALLENGE_CATALOG_PATH").map(PathBuf::from),
            max_sessions,
        })
    }
}
