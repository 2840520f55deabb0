//! Configuration for the Valoriza CLI
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::path::PathBuf;

/// Global options for the `valoriza` CLI
#[derive(Parser, Debug, Clone)]
pub struct Args {
    /// Base URL of the Strapi REST API (includes the /api prefix)
    #[arg(long, env = "API_URL", default_value = "http://localhost:1337/api")]
    pub api_url: String,

    /// Path of the session file (token + cached user). Defaults to
    /// ~/.valoriza/session.json
    #[arg(long, env = "SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Effective session file path
    pub fn session_path(&self) -> PathBuf {
        if let Some(ref path) = self.session_file {
            return path.clone();
        }
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        home.join(".valoriza").join("session.json")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(format!("API_URL must be an http(s) URL: {}", self.api_url));
        }
        if self.timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            api_url: "http://localhost:1337/api".to_string(),
            session_file: None,
            timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let args = Args {
            api_url: "localhost:1337".to_string(),
            ..base_args()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_explicit_session_file_wins() {
        let args = Args {
            session_file: Some(PathBuf::from("/tmp/session.json")),
            ..base_args()
        };
        assert_eq!(args.session_path(), PathBuf::from("/tmp/session.json"));
    }
}
