//! Configuration for docport
//!
//! CLI arguments and environment variable handling using clap.
//! Pattern adapted from holo-host/rust/holo-gateway/src/lib.rs

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::db::ConnectTimeouts;
use crate::inspector::DEFAULT_MAX_LIMIT;

/// docport - browse MongoDB collections over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "docport")]
#[command(about = "HTTP gateway for browsing MongoDB collections")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Initial socket connect timeout for new connections, in milliseconds
    #[arg(long, env = "CONNECT_TIMEOUT_MS", default_value = "10000")]
    pub connect_timeout_ms: u64,

    /// Server selection timeout for new connections, in milliseconds
    #[arg(long, env = "SERVER_SELECTION_TIMEOUT_MS", default_value = "10000")]
    pub server_selection_timeout_ms: u64,

    /// Largest page a single tableData request may return
    #[arg(long, env = "MAX_PAGE_LIMIT", default_value_t = DEFAULT_MAX_LIMIT)]
    pub max_page_limit: u64,

    /// Application name reported to MongoDB in the connection handshake
    #[arg(long, env = "APP_NAME", default_value = "docport")]
    pub app_name: String,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 5000)),
            log_level: "info".to_string(),
            connect_timeout_ms: 10_000,
            server_selection_timeout_ms: 10_000,
            max_page_limit: DEFAULT_MAX_LIMIT,
            app_name: "docport".to_string(),
        }
    }
}

impl Args {
    /// Timeouts applied to every new connection
    pub fn connect_timeouts(&self) -> ConnectTimeouts {
        ConnectTimeouts::new(
            Duration::from_millis(self.connect_timeout_ms),
            Duration::from_millis(self.server_selection_timeout_ms),
        )
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout_ms == 0 {
            return Err("CONNECT_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.server_selection_timeout_ms == 0 {
            return Err("SERVER_SELECTION_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.max_page_limit == 0 {
            return Err("MAX_PAGE_LIMIT must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let args = Args::try_parse_from(["docport"]).unwrap();
        assert_eq!(args.listen.port(), 5000);
        assert_eq!(args.max_page_limit, DEFAULT_MAX_LIMIT);
        assert_eq!(args.connect_timeouts(), ConnectTimeouts::default());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "docport",
            "--listen",
            "127.0.0.1:8081",
            "--connect-timeout-ms",
            "2500",
            "--max-page-limit",
            "50",
        ])
        .unwrap();
        assert_eq!(args.listen.to_string(), "127.0.0.1:8081");
        assert_eq!(args.connect_timeouts().connect, Duration::from_millis(2500));
        assert_eq!(args.max_page_limit, 50);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let args = Args {
            server_selection_timeout_ms: 0,
            ..Args::default()
        };
        assert!(args.validate().is_err());

        let args = Args {
            max_page_limit: 0,
            ..Args::default()
        };
        assert!(args.validate().is_err());
    }
}
