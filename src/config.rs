//! Configuration management for camwatch.
//!
//! Configuration comes from command-line arguments via clap, with every
//! option also readable from a `CAMWATCH_`-prefixed environment variable.
//!
//! # Environment Variables
//!
//! - `CAMWATCH_HOST` - Server bind address (default: 0.0.0.0)
//! - `CAMWATCH_PORT` - Server port (default: 3000)
//! - `CAMWATCH_DATABASE` - SQLite database path (default: in-memory store)
//! - `CAMWATCH_JWT_SECRET` - Token signing secret (required)
//! - `CAMWATCH_TOKEN_TTL` - Token lifetime in seconds (default: 86400)
//! - `CAMWATCH_PASSWORD_ITERATIONS` - PBKDF2 iterations (default: 100000)
//! - `CAMWATCH_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::auth::{DEFAULT_PASSWORD_ITERATIONS, DEFAULT_TOKEN_TTL, MIN_PASSWORD_ITERATIONS};
use crate::store::UserId;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Secrets shorter than this trigger a startup warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

const DEFAULT_TOKEN_TTL_SECS: u64 = DEFAULT_TOKEN_TTL.as_secs();

// =============================================================================
// CLI Arguments
// =============================================================================

/// camwatch - backend for a camera-monitoring dashboard.
#[derive(Parser, Debug, Clone)]
#[command(name = "camwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API server
    Serve(ServeConfig),

    /// Issue a bearer token for a user id
    Token(TokenConfig),

    /// Open a database and report what it contains
    Check(CheckConfig),
}

// =============================================================================
// Serve
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "CAMWATCH_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "CAMWATCH_PORT")]
    pub port: u16,

    /// SQLite database file. Without it, data lives in memory only.
    #[arg(long, env = "CAMWATCH_DATABASE")]
    pub database: Option<PathBuf>,

    /// Secret used to sign and verify bearer tokens.
    ///
    /// Required: the server refuses to start without it.
    #[arg(long, env = "CAMWATCH_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds.
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_SECS, env = "CAMWATCH_TOKEN_TTL")]
    pub token_ttl: u64,

    /// PBKDF2 iteration count for new password hashes.
    #[arg(long, default_value_t = DEFAULT_PASSWORD_ITERATIONS, env = "CAMWATCH_PASSWORD_ITERATIONS")]
    pub password_iterations: u32,

    /// Allowed CORS origins (comma-separated). Any origin if unset.
    #[arg(long, env = "CAMWATCH_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_secret(self.jwt_secret.as_deref())?;

        if self.token_ttl == 0 {
            return Err("token_ttl must be greater than 0".to_string());
        }

        if self.password_iterations < MIN_PASSWORD_ITERATIONS {
            return Err(format!(
                "password_iterations must be at least {}",
                MIN_PASSWORD_ITERATIONS
            ));
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The signing secret (call validate() first).
    pub fn jwt_secret_or_empty(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or("")
    }

    /// Where the alert feed reads from, for the startup summary.
    ///
    /// Detectors write alerts straight into the SQLite `alerts` table, so
    /// without a database the feed can never hold data.
    pub fn alert_source(&self) -> &'static str {
        match self.database {
            Some(_) => "SQLite alerts table (written by detectors)",
            None => "NONE - the alert feed stays empty; detectors write to the SQLite database, set --database",
        }
    }

    /// Whether the configured secret is shorter than recommended.
    pub fn secret_is_weak(&self) -> bool {
        self.jwt_secret_or_empty().len() < RECOMMENDED_SECRET_LEN
    }
}

// =============================================================================
// Token
// =============================================================================

/// Output format for the token command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenOutputFormat {
    /// Just the token
    #[default]
    Token,
    /// JSON object with token, user id and expiry
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct TokenConfig {
    /// Secret used to sign the token (must match the server's).
    #[arg(long, env = "CAMWATCH_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// User id to embed in the token.
    #[arg(long)]
    pub user_id: UserId,

    /// Token lifetime in seconds.
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_SECS)]
    pub ttl: u64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = TokenOutputFormat::Token)]
    pub format: TokenOutputFormat,
}

impl TokenConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_secret(self.jwt_secret.as_deref())?;
        if self.ttl == 0 {
            return Err("ttl must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn jwt_secret_or_empty(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Check
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// SQLite database file to inspect.
    #[arg(long, env = "CAMWATCH_DATABASE")]
    pub database: PathBuf,

    /// List every camera.
    #[arg(long, default_value_t = false)]
    pub list_cameras: bool,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

fn validate_secret(secret: Option<&str>) -> Result<(), String> {
    match secret {
        Some(secret) if !secret.trim().is_empty() => Ok(()),
        _ => Err("A token signing secret is required. \
                  Set --jwt-secret or CAMWATCH_JWT_SECRET"
            .to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================
