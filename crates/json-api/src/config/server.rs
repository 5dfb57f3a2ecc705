//! Server Config

use clap::Args;
use jiff::SignedDuration;

/// Server runtime network and session settings.
#[derive(Debug, Args)]
pub struct ServerRuntimeConfig {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "8698")]
    pub port: u16,

    /// Lifetime of an idle visitor session, in seconds
    #[arg(long, env = "SESSION_TTL_SECONDS", default_value_t = 14 * 24 * 60 * 60)]
    pub session_ttl_seconds: i64,
}

impl ServerRuntimeConfig {
    /// Get the socket address for binding.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn session_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(self.session_ttl_seconds.max(1))
    }
}
