//! Payment Gateway Config

use std::{convert::Infallible, time::Duration};

use clap::Args;
use storefront_app::domain::payments::{self, GatewayAccessToken};

/// Payment gateway settings.
#[derive(Debug, Args)]
pub struct GatewayConfig {
    /// Gateway API root
    #[arg(
        long = "gateway-base-url",
        env = "GATEWAY_BASE_URL",
        default_value = "https://api.mercadopago.com"
    )]
    pub base_url: String,

    /// Gateway access token
    #[arg(
        long = "gateway-access-token",
        env = "GATEWAY_ACCESS_TOKEN",
        hide_env_values = true,
        value_parser = parse_access_token
    )]
    pub access_token: GatewayAccessToken,

    /// Gateway request timeout in seconds
    #[arg(
        long = "gateway-timeout-seconds",
        env = "GATEWAY_TIMEOUT_SECONDS",
        default_value_t = 10
    )]
    pub timeout_seconds: u64,
}

impl GatewayConfig {
    /// Client settings for the payments service.
    #[must_use]
    pub fn client_config(&self) -> payments::GatewayConfig {
        payments::GatewayConfig {
            base_url: self.base_url.clone(),
            access_token: self.access_token.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

fn parse_access_token(value: &str) -> Result<GatewayAccessToken, Infallible> {
    Ok(GatewayAccessToken::new(value.trim()))
}
