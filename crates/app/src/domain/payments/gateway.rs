//! Payment gateway client.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use zeroize::Zeroize;

/// Bearer credential for the gateway API.
#[derive(Clone)]
pub struct GatewayAccessToken(String);

impl GatewayAccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GatewayAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GatewayAccessToken(**redacted**)")?;
        Ok(())
    }
}

impl Drop for GatewayAccessToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Configuration for connecting to the payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API root, e.g. `"https://api.mercadopago.com"`.
    pub base_url: String,

    pub access_token: GatewayAccessToken,

    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid payment id")]
    InvalidPaymentId,
}

/// A payment as the gateway reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPayment {
    pub id: String,

    /// Raw gateway status word, e.g. `approved`.
    pub status: String,

    pub amount: Decimal,

    /// Our order number, as sent when the checkout was created.
    pub external_reference: Option<String>,

    /// Full response body, stored alongside the payment.
    pub raw: Value,
}

impl GatewayPayment {
    /// Read the fields we reconcile on out of a gateway response body.
    pub fn from_response(raw: Value) -> Result<Self, GatewayError> {
        let id = match raw.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(missing("id")),
        };

        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("status"))?
            .to_string();

        let amount = match raw.get("transaction_amount") {
            Some(Value::Number(amount)) => parse_amount(&amount.to_string())?,
            Some(Value::String(amount)) => parse_amount(amount)?,
            Some(Value::Null) | None => Decimal::ZERO,
            Some(_) => return Err(missing("transaction_amount")),
        };

        let external_reference = raw
            .get("external_reference")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
            .map(str::to_string);

        Ok(Self {
            id,
            status,
            amount,
            external_reference,
            raw,
        })
    }
}

fn missing(field: &str) -> GatewayError {
    GatewayError::UnexpectedResponse(format!("payment response has no usable `{field}`"))
}

fn parse_amount(amount: &str) -> Result<Decimal, GatewayError> {
    amount
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(amount))
        .map(|amount| amount.round_dp(2))
        .map_err(|e| GatewayError::UnexpectedResponse(format!("bad transaction_amount: {e}")))
}

/// Remote source of truth for payment state.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Fetch the current state of a payment by its gateway id.
    async fn get_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}

/// HTTP client for the gateway's payments API.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    config: GatewayConfig,
    http: Client,
}

impl HttpPaymentGateway {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn payment_url(&self, payment_id: &str) -> Result<String, GatewayError> {
        let valid = !payment_id.is_empty()
            && payment_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(GatewayError::InvalidPaymentId);
        }

        Ok(format!(
            "{}/v1/payments/{payment_id}",
            self.config.base_url.trim_end_matches('/')
        ))
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn get_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let url = self.payment_url(payment_id)?;

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.config.access_token.expose())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(GatewayError::UnexpectedResponse(format!(
                "payment lookup failed with status {status}: {text}"
            )));
        }

        let body: Value = response.json().await?;

        GatewayPayment::from_response(body)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn gateway(base_url: &str) -> Result<HttpPaymentGateway, GatewayError> {
        HttpPaymentGateway::new(GatewayConfig {
            base_url: base_url.to_string(),
            access_token: GatewayAccessToken::new("secret"),
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn parses_a_payment_response() -> TestResult {
        let payment = GatewayPayment::from_response(json!({
            "id": 123_456,
            "status": "approved",
            "transaction_amount": 100.5,
            "external_reference": "ORD-0000ABCD",
        }))?;

        assert_eq!(payment.id, "123456");
        assert_eq!(payment.status, "approved");
        assert_eq!(payment.amount, dec!(100.50));
        assert_eq!(payment.external_reference.as_deref(), Some("ORD-0000ABCD"));

        Ok(())
    }

    #[test]
    fn blank_external_reference_is_none() -> TestResult {
        let payment = GatewayPayment::from_response(json!({
            "id": "abc",
            "status": "pending",
            "external_reference": "",
        }))?;

        assert_eq!(payment.external_reference, None);
        assert_eq!(payment.amount, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn response_without_status_is_rejected() {
        let result = GatewayPayment::from_response(json!({ "id": 1 }));

        assert!(
            matches!(result, Err(GatewayError::UnexpectedResponse(_))),
            "expected UnexpectedResponse, got {result:?}"
        );
    }

    #[test]
    fn payment_url_joins_base_and_id() -> TestResult {
        let gateway = gateway("https://gateway.test/")?;

        assert_eq!(
            gateway.payment_url("987")?,
            "https://gateway.test/v1/payments/987"
        );

        Ok(())
    }

    #[test]
    fn payment_url_rejects_path_characters() -> TestResult {
        let gateway = gateway("https://gateway.test")?;
        let result = gateway.payment_url("../admin");

        assert!(
            matches!(result, Err(GatewayError::InvalidPaymentId)),
            "expected InvalidPaymentId, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn access_token_is_redacted() {
        let token = GatewayAccessToken::new("secret");

        assert_eq!(format!("{token:?}"), "GatewayAccessToken(**redacted**)");
    }
}
