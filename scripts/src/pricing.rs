//! Token prices from the CoinMarketCap API, used to express gas costs in fiat

use reqwest::Client;
use tracing::debug;

use crate::errors::ScriptError;

/// Header carrying the CoinMarketCap API key
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// The price of a token in a fiat currency
#[derive(Clone, Debug, PartialEq)]
pub struct TokenPrice {
    pub token: String,
    pub currency: String,
    pub price: f64,
}

/// Minimal client of the `quotes/latest` endpoint
pub struct CoinMarketCapClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl CoinMarketCapClient {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch the latest price of `token` expressed in `currency`
    pub async fn fetch_price(&self, token: &str, currency: &str) -> Result<TokenPrice, ScriptError> {
        let url = format!("{}/v1/cryptocurrency/quotes/latest", self.api_url);
        debug!("Fetching {} price in {} from {}", token, currency, url);

        let body = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("symbol", token), ("convert", currency)])
            .send()
            .await
            .map_err(|e| ScriptError::Pricing(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::Pricing(e.to_string()))?;

        let price = parse_quote(&body, token, currency)?;
        Ok(TokenPrice {
            token: token.to_string(),
            currency: currency.to_string(),
            price,
        })
    }
}

/// Extract `data.<token>.quote.<currency>.price` from a quotes answer
fn parse_quote(body: &str, token: &str, currency: &str) -> Result<f64, ScriptError> {
    let parsed = json::parse(body).map_err(|e| ScriptError::Pricing(e.to_string()))?;

    if let Some(message) = parsed["status"]["error_message"].as_str() {
        return Err(ScriptError::Pricing(message.to_string()));
    }

    parsed["data"][token]["quote"][currency]["price"]
        .as_f64()
        .ok_or_else(|| ScriptError::Pricing(format!("no {token} price in {currency} in answer")))
}
