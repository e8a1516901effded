use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::ExchangeConfig;
use crate::error::{GatewayError, TradingError};
use crate::events::{EventSink, ExecutionEvent};
use crate::exchange::traits::OrderGateway;
use crate::models::order::{OrderId, OrderRequest, OrderResult, OrderType};
use crate::utils::current_timestamp_ms;

type HmacSha256 = Hmac<Sha256>;

const ORDER_PATH: &str = "/fapi/v1/order";

/// Binance USDT-M Futures REST connector (order placement only)
pub struct BinanceFuturesGateway {
  base_url: String,
  api_key: String,
  api_secret: String,
  recv_window_ms: u64,
  http: reqwest::Client,
}

/// Binance encodes decimals as strings; accept plain numbers too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Decimal {
  Text(String),
  Number(f64),
}

impl Decimal {
  fn value(&self) -> Option<f64> {
    match self {
      Decimal::Text(s) => s.parse::<f64>().ok(),
      Decimal::Number(n) => Some(*n),
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
  order_id: serde_json::Value,
  status: String,
  executed_qty: Option<Decimal>,
  avg_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
  code: i64,
  msg: String,
}

impl BinanceFuturesGateway {
  /// Build the connector. Both the API key and the API secret are required.
  pub fn from_config(config: &ExchangeConfig, events: Arc<dyn EventSink>) -> Result<Self, TradingError> {
    let api_key = config.api_key.clone().filter(|k| !k.is_empty());
    let api_secret = config.api_secret.clone().filter(|s| !s.is_empty());
    let (api_key, api_secret) = match (api_key, api_secret) {
      (Some(key), Some(secret)) => (key, secret),
      _ => {
        return Err(TradingError::ConfigError(
          "Missing API credentials. Set BINANCE_API_KEY and BINANCE_API_SECRET environment variables".to_string(),
        ))
      }
    };

    let http = reqwest::Client::builder()
      .timeout(Duration::from_millis(config.timeout_ms))
      .build()
      .map_err(|e| TradingError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

    let gateway = BinanceFuturesGateway {
      base_url: config.base_url.trim_end_matches('/').to_string(),
      api_key,
      api_secret,
      recv_window_ms: config.recv_window_ms,
      http,
    };

    events.emit(ExecutionEvent::GatewayInitialized {
      gateway: gateway.name().to_string(),
      base_url: gateway.base_url.clone(),
    });

    Ok(gateway)
  }

  fn sign(&self, query: &str) -> Result<String, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
      .map_err(|e| GatewayError::new(format!("Failed to sign request: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
  }

  fn build_query(&self, request: &OrderRequest, timestamp: i64, client_order_id: &str) -> String {
    let mut params = vec![
      format!("symbol={}", request.symbol()),
      format!("side={}", request.side()),
      format!("type={}", request.order_type()),
      format!("quantity={}", request.quantity()),
    ];
    if let (OrderType::Limit, Some(price)) = (request.order_type(), request.price()) {
      params.push(format!("price={}", price));
      params.push("timeInForce=GTC".to_string());
    }
    params.push(format!("newClientOrderId={}", client_order_id));
    params.push(format!("recvWindow={}", self.recv_window_ms));
    params.push(format!("timestamp={}", timestamp));
    params.join("&")
  }

  fn parse_order(body: &str) -> Result<OrderResult, GatewayError> {
    let response: OrderResponse = serde_json::from_str(body)
      .map_err(|e| GatewayError::new(format!("Unexpected order response: {}", e)))?;

    let order_id = match response.order_id {
      serde_json::Value::String(s) => s,
      other => other.to_string(),
    };

    Ok(OrderResult {
      order_id: OrderId(order_id),
      status: response.status,
      executed_quantity: response.executed_qty.and_then(|q| q.value()).unwrap_or(0.0),
      average_price: response.avg_price.and_then(|p| p.value()),
    })
  }

  fn describe_failure(status: reqwest::StatusCode, body: &str) -> GatewayError {
    match serde_json::from_str::<ApiError>(body) {
      Ok(err) => GatewayError::new(format!("Binance API error {}: {}", err.code, err.msg)),
      Err(_) => GatewayError::new(format!("HTTP {}: {}", status, body)),
    }
  }
}

#[async_trait]
impl OrderGateway for BinanceFuturesGateway {
  async fn submit_order(&mut self, request: &OrderRequest) -> Result<OrderResult, GatewayError> {
    let client_order_id = format!("bot-{}", Uuid::new_v4().simple());
    let query = self.build_query(request, current_timestamp_ms(), &client_order_id);
    let signature = self.sign(&query)?;
    let url = format!("{}{}?{}&signature={}", self.base_url, ORDER_PATH, query, signature);

    let res = self.http
      .post(url)
      .header("X-MBX-APIKEY", &self.api_key)
      .send().await
      .map_err(|e| GatewayError::new(format!("submit_order http error: {}", e)))?;

    let status = res.status();
    let body = res.text().await
      .map_err(|e| GatewayError::new(format!("submit_order read error: {}", e)))?;

    if !status.is_success() {
      return Err(Self::describe_failure(status, &body));
    }
    Self::parse_order(&body)
  }

  fn name(&self) -> &'static str {
    "binance-futures"
  }
}
