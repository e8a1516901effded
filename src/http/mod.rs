//! HTTP 프런트엔드 (주문 폼 + JSON API)

pub mod pages;

use axum::{
  extract::State,
  http::StatusCode,
  response::{Html, IntoResponse, Response},
  routing::{get, post},
  Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::core::TwapExecutor;
use crate::error::TradingError;
use crate::models::order::{OrderRequest, OrderResult, OrderSide};
use crate::models::twap::{TwapPlan, TwapRun};
use crate::order_core::OrderManager;

#[derive(Clone)]
pub struct AppState {
  pub orders: Arc<OrderManager>,
  pub twap: Arc<TwapExecutor>,
  /// 서버 종료 시 진행 중인 TWAP도 취소된다
  pub shutdown: CancellationToken,
}

#[derive(Debug, Serialize)]
struct Health { status: &'static str }

#[derive(Debug, Serialize)]
struct ErrorBody { error: String }

/// JSON API 오류 응답
pub struct ApiError(TradingError);

impl From<TradingError> for ApiError {
  fn from(err: TradingError) -> Self {
    ApiError(err)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      e if e.is_validation() => StatusCode::BAD_REQUEST,
      TradingError::Gateway(_) => StatusCode::BAD_GATEWAY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
  }
}

#[derive(Debug, Deserialize)]
pub struct OrderReq {
  pub symbol: String,
  pub side: String,
  #[serde(rename = "type")]
  pub order_type: String,
  pub quantity: f64,
  pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TwapReq {
  pub symbol: String,
  pub side: String,
  pub total_quantity: f64,
  pub chunks: i64,
  pub interval_seconds: i64,
}

/// HTML 폼은 모든 값을 문자열로 보낸다
#[derive(Debug, Deserialize)]
pub struct OrderFormReq {
  pub symbol: String,
  pub side: String,
  #[serde(rename = "type")]
  pub order_type: String,
  pub quantity: String,
  #[serde(default)]
  pub price: Option<String>,
}

impl OrderFormReq {
  fn into_request(self) -> Result<OrderRequest, TradingError> {
    let quantity = self.quantity.trim().parse::<f64>()
      .map_err(|_| TradingError::Validation("Quantity must be a number".to_string()))?;
    let price = match self.price.as_deref().map(str::trim) {
      None | Some("") => None,
      Some(p) => Some(p.parse::<f64>()
        .map_err(|_| TradingError::Validation("Price must be a number".to_string()))?),
    };
    OrderRequest::from_parts(&self.symbol, &self.side, &self.order_type, quantity, price)
  }
}

pub fn build_router(state: AppState) -> Router {
  let cors = CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any);

  Router::new()
    .route("/health", get(|| async { Json(Health { status: "ok" }) }))
    .route("/", get(order_form))
    .route("/form/order", post(submit_form_order))
    .route("/orders", post(create_order))
    .route("/twap", post(run_twap))
    .with_state(state)
    .layer(cors)
}

/// 서버 실행. `shutdown`이 취소되면 정상 종료한다.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), TradingError> {
  let shutdown = state.shutdown.clone();
  let listener = tokio::net::TcpListener::bind(addr).await?;
  log::info!("서버 시작: http://{}/", addr);

  axum::serve(listener, build_router(state))
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await?;

  log::info!("서버 종료");
  Ok(())
}

async fn order_form() -> Html<String> {
  Html(pages::order_form())
}

async fn submit_form_order(State(state): State<AppState>, Form(req): Form<OrderFormReq>) -> (StatusCode, Html<String>) {
  let request = match req.into_request() {
    Ok(request) => request,
    Err(e) => {
      log::error!("[http] Input validation failed: {}", e);
      return (StatusCode::BAD_REQUEST, Html(pages::order_failed(None, &e)));
    }
  };

  match state.orders.place_order(request.clone()).await {
    Ok(result) => (StatusCode::OK, Html(pages::order_placed(&request, &result))),
    Err(e) => (StatusCode::BAD_GATEWAY, Html(pages::order_failed(Some(&request), &e))),
  }
}

async fn create_order(State(state): State<AppState>, Json(req): Json<OrderReq>) -> Result<Json<OrderResult>, ApiError> {
  let request = OrderRequest::from_parts(&req.symbol, &req.side, &req.order_type, req.quantity, req.price)?;
  let result = state.orders.place_order(request).await?;
  Ok(Json(result))
}

async fn run_twap(State(state): State<AppState>, Json(req): Json<TwapReq>) -> Result<Json<TwapRun>, ApiError> {
  let side = req.side.parse::<OrderSide>().map_err(|e| match e {
    TradingError::Validation(msg) => TradingError::InvalidPlan(msg),
    other => other,
  })?;
  let plan = TwapPlan::new(req.symbol.trim(), side, req.total_quantity, req.chunks, req.interval_seconds)?;
  let run = state.twap.execute(&plan, &state.shutdown.child_token()).await;
  Ok(Json(run))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(quantity: &str, price: Option<&str>) -> OrderFormReq {
    OrderFormReq {
      symbol: "BTCUSDT".into(),
      side: "BUY".into(),
      order_type: "LIMIT".into(),
      quantity: quantity.into(),
      price: price.map(String::from),
    }
  }

  #[test]
  fn test_form_parsing() {
    let request = form("0.01", Some(" 85000 ")).into_request().unwrap();
    assert_eq!(request.price(), Some(85000.0));

    let err = form("abc", Some("1")).into_request().unwrap_err();
    assert_eq!(err.to_string(), "Invalid input: Quantity must be a number");

    let err = form("1", Some("")).into_request().unwrap_err();
    assert_eq!(err.to_string(), "Invalid input: Price is required for LIMIT orders");

    let err = form("1", Some("cheap")).into_request().unwrap_err();
    assert_eq!(err.to_string(), "Invalid input: Price must be a number");
  }
}
