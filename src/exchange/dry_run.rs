use async_trait::async_trait;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::events::{EventSink, ExecutionEvent};
use crate::exchange::traits::OrderGateway;
use crate::models::order::{OrderId, OrderRequest, OrderResult, OrderType};
use crate::utils::current_timestamp_ms;

/// A no-network gateway that acknowledges orders without sending them.
/// MARKET orders come back fully filled, LIMIT orders come back resting.
pub struct DryRunGateway {
  counter: u64,
}

impl DryRunGateway {
  pub fn new(events: Arc<dyn EventSink>) -> Self {
    let gateway = DryRunGateway { counter: 0 };
    events.emit(ExecutionEvent::GatewayInitialized {
      gateway: gateway.name().to_string(),
      base_url: "(no network)".to_string(),
    });
    gateway
  }
}

#[async_trait]
impl OrderGateway for DryRunGateway {
  async fn submit_order(&mut self, request: &OrderRequest) -> Result<OrderResult, GatewayError> {
    self.counter += 1;
    let order_id = OrderId(format!("dry-{}-{}", current_timestamp_ms(), self.counter));

    let result = match request.order_type() {
      OrderType::Market => OrderResult {
        order_id,
        status: "FILLED".to_string(),
        executed_quantity: request.quantity(),
        average_price: None,
      },
      OrderType::Limit => OrderResult {
        order_id,
        status: "NEW".to_string(),
        executed_quantity: 0.0,
        average_price: Some(0.0),
      },
    };
    Ok(result)
  }

  fn name(&self) -> &'static str {
    "dry-run"
  }
}
