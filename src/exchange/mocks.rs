use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::exchange::traits::OrderGateway;
use crate::models::order::{OrderId, OrderRequest, OrderResult};

/// A scripted implementation of the OrderGateway trait for testing and
/// development. Every submitted request is recorded; selected calls fail.
pub struct MockGateway {
    executed_quantity: Option<f64>,
    average_price: Option<f64>,
    fail_on: HashSet<usize>,
    fail_all: bool,
    failure_message: String,
    requests: Vec<OrderRequest>,
    order_id_counter: u64,
}

impl MockGateway {
    /// Gateway that fills every order for its full quantity
    pub fn new() -> Self {
        MockGateway {
            executed_quantity: None,
            average_price: Some(50000.0),
            fail_on: HashSet::new(),
            fail_all: false,
            failure_message: "Order would immediately trigger.".to_string(),
            requests: Vec::new(),
            order_id_counter: 0,
        }
    }

    /// Gateway that reports a fixed executed quantity on every fill
    pub fn filling(executed_quantity: f64) -> Self {
        MockGateway {
            executed_quantity: Some(executed_quantity),
            ..Self::new()
        }
    }

    /// Gateway that rejects every order
    pub fn always_failing(message: impl Into<String>) -> Self {
        MockGateway {
            fail_all: true,
            failure_message: message.into(),
            ..Self::new()
        }
    }

    /// Fail the calls with these zero-based call indexes
    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on.extend(calls.iter().copied());
        self
    }

    pub fn with_average_price(mut self, average_price: Option<f64>) -> Self {
        self.average_price = average_price;
        self
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> &[OrderRequest] {
        &self.requests
    }

    pub fn call_count(&self) -> usize {
        self.requests.len()
    }

    fn generate_order_id(&mut self) -> OrderId {
        self.order_id_counter += 1;
        OrderId(format!("mock-{}", self.order_id_counter))
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderGateway for MockGateway {
    async fn submit_order(&mut self, request: &OrderRequest) -> Result<OrderResult, GatewayError> {
        let call = self.requests.len();
        self.requests.push(request.clone());

        if self.fail_all || self.fail_on.contains(&call) {
            return Err(GatewayError::new(format!(
                "Binance API error -2021: {}",
                self.failure_message
            )));
        }

        Ok(OrderResult {
            order_id: self.generate_order_id(),
            status: "FILLED".to_string(),
            executed_quantity: self.executed_quantity.unwrap_or(request.quantity()),
            average_price: self.average_price,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
