use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::order::{OrderRequest, OrderResult};

/// The `OrderGateway` trait is the order-placement boundary of the exchange.
/// It is implemented by the Binance connector, the dry-run gateway and the
/// test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit a validated order. Any transport, authentication or exchange
    /// rejection failure comes back as a `GatewayError`.
    async fn submit_order(&mut self, request: &OrderRequest) -> Result<OrderResult, GatewayError>;

    /// Short name reported when the gateway is initialized
    fn name(&self) -> &'static str;
}
