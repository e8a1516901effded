use std::sync::Arc;

use crate::error::TradingError;
use crate::events::{EventSink, ExecutionEvent};
use crate::exchange::SharedGateway;
use crate::models::order::{OrderRequest, OrderResult};

/// 주문 관리자 - 단일 주문 제출
///
/// 요청은 `OrderRequest` 생성 시점에 이미 검증되어 있으므로, 여기서는
/// 제출과 이벤트 기록만 담당한다. 실패는 삼키지 않고 그대로 돌려준다.
pub struct OrderManager {
    gateway: SharedGateway,
    events: Arc<dyn EventSink>,
}

impl OrderManager {
    pub fn new(gateway: SharedGateway, events: Arc<dyn EventSink>) -> Self {
        OrderManager { gateway, events }
    }

    /// 주문 제출
    pub async fn place_order(&self, request: OrderRequest) -> Result<OrderResult, TradingError> {
        self.events.emit(ExecutionEvent::OrderRequested { request: request.clone() });

        let outcome = {
            let mut gateway = self.gateway.write().await;
            gateway.submit_order(&request).await
        };

        match outcome {
            Ok(result) => {
                self.events.emit(ExecutionEvent::OrderSucceeded { request, result: result.clone() });
                Ok(result)
            }
            Err(error) => {
                self.events.emit(ExecutionEvent::OrderFailed { request, message: error.message.clone() });
                Err(TradingError::Gateway(error))
            }
        }
    }
}
