//! 실행 이벤트 스트림
//!
//! 주문/TWAP 진행 상황을 한 줄 이벤트로 내보낸다. 싱크는 진입점에서 만들어
//! 주문 관리자, 실행기, 게이트웨이에 주입한다.

use std::sync::Mutex;

use crate::models::order::{OrderRequest, OrderResult};

/// 주요 실행 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    GatewayInitialized { gateway: String, base_url: String },
    OrderRequested { request: OrderRequest },
    OrderSucceeded { request: OrderRequest, result: OrderResult },
    OrderFailed { request: OrderRequest, message: String },
    TwapStarted { symbol: String, side: String, total_quantity: f64, chunks: usize, interval_seconds: u64 },
    ChunkSubmitting { index: usize, chunks: usize, quantity: f64 },
    ChunkExecuted { index: usize, chunks: usize, result: OrderResult },
    ChunkFailed { index: usize, chunks: usize, quantity: f64, message: String },
    TwapCompleted { succeeded: usize, attempted: usize, total_executed: f64 },
    TwapCancelled { succeeded: usize, attempted: usize, total_executed: f64 },
}

/// 이벤트 수신자
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ExecutionEvent);
}

/// `log` 파사드로 이벤트를 기록하는 싱크
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    /// 이벤트 출처 (예: "cli", "http")
    origin: String,
}

impl LogSink {
    pub fn new(origin: impl Into<String>) -> Self {
        LogSink { origin: origin.into() }
    }
}

impl EventSink for LogSink {
    fn emit(&self, event: ExecutionEvent) {
        let origin = &self.origin;
        match event {
            ExecutionEvent::GatewayInitialized { gateway, base_url } => {
                log::info!("[{}] {} gateway initialized: {}", origin, gateway, base_url);
            }
            ExecutionEvent::OrderRequested { request } => {
                log::info!("[{}] Order request: {}", origin, request);
            }
            ExecutionEvent::OrderSucceeded { request, result } => {
                log::info!(
                    "[{}] Order placed successfully: {} orderId={}, status={}, executedQty={}, avgPrice={}",
                    origin,
                    request,
                    result.order_id,
                    result.status,
                    result.executed_quantity,
                    result.average_price.unwrap_or(0.0),
                );
            }
            ExecutionEvent::OrderFailed { request, message } => {
                log::error!("[{}] Order placement failed: {}: {}", origin, request, message);
            }
            ExecutionEvent::TwapStarted { symbol, side, total_quantity, chunks, interval_seconds } => {
                log::info!(
                    "[{}] TWAP execution started: {} {} {} in {} chunks every {}s",
                    origin, symbol, side, total_quantity, chunks, interval_seconds
                );
            }
            ExecutionEvent::ChunkSubmitting { index, chunks, quantity } => {
                log::info!("[{}] Placing TWAP chunk {}/{}: {}", origin, index + 1, chunks, quantity);
            }
            ExecutionEvent::ChunkExecuted { index, chunks, result } => {
                log::info!(
                    "[{}] TWAP chunk {}/{} executed: orderId={}, executedQty={}",
                    origin, index + 1, chunks, result.order_id, result.executed_quantity
                );
            }
            ExecutionEvent::ChunkFailed { index, chunks, quantity, message } => {
                log::error!(
                    "[{}] TWAP chunk {}/{} failed (quantity={}): {}",
                    origin, index + 1, chunks, quantity, message
                );
            }
            ExecutionEvent::TwapCompleted { succeeded, attempted, total_executed } => {
                log::info!(
                    "[{}] TWAP execution completed: {} orders placed, {} attempted, {} total executed",
                    origin, succeeded, attempted, total_executed
                );
            }
            ExecutionEvent::TwapCancelled { succeeded, attempted, total_executed } => {
                log::warn!(
                    "[{}] TWAP execution cancelled: {} orders placed, {} attempted, {} total executed",
                    origin, succeeded, attempted, total_executed
                );
            }
        }
    }
}

/// 이벤트를 메모리에 보관하는 싱크
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ExecutionEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ExecutionEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: ExecutionEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// 여러 싱크로 동시에 내보내는 싱크
pub struct FanoutSink {
    sinks: Vec<std::sync::Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<std::sync::Arc<dyn EventSink>>) -> Self {
        FanoutSink { sinks }
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: ExecutionEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}
