//! 선물 테스트넷 주문 봇 라이브러리
//!
//! 시장가/지정가 단일 주문과 TWAP 분할 실행을 지원합니다.
//! CLI와 HTTP 폼은 같은 주문 관리자와 TWAP 실행기를 공유합니다.

pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod exchange;
pub mod http;
pub mod models;
pub mod order_core;
pub mod utils;

// 핵심 타입 재노출
pub use crate::core::TwapExecutor;
pub use crate::error::{GatewayError, TradingError};
pub use crate::events::{EventSink, ExecutionEvent, LogSink, MemorySink};
pub use crate::exchange::{OrderGateway, SharedGateway};
pub use crate::models::order::{OrderId, OrderRequest, OrderResult, OrderSide, OrderType};
pub use crate::models::twap::{ChunkOutcome, ChunkRecord, TwapPlan, TwapRun};
pub use crate::order_core::OrderManager;
