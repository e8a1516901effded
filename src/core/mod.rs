//! 주문 실행 알고리즘의 핵심 구현체

pub mod twap_executor;

pub use twap_executor::TwapExecutor;
