//! 주문 검증 및 단일 주문 제출

pub mod manager;
pub mod validator;

pub use manager::OrderManager;
