/**
* filename : error
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 거래소 API 실패 (전송, 인증, 거래소 거부)
///
/// 내부 구조는 노출하지 않고 사람이 읽을 수 있는 메시지만 보관한다.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        GatewayError { message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid TWAP plan: {0}")]
    InvalidPlan(String),

    #[error("Order failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TradingError {
    /// 네트워크 호출 전에 걸러지는 입력 오류인지 여부
    pub fn is_validation(&self) -> bool {
        matches!(self, TradingError::Validation(_) | TradingError::InvalidPlan(_))
    }
}
