//! 거래소 주문 게이트웨이

pub mod binance_futures;
pub mod dry_run;
pub mod mocks;
pub mod traits;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::ExchangeConfig;
use crate::error::TradingError;
use crate::events::EventSink;

pub use binance_futures::BinanceFuturesGateway;
pub use dry_run::DryRunGateway;
pub use traits::OrderGateway;

/// 공유 게이트웨이 핸들
pub type SharedGateway = Arc<RwLock<dyn OrderGateway>>;

/// 설정에 따라 게이트웨이 생성 (자격 증명 누락 시 ConfigError)
pub fn connect(config: &ExchangeConfig, events: Arc<dyn EventSink>) -> Result<SharedGateway, TradingError> {
    let gateway: SharedGateway = if config.dry_run {
        Arc::new(RwLock::new(DryRunGateway::new(events)))
    } else {
        Arc::new(RwLock::new(BinanceFuturesGateway::from_config(config, events)?))
    };
    Ok(gateway)
}
