//! TWAP 실행 계획과 실행 결과
//!
//! `TwapPlan`은 검증된 불변 값이고, `TwapRun`은 한 번의 실행 동안
//! 실행기만이 소유하는 누적기다.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::error::{GatewayError, TradingError};
use crate::models::order::{OrderRequest, OrderResult, OrderSide};
use crate::order_core::validator;

/// 검증된 TWAP 실행 계획
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TwapPlan {
    symbol: String,
    side: OrderSide,
    total_quantity: f64,
    chunk_count: usize,
    interval_seconds: u64,
}

impl TwapPlan {
    /// 새 TWAP 계획 생성
    ///
    /// 분할 수와 간격은 부호 있는 정수로 받아 음수 입력도 `InvalidPlan`으로 거른다.
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        total_quantity: f64,
        chunk_count: i64,
        interval_seconds: i64,
    ) -> Result<Self, TradingError> {
        let symbol = symbol.into();
        validator::validate_symbol(&symbol).map_err(into_plan_error)?;
        validator::validate_quantity(total_quantity).map_err(into_plan_error)?;

        if chunk_count < 1 {
            return Err(TradingError::InvalidPlan("Chunks must be positive".to_string()));
        }
        if interval_seconds < 0 {
            return Err(TradingError::InvalidPlan("Interval must be non-negative".to_string()));
        }

        Ok(TwapPlan {
            symbol,
            side,
            total_quantity,
            chunk_count: chunk_count as usize,
            interval_seconds: interval_seconds as u64,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn total_quantity(&self) -> f64 {
        self.total_quantity
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn interval_seconds(&self) -> u64 {
        self.interval_seconds
    }

    /// 분할 하나에 해당하는 시장가 주문
    pub fn chunk_request(&self) -> OrderRequest {
        OrderRequest::chunk(&self.symbol, self.side, self.chunk_size())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// 분할 수량. 거래소 lot size 보정 없이 그대로 나눈 값이다.
    pub fn chunk_size(&self) -> f64 {
        self.total_quantity / self.chunk_count as f64
    }
}

fn into_plan_error(err: TradingError) -> TradingError {
    match err {
        TradingError::Validation(msg) => TradingError::InvalidPlan(msg),
        other => other,
    }
}

/// 분할 주문 하나의 결과
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChunkOutcome {
    Executed(OrderResult),
    Failed(GatewayError),
}

impl ChunkOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ChunkOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChunkRecord {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: ChunkOutcome,
}

/// 한 번의 TWAP 실행 누적 결과
#[derive(Debug, Clone, Serialize)]
pub struct TwapRun {
    pub symbol: String,
    pub side: OrderSide,
    pub chunk_size: f64,
    pub chunk_count: usize,
    pub chunks_attempted: usize,
    pub chunks_succeeded: usize,
    pub total_executed: f64,
    pub outcomes: Vec<ChunkRecord>,
    /// 완료된 분할 간 대기 횟수
    pub waits: usize,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TwapRun {
    pub fn start(plan: &TwapPlan) -> Self {
        TwapRun {
            symbol: plan.symbol().to_string(),
            side: plan.side(),
            chunk_size: plan.chunk_size(),
            chunk_count: plan.chunk_count(),
            chunks_attempted: 0,
            chunks_succeeded: 0,
            total_executed: 0.0,
            outcomes: Vec::new(),
            waits: 0,
            cancelled: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub(crate) fn record_success(&mut self, index: usize, result: OrderResult) {
        self.chunks_attempted += 1;
        self.chunks_succeeded += 1;
        self.total_executed += result.executed_quantity;
        self.outcomes.push(ChunkRecord { index, outcome: ChunkOutcome::Executed(result) });
    }

    pub(crate) fn record_failure(&mut self, index: usize, error: GatewayError) {
        self.chunks_attempted += 1;
        self.outcomes.push(ChunkRecord { index, outcome: ChunkOutcome::Failed(error) });
    }

    pub(crate) fn finish(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
        self.finished_at = Some(Utc::now());
    }

    pub fn chunks_failed(&self) -> usize {
        self.chunks_attempted - self.chunks_succeeded
    }

    pub fn is_completed(&self) -> bool {
        self.finished_at.is_some() && !self.cancelled
    }

    pub fn outcome(&self, index: usize) -> Option<&ChunkOutcome> {
        self.outcomes.iter().find(|r| r.index == index).map(|r| &r.outcome)
    }

    /// 실행 결과 요약
    pub fn summary(&self) -> String {
        let state = if self.cancelled { "cancelled" } else { "completed" };
        format!(
            "TWAP {}: {} orders, {} total executed ({} of {} chunks attempted, {} failed)",
            state,
            self.chunks_succeeded,
            self.total_executed,
            self.chunks_attempted,
            self.chunk_count,
            self.chunks_failed(),
        )
    }
}
