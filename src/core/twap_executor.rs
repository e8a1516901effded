/**
* filename : twap_executor
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::GatewayError;
use crate::events::{EventSink, ExecutionEvent};
use crate::exchange::SharedGateway;
use crate::models::order::{OrderRequest, OrderResult};
use crate::models::twap::{TwapPlan, TwapRun};

/// TWAP 실행기
///
/// 분할 주문을 순차적으로 제출하고, 개별 분할 실패는 기록만 하고 다음
/// 분할로 진행한다. 취소 토큰은 각 분할 전과 대기 중에 확인한다.
pub struct TwapExecutor {
  /// 거래소 게이트웨이
  gateway: SharedGateway,
  /// 이벤트 싱크
  events: Arc<dyn EventSink>,
}

impl TwapExecutor {
  /// 새 TWAP 실행기 생성
  pub fn new(gateway: SharedGateway, events: Arc<dyn EventSink>) -> Self {
    TwapExecutor { gateway, events }
  }

  /// TWAP 실행. 모든 분할이 실패해도 완료된 실행 결과를 돌려준다.
  pub async fn execute(&self, plan: &TwapPlan, cancel: &CancellationToken) -> TwapRun {
    let mut run = TwapRun::start(plan);
    let chunks = plan.chunk_count();
    let chunk_size = plan.chunk_size();
    let chunk = plan.chunk_request();

    self.events.emit(ExecutionEvent::TwapStarted {
      symbol: plan.symbol().to_string(),
      side: plan.side().to_string(),
      total_quantity: plan.total_quantity(),
      chunks,
      interval_seconds: plan.interval_seconds(),
    });

    let mut cancelled = false;

    for index in 0..chunks {
      if cancel.is_cancelled() {
        cancelled = true;
        break;
      }

      self.events.emit(ExecutionEvent::ChunkSubmitting { index, chunks, quantity: chunk_size });

      match self.submit_chunk(&chunk).await {
        Ok(result) => {
          self.events.emit(ExecutionEvent::ChunkExecuted { index, chunks, result: result.clone() });
          run.record_success(index, result);
        }
        Err(error) => {
          self.events.emit(ExecutionEvent::ChunkFailed {
            index,
            chunks,
            quantity: chunk_size,
            message: error.message.clone(),
          });
          run.record_failure(index, error);
        }
      }

      // 마지막 분할 뒤에는 대기하지 않음
      if index + 1 < chunks {
        tokio::select! {
          _ = cancel.cancelled() => {
            cancelled = true;
            break;
          }
          _ = tokio::time::sleep(plan.interval()) => {
            run.waits += 1;
          }
        }
      }
    }

    run.finish(cancelled);

    let (succeeded, attempted, total_executed) = (run.chunks_succeeded, run.chunks_attempted, run.total_executed);
    if cancelled {
      self.events.emit(ExecutionEvent::TwapCancelled { succeeded, attempted, total_executed });
    } else {
      self.events.emit(ExecutionEvent::TwapCompleted { succeeded, attempted, total_executed });
    }

    run
  }

  /// 분할 시장가 주문 제출
  async fn submit_chunk(&self, request: &OrderRequest) -> Result<OrderResult, GatewayError> {
    let mut gateway = self.gateway.write().await;
    gateway.submit_order(request).await
  }
}
