//! TWAP 실행 테스트
//!
//! 분할 수, 실패 격리, 대기 횟수, 취소 동작 검증

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use futures_bot::exchange::mocks::MockGateway;
use futures_bot::{
  ChunkOutcome, ExecutionEvent, MemorySink, OrderSide, OrderType, SharedGateway, TradingError, TwapExecutor,
  TwapPlan,
};

fn executor_with(gateway: &Arc<RwLock<MockGateway>>) -> (TwapExecutor, Arc<MemorySink>) {
  let shared: SharedGateway = gateway.clone();
  let events = Arc::new(MemorySink::new());
  (TwapExecutor::new(shared, events.clone()), events)
}

#[tokio::test]
async fn test_all_chunks_fill() {
  let gateway = Arc::new(RwLock::new(MockGateway::filling(0.25)));
  let (executor, _) = executor_with(&gateway);
  let plan = TwapPlan::new("BTCUSDT", OrderSide::Buy, 1.0, 4, 0).unwrap();

  let run = executor.execute(&plan, &CancellationToken::new()).await;

  assert_eq!(run.chunks_succeeded, 4);
  assert_eq!(run.total_executed, 1.0);
  assert_eq!(run.chunks_attempted, 4);
  assert!(run.is_completed());

  let gw = gateway.read().await;
  assert_eq!(gw.call_count(), 4);
  for request in gw.requests() {
    assert_eq!(request.symbol(), "BTCUSDT");
    assert_eq!(request.side(), OrderSide::Buy);
    assert_eq!(request.order_type(), OrderType::Market);
    assert_eq!(request.quantity(), 0.25);
    assert_eq!(request.price(), None);
  }
}

#[tokio::test]
async fn test_failed_chunk_does_not_stop_run() {
  let gateway = Arc::new(RwLock::new(MockGateway::filling(0.25).failing_on(&[2])));
  let (executor, events) = executor_with(&gateway);
  let plan = TwapPlan::new("BTCUSDT", OrderSide::Buy, 1.0, 4, 0).unwrap();

  let run = executor.execute(&plan, &CancellationToken::new()).await;

  assert_eq!(run.chunks_succeeded, 3);
  assert_eq!(run.total_executed, 0.75);
  assert_eq!(run.chunks_attempted, 4);
  assert!(run.is_completed());
  assert!(matches!(run.outcome(2), Some(ChunkOutcome::Failed(_))));
  assert!(matches!(run.outcome(3), Some(ChunkOutcome::Executed(_))));
  assert_eq!(gateway.read().await.call_count(), 4);

  // 실패한 분할은 인덱스와 수량을 포함해 기록된다
  let failed: Vec<_> = events.events().into_iter()
    .filter_map(|e| match e {
      ExecutionEvent::ChunkFailed { index, quantity, message, .. } => Some((index, quantity, message)),
      _ => None,
    })
    .collect();
  assert_eq!(failed.len(), 1);
  assert_eq!(failed[0].0, 2);
  assert_eq!(failed[0].1, 0.25);
  assert!(failed[0].2.contains("-2021"));
}

#[tokio::test]
async fn test_every_chunk_failing_still_completes() {
  let gateway = Arc::new(RwLock::new(MockGateway::always_failing("Invalid API-key")));
  let (executor, _) = executor_with(&gateway);
  let plan = TwapPlan::new("BTCUSDT", OrderSide::Sell, 3.0, 6, 0).unwrap();

  let run = executor.execute(&plan, &CancellationToken::new()).await;

  assert_eq!(run.chunks_succeeded, 0);
  assert_eq!(run.total_executed, 0.0);
  assert_eq!(run.chunks_attempted, 6);
  assert_eq!(run.outcomes.len(), 6);
  assert!(run.is_completed());
  assert_eq!(gateway.read().await.call_count(), 6);
}

#[tokio::test]
async fn test_chunk_size_is_not_rounded() {
  let gateway = Arc::new(RwLock::new(MockGateway::new()));
  let (executor, _) = executor_with(&gateway);
  let plan = TwapPlan::new("BTCUSDT", OrderSide::Buy, 0.01, 3, 0).unwrap();

  let run = executor.execute(&plan, &CancellationToken::new()).await;

  assert_eq!(run.chunk_size, 0.01 / 3.0);
  let gw = gateway.read().await;
  assert!(gw.requests().iter().all(|r| r.quantity() == 0.01 / 3.0));
}

#[tokio::test]
async fn test_underflowing_chunk_still_reaches_gateway() {
  let gateway = Arc::new(RwLock::new(MockGateway::always_failing("Quantity less than or equal to zero.")));
  let (executor, _) = executor_with(&gateway);
  let plan = TwapPlan::new("BTCUSDT", OrderSide::Buy, 5e-324, 2, 0).unwrap();
  assert_eq!(plan.chunk_size(), 0.0);

  let run = executor.execute(&plan, &CancellationToken::new()).await;

  assert_eq!(run.chunks_attempted, 2);
  assert_eq!(run.chunks_failed(), 2);
  assert!(run.is_completed());
  let gw = gateway.read().await;
  assert_eq!(gw.call_count(), 2);
  assert!(gw.requests().iter().all(|r| r.quantity() == 0.0 && r.order_type() == OrderType::Market));
  match run.outcome(0) {
    Some(ChunkOutcome::Failed(error)) => assert!(error.message.contains("-2021")),
    other => panic!("unexpected outcome {:?}", other),
  }
}

#[tokio::test(start_paused = true)]
async fn test_waits_only_between_chunks() {
  let gateway = Arc::new(RwLock::new(MockGateway::filling(0.25)));
  let (executor, _) = executor_with(&gateway);
  let plan = TwapPlan::new("BTCUSDT", OrderSide::Buy, 1.0, 4, 10).unwrap();

  let start = tokio::time::Instant::now();
  let run = executor.execute(&plan, &CancellationToken::new()).await;
  let elapsed = start.elapsed();

  assert_eq!(run.waits, 3);
  assert!(elapsed >= Duration::from_secs(30), "{:?}", elapsed);
  assert!(elapsed < Duration::from_secs(31), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_single_chunk_never_waits() {
  let gateway = Arc::new(RwLock::new(MockGateway::new()));
  let (executor, _) = executor_with(&gateway);
  let plan = TwapPlan::new("BTCUSDT", OrderSide::Buy, 1.0, 1, 60).unwrap();

  let start = tokio::time::Instant::now();
  let run = executor.execute(&plan, &CancellationToken::new()).await;

  assert_eq!(run.waits, 0);
  assert_eq!(run.chunks_attempted, 1);
  assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_wait_returns_partial_run() {
  let gateway = Arc::new(RwLock::new(MockGateway::filling(0.25)));
  let (executor, events) = executor_with(&gateway);
  let plan = TwapPlan::new("BTCUSDT", OrderSide::Buy, 1.0, 4, 10).unwrap();

  let cancel = CancellationToken::new();
  let trigger = cancel.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_secs(15)).await;
    trigger.cancel();
  });

  let run = executor.execute(&plan, &cancel).await;

  assert!(run.cancelled);
  assert!(!run.is_completed());
  assert_eq!(run.chunks_attempted, 2);
  assert_eq!(run.chunks_succeeded, 2);
  assert_eq!(run.total_executed, 0.5);
  assert_eq!(run.waits, 1);
  assert_eq!(gateway.read().await.call_count(), 2);
  assert!(matches!(
    events.events().last(),
    Some(ExecutionEvent::TwapCancelled { succeeded: 2, attempted: 2, .. })
  ));
}

#[test]
fn test_invalid_plan_is_rejected_before_execution() {
  assert!(matches!(
    TwapPlan::new("BTCUSDT", OrderSide::Buy, 1.0, 0, 5),
    Err(TradingError::InvalidPlan(_))
  ));
  assert!(matches!(
    TwapPlan::new("BTCUSDT", OrderSide::Buy, 1.0, 4, -5),
    Err(TradingError::InvalidPlan(_))
  ));
}
