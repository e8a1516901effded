/**
* filename : main
* author : HAMA
* date: 2025. 5. 8.
* description: 단일 주문 / TWAP / HTTP 폼 진입점
**/

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use futures_bot::config::{Config, DEFAULT_CONFIG_PATH};
use futures_bot::events::{EventSink, ExecutionEvent, FanoutSink, LogSink};
use futures_bot::exchange;
use futures_bot::http::{self, AppState};
use futures_bot::utils::logging;
use futures_bot::{
    OrderManager, OrderRequest, OrderResult, OrderSide, TradingError, TwapExecutor, TwapPlan, TwapRun,
};

#[derive(Parser)]
#[command(name = "futures-bot")]
#[command(about = "Binance Futures Testnet Trading Bot", version)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Acknowledge orders locally instead of calling the exchange
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a MARKET or LIMIT order
    Order {
        /// Trading symbol (e.g., BTCUSDT)
        #[arg(long)]
        symbol: String,
        /// Order side (BUY or SELL)
        #[arg(long)]
        side: String,
        /// Order type (MARKET or LIMIT)
        #[arg(long = "type")]
        order_type: String,
        /// Order quantity
        #[arg(long, allow_negative_numbers = true)]
        quantity: f64,
        /// Order price (required for LIMIT orders)
        #[arg(long, allow_negative_numbers = true)]
        price: Option<f64>,
    },
    /// Place a MARKET order
    Market {
        symbol: String,
        side: String,
        #[arg(allow_negative_numbers = true)]
        quantity: f64,
    },
    /// Place a LIMIT (GTC) order
    Limit {
        symbol: String,
        side: String,
        #[arg(allow_negative_numbers = true)]
        quantity: f64,
        #[arg(allow_negative_numbers = true)]
        price: f64,
    },
    /// Split a MARKET order into equal chunks placed at a fixed interval
    Twap {
        symbol: String,
        side: String,
        #[arg(allow_negative_numbers = true)]
        total_quantity: f64,
        #[arg(allow_negative_numbers = true)]
        chunks: i64,
        #[arg(allow_negative_numbers = true)]
        interval_seconds: i64,
    },
    /// Serve the order form and JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

/// 분할 결과를 터미널에 바로 출력
struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: ExecutionEvent) {
        match event {
            ExecutionEvent::ChunkExecuted { index, result, .. } => {
                println!("Chunk {}: Order {} executed {}", index + 1, result.order_id, result.executed_quantity);
            }
            ExecutionEvent::ChunkFailed { index, message, .. } => {
                println!("Chunk {} failed: {}", index + 1, message);
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("✗ {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    if cli.dry_run {
        config.exchange.dry_run = true;
    }

    // 로깅 초기화
    logging::init(&config.logging).context("failed to initialize logging")?;

    let code = match cli.command {
        Commands::Order { symbol, side, order_type, quantity, price } => {
            let request = OrderRequest::from_parts(&symbol, &side, &order_type, quantity, price);
            run_single_order(&config, request).await
        }
        Commands::Market { symbol, side, quantity } => {
            let request = OrderRequest::from_parts(&symbol, &side, "MARKET", quantity, None);
            run_single_order(&config, request).await
        }
        Commands::Limit { symbol, side, quantity, price } => {
            let request = OrderRequest::from_parts(&symbol, &side, "LIMIT", quantity, Some(price));
            run_single_order(&config, request).await
        }
        Commands::Twap { symbol, side, total_quantity, chunks, interval_seconds } => {
            let plan = side
                .parse::<OrderSide>()
                .and_then(|side| TwapPlan::new(symbol.trim(), side, total_quantity, chunks, interval_seconds));
            run_twap(&config, plan).await
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host { config.server.host = host; }
            if let Some(port) = port { config.server.port = port; }
            run_server(&config).await?
        }
    };

    Ok(code)
}

async fn run_single_order(config: &Config, request: Result<OrderRequest, TradingError>) -> ExitCode {
    let events: Arc<dyn EventSink> = Arc::new(LogSink::new("cli"));

    let request = match request {
        Ok(request) => request,
        Err(e) => {
            log::error!("Input validation failed: {}", e);
            println!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    print_request_summary(&request);

    let gateway = match exchange::connect(&config.exchange, events.clone()) {
        Ok(gateway) => gateway,
        Err(e) => {
            log::error!("Client initialization failed: {}", e);
            println!("✗ Client initialization failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let manager = OrderManager::new(gateway, events);

    let outcome = tokio::select! {
        outcome = manager.place_order(request) => outcome,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Operation cancelled by user");
            println!("\n✗ Operation cancelled");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Ok(result) => {
            print_order_response(&result);
            println!();
            println!("✓ Order placed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_twap(config: &Config, plan: Result<TwapPlan, TradingError>) -> ExitCode {
    let plan = match plan {
        Ok(plan) => plan,
        Err(e) => {
            log::error!("TWAP validation failed: {}", e);
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let log_sink: Arc<dyn EventSink> = Arc::new(LogSink::new("twap"));
    let gateway = match exchange::connect(&config.exchange, log_sink.clone()) {
        Ok(gateway) => gateway,
        Err(e) => {
            log::error!("Client initialization failed: {}", e);
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let events: Arc<dyn EventSink> = Arc::new(FanoutSink::new(vec![log_sink, Arc::new(ConsoleSink)]));
    let executor = TwapExecutor::new(gateway, events);

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Operation cancelled by user");
                cancel.cancel();
            }
        })
    };

    let run = executor.execute(&plan, &cancel).await;
    watcher.abort();

    if run.cancelled {
        println!("\n✗ Operation cancelled");
        println!("{}", run.summary());
    } else {
        println!("TWAP completed: {} orders, {} total executed", run.chunks_succeeded, run.total_executed);
        if run.chunks_failed() > 0 {
            println!("{} of {} chunks failed", run.chunks_failed(), run.chunk_count);
        }
    }
    ExitCode::from(twap_exit_status(&run))
}

/// 취소된 실행만 실패. 분할 실패가 있어도 루프가 끝났으면 성공.
fn twap_exit_status(run: &TwapRun) -> u8 {
    if run.cancelled { 1 } else { 0 }
}

async fn run_server(config: &Config) -> anyhow::Result<ExitCode> {
    let events: Arc<dyn EventSink> = Arc::new(LogSink::new("http"));

    let gateway = match exchange::connect(&config.exchange, events.clone()) {
        Ok(gateway) => gateway,
        Err(e) => {
            log::error!("Client initialization failed: {}", e);
            println!("✗ Client initialization failed: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let shutdown = CancellationToken::new();
    let state = AppState {
        orders: Arc::new(OrderManager::new(gateway.clone(), events.clone())),
        twap: Arc::new(TwapExecutor::new(gateway, events)),
        shutdown: shutdown.clone(),
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    println!("Serving order form on http://{}/", addr);
    http::serve(addr, state).await?;

    Ok(ExitCode::SUCCESS)
}

fn print_request_summary(request: &OrderRequest) {
    println!("Order Request Summary:");
    println!("  Symbol: {}", request.symbol());
    println!("  Side: {}", request.side());
    println!("  Type: {}", request.order_type());
    println!("  Quantity: {}", request.quantity());
    if let Some(price) = request.price() {
        println!("  Price: {}", price);
    }
    println!();
}

fn print_order_response(result: &OrderResult) {
    println!("Order Response:");
    println!("  Order ID: {}", result.order_id);
    println!("  Status: {}", result.status);
    println!("  Executed Qty: {}", result.executed_quantity);
    if let Some(price) = result.display_price() {
        println!("  Avg Price: {}", price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_bot::exchange::mocks::MockGateway;
    use futures_bot::{MemorySink, SharedGateway};
    use tokio::sync::RwLock;

    async fn run_with(gateway: MockGateway, cancel: CancellationToken) -> TwapRun {
        let gateway: SharedGateway = Arc::new(RwLock::new(gateway));
        let executor = TwapExecutor::new(gateway, Arc::new(MemorySink::new()));
        let plan = TwapPlan::new("BTCUSDT", OrderSide::Buy, 1.0, 4, 0).unwrap();
        executor.execute(&plan, &cancel).await
    }

    #[tokio::test]
    async fn test_every_chunk_failed_exits_zero() {
        let run = run_with(MockGateway::always_failing("Invalid API-key"), CancellationToken::new()).await;
        assert_eq!(run.chunks_succeeded, 0);
        assert_eq!(twap_exit_status(&run), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_exits_zero() {
        let run = run_with(MockGateway::filling(0.25).failing_on(&[1, 3]), CancellationToken::new()).await;
        assert_eq!(run.chunks_failed(), 2);
        assert_eq!(twap_exit_status(&run), 0);
    }

    #[tokio::test]
    async fn test_cancelled_run_exits_one() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let run = run_with(MockGateway::new(), cancel).await;
        assert!(run.cancelled);
        assert_eq!(twap_exit_status(&run), 1);
    }
}
