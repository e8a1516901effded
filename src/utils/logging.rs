//! 로깅 유틸리티
//!
//! 로그 백엔드 초기화. 프로세스 진입점에서 한 번만 호출한다.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::LoggingConfig;
use crate::error::TradingError;

/// 로깅 시스템 초기화
///
/// 레벨은 설정값을 따르고 `RUST_LOG`가 있으면 그 필터가 우선한다.
/// `file_path`가 있으면 해당 파일에 이어 쓴다.
pub fn init(config: &LoggingConfig) -> Result<(), TradingError> {
    let mut builder = Builder::new();
    builder.filter_level(parse_level(&config.level));

    // RUST_LOG 환경변수 확인
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} | {} | {} | {}",
            buf.timestamp_millis(),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(path) = config.file_path.as_deref() {
        let path = Path::new(path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| TradingError::ConfigError(format!("Logger already initialized: {}", e)))?;

    log::info!("로깅 시스템 초기화 완료: 레벨 = {}", config.level);

    Ok(())
}

/// 로그 레벨 파싱
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}
