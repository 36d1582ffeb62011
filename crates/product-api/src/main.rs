//! 상품 관리 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 로그인(JWT 발급), 상품 CRUD, 헬스 체크, 메트릭 엔드포인트를
//! 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use product_api::setup_metrics_recorder;
use product_api::state::AppState;
use product_core::logging::{init_logging, LogConfig};
use product_core::{AppConfig, DEV_JWT_SECRET};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드 (파일 + PRODUCT__ 환경 변수)
    let config = AppConfig::load_default()?;

    // tracing 초기화
    let format = config.logging.format.parse().unwrap_or_default();
    init_logging(LogConfig::new(config.logging.level.as_str()).with_format(format))?;

    info!("Starting Product Management API server...");

    // 서명 시크릿은 기동 시 한 번 읽히고 이후 불변이다
    if config.auth.jwt_secret.expose_secret() == DEV_JWT_SECRET {
        warn!("JWT 시크릿이 기본값입니다. 운영환경에서는 반드시 PRODUCT__AUTH__JWT_SECRET을 설정하세요");
    }

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = setup_metrics_recorder();

    let addr = config.server.socket_addr()?;
    let database_url = config
        .database
        .url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok());

    // AppState 생성 (기동 사용자 등록 포함)
    let mut state = AppState::new(config)?;

    // 데이터베이스 연결 (설정된 경우)
    if let Some(url) = database_url {
        let db_config = &state.config.database;
        match PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connection_timeout_secs))
            .connect(&url)
            .await
        {
            Ok(pool) => {
                info!("Database connected");
                state = state.with_db_pool(pool);
            }
            Err(e) => {
                warn!(error = %e, "데이터베이스 연결 실패, 인메모리 저장소로 기동합니다");
            }
        }
    }

    let state = Arc::new(state);
    info!(
        version = %state.version,
        has_db = state.db_pool.is_some(),
        "Application state initialized"
    );

    // 라우터 생성
    let app = product_api::app(state, Some(metrics_handle));

    // 서버 시작
    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
