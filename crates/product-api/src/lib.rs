//! REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 상품 관리 REST API
//! - 상태 비저장 JWT 인증 파이프라인
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//! - OpenAPI 문서 및 Swagger UI
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증 파이프라인 (코덱, 저장소, 추출기)
//! - [`repository`]: 상품 저장소
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    AuthError, AuthIdentity, AuthService, Claims, TokenCodec, TokenError, UserStore,
};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use routes::*;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// 전체 애플리케이션 라우터 조립.
///
/// 라우트, 문서, 메트릭 엔드포인트에 미들웨어 스택을 적용합니다.
///
/// 미들웨어 실행 순서 (바깥 → 안):
///
/// ```text
/// TraceLayer → TimeoutLayer → CorsLayer → MetricsLayer → Handler
/// ```
///
/// 인증은 전역 미들웨어가 아니라 핸들러별 `AuthIdentity` 추출기로
/// 적용됩니다 — 라우트 테이블이 정적 허용 목록입니다.
pub fn app(state: Arc<AppState>, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut router = routes::create_api_router().merge(openapi::swagger_ui_router());

    // /metrics 엔드포인트 (공개, 헬스 체크와 동일)
    if let Some(handle) = metrics_handle {
        router = router.route(
            "/metrics",
            axum::routing::get(move || std::future::ready(handle.render())),
        );
    }

    router
        // AuthIdentity 추출기가 사용하는 인증 서비스
        .layer(axum::Extension(state.auth.clone()))
        .layer(axum::middleware::from_fn(middleware::metrics_layer))
        // 기존 시스템과 동일하게 모든 오리진 허용
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
