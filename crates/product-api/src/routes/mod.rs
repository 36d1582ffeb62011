//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (공개)
//! - `/api/auth/login` - 로그인 (공개)
//! - `/api/products` - 상품 CRUD + 페이지네이션 (인증 필요)
//!
//! 인증 요구는 각 핸들러의 `AuthIdentity` 추출기 선언으로
//! 표현됩니다. 라우트 테이블이 곧 정적 허용 목록입니다.

pub mod auth;
pub mod health;
pub mod products;

pub use auth::{auth_router, LoginRequest, LoginResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use products::{products_router, PageQuery, ProductPageResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트 (공개)
        .nest("/health", health_router())
        // 인증 엔드포인트 (공개)
        .nest("/api/auth", auth_router())
        // 상품 엔드포인트 (인증 필요)
        .nest("/api/products", products_router())
}
