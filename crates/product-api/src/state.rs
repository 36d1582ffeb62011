//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 접근할 수 있는 공유 리소스를
//! 포함합니다. Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use product_core::AppConfig;

use crate::auth::{
    AuthService, InMemoryUserStore, PgUserStore, StoreError, TokenCodec, UserStore,
};
use crate::repository::{MemoryProductStore, PgProductStore, ProductStore};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다. 토큰 코덱과
/// 저장소는 기동 시 한 번 구성되고 이후 불변입니다.
pub struct AppState {
    /// 애플리케이션 설정
    pub config: Arc<AppConfig>,

    /// 자격증명 저장소 (인메모리 또는 PostgreSQL)
    pub users: Arc<dyn UserStore>,

    /// 상품 저장소 (인메모리 또는 PostgreSQL)
    pub products: Arc<dyn ProductStore>,

    /// 인증 서비스 - 로그인 및 요청 인증
    pub auth: AuthService,

    /// 데이터베이스 연결 풀 (헬스 체크용, 없으면 인메모리 모드)
    pub db_pool: Option<PgPool>,

    /// 서버 시작 시각 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 인메모리 저장소로 상태를 구성합니다.
    ///
    /// 기동 목록의 사용자가 해시되어 등록됩니다. 데이터베이스가
    /// 구성된 배포에서는 [`AppState::with_db_pool`]로 저장소를
    /// 교체합니다.
    pub fn new(config: AppConfig) -> Result<Self, StoreError> {
        let config = Arc::new(config);

        let users: Arc<dyn UserStore> =
            Arc::new(InMemoryUserStore::from_bootstrap(&config.auth.bootstrap_users)?);

        let codec = Arc::new(TokenCodec::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_minutes,
        ));
        let auth = AuthService::new(users.clone(), codec);

        Ok(Self {
            config,
            users,
            products: Arc::new(MemoryProductStore::new()),
            auth,
            db_pool: None,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 데이터베이스 기반 저장소로 전환합니다.
    ///
    /// 상품 저장소는 PostgreSQL로 교체됩니다. 사용자 저장소는
    /// `auth.users_from_database`가 켜진 경우에만 교체됩니다 —
    /// 기본 배포는 기동 목록 기반 인메모리 사용자를 유지합니다
    /// (기존 시스템과 동일한 구성).
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.products = Arc::new(PgProductStore::new(pool.clone()));

        if self.config.auth.users_from_database {
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            let codec = Arc::new(TokenCodec::new(
                &self.config.auth.jwt_secret,
                self.config.auth.token_ttl_minutes,
            ));
            self.auth = AuthService::new(users.clone(), codec);
            self.users = users;
        }

        self.db_pool = Some(pool);
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 상태 생성 (기본 설정, 인메모리 저장소).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(AppConfig::default()).expect("테스트 상태 생성 실패"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_default_config() {
        let state = create_test_state();
        assert!(state.db_pool.is_none());
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
        assert!(state.uptime_secs() >= 0);
    }

    #[tokio::test]
    async fn test_bootstrap_user_registered() {
        let state = create_test_state();
        let found = state.users.find_user("testuser").await.unwrap();
        assert!(found.is_some());
    }
}
