//! 자격증명 저장소.
//!
//! 알려진 사용자와 해시된 비밀번호를 보관하고 "이 username/password
//! 쌍이 알려진 사용자와 일치하는가, 권한 태그는 무엇인가"에
//! 답합니다.
//!
//! 저장소는 다형적 능력(capability)입니다: 기동 시 고정 목록으로
//! 채워지는 인메모리 구현과 PostgreSQL 기반 구현을 제공하며, 핵심
//! 로직은 어느 쪽인지 알지 못합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use product_core::config::BootstrapUser;
use product_core::Principal;

use super::password::{hash_password, verify_password};

/// 저장소 접근 에러.
///
/// 사용자 부재는 에러가 아니라 `Ok(None)`입니다. 이 타입은 저장소
/// 자체에 도달하지 못한 경우만 다룹니다.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 데이터베이스 에러
    #[error("자격증명 저장소 데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),

    /// 기동 시 사용자 등록 실패
    #[error("사용자 등록 실패: {0}")]
    Bootstrap(String),
}

/// 자격증명 저장소 인터페이스.
///
/// 모든 연산은 읽기 전용입니다. 사용자 목록은 기동 시 고정되므로
/// 동시 읽기에 동기화가 필요 없습니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 자격증명 검증.
    ///
    /// username이 정확히 일치하는 사용자를 찾고, 비밀번호가 저장된
    /// 해시와 일치할 때만 `Principal`을 반환합니다. 사용자 부재와
    /// 비밀번호 불일치는 모두 `None`입니다 — 호출자가 두 경우를
    /// 구분할 수 없어야 사용자 이름 열거를 막을 수 있습니다.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, StoreError>;

    /// username으로 사용자 조회.
    ///
    /// 토큰 검증 시 권한을 새로 읽어오는 데 사용됩니다.
    async fn find_user(&self, username: &str) -> Result<Option<Principal>, StoreError>;
}

// ================================================================================================
// 인메모리 구현
// ================================================================================================

/// 인메모리 자격증명 저장소.
///
/// 기동 시 설정의 사용자 목록을 해시하여 보관합니다. 외부 신원
/// 제공자가 없는 배포의 기본 구현입니다.
pub struct InMemoryUserStore {
    users: HashMap<String, Principal>,
}

impl InMemoryUserStore {
    /// 기동 설정의 사용자 목록으로 저장소를 만듭니다.
    ///
    /// 평문 비밀번호는 여기서 Argon2 해시로 변환되고 더 이상
    /// 보관되지 않습니다.
    pub fn from_bootstrap(users: &[BootstrapUser]) -> Result<Self, StoreError> {
        let mut map = HashMap::with_capacity(users.len());

        for user in users {
            let hash = hash_password(&user.password)
                .map_err(|e| StoreError::Bootstrap(format!("{}: {}", user.username, e)))?;
            let principal =
                Principal::new(user.username.as_str(), hash, user.permissions.iter().cloned());
            map.insert(user.username.clone(), principal);
        }

        tracing::info!(count = map.len(), "인메모리 사용자 저장소 초기화 완료");
        Ok(Self { users: map })
    }

    /// 이미 해시된 주체 목록으로 저장소를 만듭니다.
    pub fn from_principals(principals: impl IntoIterator<Item = Principal>) -> Self {
        Self {
            users: principals
                .into_iter()
                .map(|p| (p.username.clone(), p))
                .collect(),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, StoreError> {
        let Some(principal) = self.users.get(username) else {
            return Ok(None);
        };

        if verify_password(password, &principal.password_hash) {
            Ok(Some(principal.clone()))
        } else {
            Ok(None)
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        Ok(self.users.get(username).cloned())
    }
}

// ================================================================================================
// PostgreSQL 구현
// ================================================================================================

/// PostgreSQL 기반 자격증명 저장소.
///
/// 스키마:
///
/// ```sql
/// CREATE TABLE users (
///     username      TEXT PRIMARY KEY,
///     password_hash TEXT NOT NULL,
///     permissions   TEXT[] NOT NULL DEFAULT '{}'
/// );
/// ```
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// 커넥션 풀로 저장소를 만듭니다.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// users 테이블 레코드.
#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    username: String,
    password_hash: String,
    permissions: Vec<String>,
}

impl From<UserRecord> for Principal {
    fn from(record: UserRecord) -> Self {
        Principal::new(record.username, record.password_hash, record.permissions)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, StoreError> {
        let Some(principal) = self.find_user(username).await? else {
            return Ok(None);
        };

        if verify_password(password, &principal.password_hash) {
            Ok(Some(principal))
        } else {
            Ok(None)
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<Principal>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT username, password_hash, permissions FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Principal::from))
    }
}
