//! 인증 서비스.
//!
//! 자격증명 검증과 토큰 발급/검증을 조율합니다. 로그인 실패는
//! "알 수 없는 사용자"와 "잘못된 비밀번호"를 구분하지 않고 하나의
//! `InvalidCredentials`로 합칩니다 — 사용자 이름 열거 방지.
//!
//! 재시도나 잠금(lockout)은 없습니다. 호출당 검증은 정확히 한 번이며,
//! 로그인 속도 제한은 이 계층의 범위 밖입니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use product_core::AuthenticatedIdentity;

use super::jwt::{MintError, TokenCodec, TokenError};
use super::store::{StoreError, UserStore};

/// 인증 에러.
///
/// 모든 변형은 외부 응답에서 동일한 401로 합쳐집니다. 내부 관측을
/// 위해서만 구분됩니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 자격증명 불일치 (사용자 부재 포함)
    #[error("아이디 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 토큰 검증 실패
    #[error(transparent)]
    Token(#[from] TokenError),

    /// 서명은 유효하지만 subject가 더 이상 저장소에 없음
    #[error("알 수 없는 사용자의 토큰입니다")]
    UnknownSubject,

    /// 토큰 발급 실패 (서버 측 장애)
    #[error(transparent)]
    Mint(#[from] MintError),

    /// 자격증명 저장소 접근 실패 (서버 측 장애)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// 메트릭 라벨용 종류 문자열.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Token(e) => e.kind(),
            AuthError::UnknownSubject => "unknown_subject",
            AuthError::Mint(_) => "mint_failure",
            AuthError::Store(_) => "store_failure",
        }
    }

    /// 서버 측 장애인지 확인합니다 (401이 아니라 500으로 매핑).
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Mint(_) | AuthError::Store(_))
    }
}

/// 인증 서비스.
///
/// 요청 간 상태를 보관하지 않으며 동시 호출이 안전합니다.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    /// 저장소와 토큰 코덱으로 서비스를 만듭니다.
    pub fn new(store: Arc<dyn UserStore>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// 로그인: 자격증명 검증 후 토큰 발급.
    ///
    /// 검증 시도는 호출당 한 번입니다. 실패 원인은 로그로만 남기고
    /// 반환 에러는 균일합니다.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        match self.store.verify_credentials(username, password).await? {
            Some(principal) => {
                let token = self.codec.mint(&principal.username, now)?;
                tracing::info!(username = %principal.username, "로그인 성공");
                Ok(token)
            }
            None => {
                // 사용자 부재와 비밀번호 불일치를 로그에서도 구분하지 않음
                tracing::warn!(username, "로그인 실패");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// 토큰 검증 후 요청 신원 구성.
    ///
    /// 서명과 만료가 확인된 뒤, 권한은 토큰이 아니라 자격증명
    /// 저장소에서 새로 읽습니다. 따라서 권한 변경은 발급된 토큰에도
    /// 즉시 적용되고, 삭제된 사용자의 토큰은 만료 전이라도
    /// 거부됩니다.
    pub async fn authenticate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let claims = self.codec.verify(token, now)?;

        let principal = self
            .store
            .find_user(&claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        Ok(AuthenticatedIdentity::from(&principal))
    }

    /// 토큰 코덱 참조.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::InMemoryUserStore;
    use product_core::config::BootstrapUser;
    use secrecy::SecretString;

    const TEST_SECRET: &str = "test-secret-key-for-auth-service-testing-32ch";

    fn test_service() -> AuthService {
        let store = InMemoryUserStore::from_bootstrap(&[BootstrapUser::default()]).unwrap();
        let codec = TokenCodec::new(&SecretString::new(TEST_SECRET.into()), 60);
        AuthService::new(Arc::new(store), Arc::new(codec))
    }

    #[tokio::test]
    async fn test_login_then_authenticate() {
        let service = test_service();
        let now = Utc::now();

        let token = service.login("testuser", "Test123", now).await.unwrap();
        let identity = service.authenticate(&token, now).await.unwrap();

        assert_eq!(identity.subject, "testuser");
        assert!(identity.has_permission("admin"));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = test_service();
        let result = service.login("testuser", "wrong", Utc::now()).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user_same_error() {
        let service = test_service();

        let wrong_password = service
            .login("testuser", "wrong", Utc::now())
            .await
            .unwrap_err();
        let unknown_user = service
            .login("nobody", "Test123", Utc::now())
            .await
            .unwrap_err();

        // 두 실패는 구분 불가능해야 함
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.kind(), unknown_user.kind());
    }

    #[tokio::test]
    async fn test_authenticate_expired_token() {
        let service = test_service();
        let now = Utc::now();

        let token = service.login("testuser", "Test123", now).await.unwrap();

        let after_expiry = now + chrono::Duration::minutes(61);
        let result = service.authenticate(&token, after_expiry).await;
        assert!(matches!(result, Err(AuthError::Token(TokenError::Expired))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_subject_rejected() {
        // 토큰은 유효하지만 subject가 저장소에 없는 경우
        let codec = Arc::new(TokenCodec::new(&SecretString::new(TEST_SECRET.into()), 60));
        let store = InMemoryUserStore::from_bootstrap(&[BootstrapUser::default()]).unwrap();
        let service = AuthService::new(Arc::new(store), codec.clone());

        let now = Utc::now();
        let token = codec.mint("ghost", now).unwrap();

        let result = service.authenticate(&token, now).await;
        assert!(matches!(result, Err(AuthError::UnknownSubject)));
    }

    #[tokio::test]
    async fn test_permissions_resolved_fresh_per_request() {
        // 같은 subject의 토큰이라도 권한은 저장소의 현재 상태를 따름
        let codec = Arc::new(TokenCodec::new(&SecretString::new(TEST_SECRET.into()), 60));
        let now = Utc::now();
        let token = codec.mint("testuser", now).unwrap();

        let full = InMemoryUserStore::from_bootstrap(&[BootstrapUser::default()]).unwrap();
        let service = AuthService::new(Arc::new(full), codec.clone());
        let identity = service.authenticate(&token, now).await.unwrap();
        assert!(identity.has_permission("admin"));

        // admin 권한이 회수된 저장소에서는 같은 토큰에 admin이 없음
        let reduced = InMemoryUserStore::from_bootstrap(&[BootstrapUser {
            permissions: vec!["user".to_string()],
            ..Default::default()
        }])
        .unwrap();
        let service = AuthService::new(Arc::new(reduced), codec);
        let identity = service.authenticate(&token, now).await.unwrap();
        assert!(!identity.has_permission("admin"));
        assert!(identity.has_permission("user"));
    }
}
