//! Axum용 인증 추출기.
//!
//! 보호된 핸들러는 `AuthIdentity` 추출기를 선언하는 것으로 인증을
//! 요구합니다. 공개 엔드포인트(로그인, 헬스 체크, API 문서)는
//! 선언하지 않습니다 — 라우트 테이블 자체가 정적 허용 목록입니다.
//!
//! 추출기는 요청 단위로만 동작하고 요청 간 상태를 보관하지 않으므로
//! 독립적인 요청들에 대해 동시 호출이 안전합니다. 거부된 요청은
//! 비즈니스 로직에 도달하기 전에 차단되며, 재시도는 클라이언트의
//! 몫입니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use product_core::AuthenticatedIdentity;

use super::service::{AuthError, AuthService};
use crate::error::ApiErrorResponse;
use crate::metrics::record_auth_rejection;

/// 인증된 요청 신원 추출기.
///
/// 검증에 성공하면 핸들러는 `AuthenticatedIdentity`를 명시적인
/// 인자로 받습니다. 신원은 전역 상태에 저장되지 않습니다.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(
///     AuthIdentity(identity): AuthIdentity,
/// ) -> impl IntoResponse {
///     format!("Authenticated user: {}", identity.subject)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthIdentity(pub AuthenticatedIdentity);

/// 인증 거부 사유.
///
/// 내부적으로는 종류를 구분하지만(관측용), 클라이언트 응답은 단일
/// 401 형태로 합쳐집니다 — 검증 알고리즘에 대한 오라클 공격 방지.
#[derive(Debug, thiserror::Error)]
pub enum AuthRejection {
    /// Authorization 헤더 부재
    #[error("인증 토큰이 없습니다")]
    MissingToken,

    /// Bearer 형식이 아닌 Authorization 헤더
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,

    /// 토큰/신원 검증 실패
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// 인증 서비스 미구성 (라우터 조립 오류)
    #[error("인증 서비스가 구성되지 않았습니다")]
    NotConfigured,
}

impl AuthRejection {
    /// 메트릭 라벨용 종류 문자열.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthRejection::MissingToken => "missing_token",
            AuthRejection::InvalidAuthHeader => "invalid_auth_header",
            AuthRejection::Auth(e) => e.kind(),
            AuthRejection::NotConfigured => "not_configured",
        }
    }

    fn is_server_error(&self) -> bool {
        match self {
            AuthRejection::NotConfigured => true,
            AuthRejection::Auth(e) => e.is_server_error(),
            _ => false,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let kind = self.kind();
        record_auth_rejection(kind);

        if self.is_server_error() {
            tracing::error!(kind, error = %self, "인증 처리 중 서버 오류");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiErrorResponse::new(
                    "INTERNAL_ERROR",
                    "내부 오류가 발생했습니다",
                )),
            )
                .into_response();
        }

        // 거부 사유는 로그와 메트릭으로만 구분한다. 응답 본문은
        // 사유와 무관하게 동일해야 한다.
        tracing::warn!(kind, "인증되지 않은 요청 거부");
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiErrorResponse::new("UNAUTHORIZED", "인증이 필요합니다")),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<AuthService>()
            .cloned()
            .ok_or(AuthRejection::NotConfigured)?;

        // Authorization 헤더에서 Bearer 토큰 추출
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthRejection::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthRejection::InvalidAuthHeader)?;

        // 시각은 요청당 한 번만 읽는다
        let now = Utc::now();

        let identity = service.authenticate(token, now).await?;
        Ok(AuthIdentity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Extension, Router};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::auth::jwt::TokenCodec;
    use crate::auth::store::InMemoryUserStore;
    use product_core::config::BootstrapUser;

    const TEST_SECRET: &str = "test-secret-key-for-middleware-testing-32ch!";

    fn test_service() -> AuthService {
        let store = InMemoryUserStore::from_bootstrap(&[BootstrapUser::default()]).unwrap();
        let codec = TokenCodec::new(&SecretString::new(TEST_SECRET.into()), 60);
        AuthService::new(Arc::new(store), Arc::new(codec))
    }

    async fn protected(AuthIdentity(identity): AuthIdentity) -> String {
        identity.subject
    }

    fn test_router(service: AuthService) -> Router {
        Router::new()
            .route("/protected", get(protected))
            .layer(Extension(service))
    }

    async fn request_with_header(router: Router, header: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token_passes() {
        let service = test_service();
        let token = service
            .login("testuser", "Test123", Utc::now())
            .await
            .unwrap();

        let (status, body) =
            request_with_header(test_router(service), Some(&format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "testuser");
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let (status, _) = request_with_header(test_router(test_service()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_header_rejected() {
        let (status, _) =
            request_with_header(test_router(test_service()), Some("Basic dXNlcjpwdw==")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let (status, _) =
            request_with_header(test_router(test_service()), Some("Bearer not.a.token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejection_body_is_uniform() {
        // 거부 사유가 달라도 상태 코드와 본문이 같아야 함
        let service = test_service();
        let token = service
            .login("testuser", "Test123", Utc::now())
            .await
            .unwrap();
        let mut tampered = token.clone();
        tampered.push('x');

        let cases: Vec<Option<String>> = vec![
            None,
            Some("Basic abc".to_string()),
            Some("Bearer garbage".to_string()),
            Some(format!("Bearer {}", tampered)),
        ];

        let mut bodies = Vec::new();
        for case in &cases {
            let (status, body) =
                request_with_header(test_router(service.clone()), case.as_deref()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            bodies.push(body);
        }

        for body in &bodies[1..] {
            assert_eq!(body, &bodies[0]);
        }
    }

    #[tokio::test]
    async fn test_missing_extension_is_server_error() {
        let router: Router = Router::new().route("/protected", get(protected));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
