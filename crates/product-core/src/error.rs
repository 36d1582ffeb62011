//! 상품 관리 서비스의 에러 타입.
//!
//! 이 모듈은 서비스 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 입력 검증 실패
    #[error("잘못된 입력: {0}")]
    Validation(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 인증 에러
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 도메인 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 클라이언트 잘못으로 발생한 에러인지 확인합니다.
    ///
    /// 서버 측 장애(데이터베이스, 내부 에러)와 구분하여
    /// HTTP 상태 코드 매핑에 사용됩니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_) | CoreError::NotFound(_) | CoreError::Auth(_)
        )
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::Validation("name은 비어 있을 수 없습니다".to_string());
        assert!(err.to_string().contains("잘못된 입력"));
    }

    #[test]
    fn test_is_client_error() {
        assert!(CoreError::Validation("x".into()).is_client_error());
        assert!(CoreError::NotFound("x".into()).is_client_error());
        assert!(CoreError::Auth("x".into()).is_client_error());
        assert!(!CoreError::Database("x".into()).is_client_error());
        assert!(!CoreError::Internal("x".into()).is_client_error());
        assert!(!CoreError::Config("x".into()).is_client_error());
    }
}
