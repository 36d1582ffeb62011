//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//!
//! 내부 에러 종류는 로그와 메트릭으로만 관찰하고, 클라이언트에는
//! 상태 코드와 기계가 읽을 수 있는 코드만 노출합니다. 서버 측
//! 장애(5xx)의 상세 메시지는 응답 본문에 싣지 않습니다.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use product_core::CoreError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "상품을 찾을 수 없습니다: 42"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "NOT_FOUND", "VALIDATION_ERROR", "UNAUTHORIZED")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 도메인 에러를 HTTP 응답으로 변환합니다.
///
/// 클라이언트 잘못(검증 실패, 미존재)은 메시지를 그대로 전달하고,
/// 서버 측 장애(데이터베이스, 내부 에러)는 상세를 숨깁니다.
pub fn core_error_response(err: CoreError) -> (StatusCode, Json<ApiErrorResponse>) {
    match &err {
        CoreError::Validation(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiErrorResponse::new("VALIDATION_ERROR", msg)),
        ),
        CoreError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiErrorResponse::new("NOT_FOUND", msg)),
        ),
        CoreError::Auth(_) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiErrorResponse::new("UNAUTHORIZED", "인증이 필요합니다")),
        ),
        CoreError::Database(_) | CoreError::Internal(_) | CoreError::Config(_) => {
            tracing::error!(error = %err, "internal server error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiErrorResponse::new(
                    "INTERNAL_ERROR",
                    "내부 오류가 발생했습니다",
                )),
            )
        }
    }
}
