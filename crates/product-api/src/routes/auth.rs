//! 인증 API 라우트.
//!
//! 로그인 엔드포인트를 제공합니다. 이 라우터는 공개 허용 목록에
//! 속하므로 `AuthIdentity` 추출기를 선언하지 않습니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/auth/login` - 자격증명 검증 후 Bearer 토큰 발급

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{core_error_response, ApiErrorResponse, ApiResult};
use crate::metrics::record_login_attempt;
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// 사용자 이름
    #[validate(length(min = 1, message = "username은 비어 있을 수 없습니다"))]
    pub username: String,
    /// 비밀번호
    #[validate(length(min = 1, message = "password는 비어 있을 수 없습니다"))]
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// 발급된 Access Token
    pub access_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

/// POST /api/auth/login - 로그인 및 토큰 발급.
///
/// 실패 응답은 원인(사용자 부재/비밀번호 불일치)과 무관하게
/// 동일합니다.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "로그인 성공", body = LoginResponse),
        (status = 401, description = "자격증명 불일치", body = ApiErrorResponse),
        (status = 422, description = "요청 형식 오류", body = ApiErrorResponse),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    debug!(username = %request.username, "로그인 요청");

    // 요청 형식 검증 (비어 있는 필드)
    if let Err(e) = request.validate() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiErrorResponse::with_details(
                "VALIDATION_ERROR",
                "요청 형식이 올바르지 않습니다",
                serde_json::json!(e),
            )),
        ));
    }

    // 배포 설정으로 주입되는 검증 정책 (길이 임계값 등)
    state
        .config
        .validation
        .check_credentials(&request.username, &request.password)
        .map_err(core_error_response)?;

    let now = Utc::now();
    match state
        .auth
        .login(&request.username, &request.password, now)
        .await
    {
        Ok(token) => {
            record_login_attempt("success");
            Ok(Json(LoginResponse {
                access_token: token,
                token_type: "Bearer".to_string(),
            }))
        }
        Err(e) if e.is_server_error() => {
            record_login_attempt("error");
            tracing::error!(error = %e, "로그인 처리 중 서버 오류");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiErrorResponse::new(
                    "INTERNAL_ERROR",
                    "내부 오류가 발생했습니다",
                )),
            ))
        }
        Err(_) => {
            record_login_attempt("failure");
            // 사용자 부재/비밀번호 불일치 구분 없이 동일한 응답
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ApiErrorResponse::new(
                    "UNAUTHORIZED",
                    "아이디 또는 비밀번호가 올바르지 않습니다",
                )),
            ))
        }
    }
}
