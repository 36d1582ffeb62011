//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 문서 엔드포인트는 로그인과 마찬가지로 공개 허용 목록에 속합니다.
//!
//! # 자동 생성 구조
//!
//! 각 라우트 모듈은 자체 스키마를 정의하고, 중앙 `ApiDoc`에서
//! 집계합니다. 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, HealthResponse, LoginRequest, LoginResponse,
    ProductPageResponse,
};
use product_core::{NewProduct, Product, ProductUpdate};

// ==================== OpenAPI 문서 정의 ====================

/// Product Management API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Management API",
        version = "0.1.0",
        description = r#"
# 상품 관리 REST API

로그인(JWT 발급)과 상품 CRUD를 제공하는 REST API입니다.

## 인증

`/api/auth/login`과 문서/헬스 엔드포인트를 제외한 모든 엔드포인트는
JWT Bearer 토큰 인증이 필요합니다.
`Authorization: Bearer <token>` 헤더를 포함하세요.

토큰은 상태 비저장입니다 — 서버는 세션을 보관하지 않으며, 유효성은
서명과 만료 시각만으로 결정됩니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(
            name = "Product Management Team",
            url = "https://github.com/user/product-management"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "auth", description = "인증 - 로그인 및 토큰 발급"),
        (name = "products", description = "상품 관리 - CRUD 및 페이지네이션"),
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
    ),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Common =====
            ApiErrorResponse,

            // ===== Auth =====
            LoginRequest,
            LoginResponse,

            // ===== Products =====
            Product,
            NewProduct,
            ProductUpdate,
            ProductPageResponse,

            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        // ===== Auth =====
        crate::routes::auth::login,

        // ===== Products =====
        crate::routes::products::list_products,
        crate::routes::products::create_product,
        crate::routes::products::get_product,
        crate::routes::products::update_product,
        crate::routes::products::delete_product,

        // ===== Health =====
        crate::routes::health::liveness,
        crate::routes::health::readiness,
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Bearer 보안 스킴 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

// ==================== 테스트 ====================
