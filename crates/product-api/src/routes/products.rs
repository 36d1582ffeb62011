//! 상품 API 라우트.
//!
//! 상품 CRUD 및 페이지네이션 API를 제공합니다. 모든 핸들러는
//! `AuthIdentity` 추출기를 선언하므로, 유효한 Bearer 토큰 없는
//! 요청은 비즈니스 로직에 도달하기 전에 거부됩니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/products` - 페이지네이션 목록 조회
//! - `POST /api/products` - 상품 생성
//! - `GET /api/products/{id}` - 상품 상세 조회
//! - `PUT /api/products/{id}` - 상품 수정
//! - `DELETE /api/products/{id}` - 상품 삭제

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use product_core::{NewProduct, PageRequest, Product, ProductSort, ProductUpdate};

use crate::auth::AuthIdentity;
use crate::error::{core_error_response, ApiErrorResponse, ApiResult};
use crate::repository::RepositoryError;
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 페이지네이션 쿼리 파라미터.
///
/// 예: `GET /api/products?page=0&size=10&sort=name,asc`
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 페이지 번호 (0부터 시작, 기본값 0)
    pub page: Option<u32>,
    /// 페이지당 항목 수 (기본값과 상한은 검증 정책이 결정)
    pub size: Option<u32>,
    /// 정렬 지정 (`field,dir` 형식, 예: `name,asc`)
    pub sort: Option<String>,
}

/// 상품 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageResponse {
    /// 현재 페이지 항목
    pub items: Vec<Product>,
    /// 전체 항목 수
    pub total_count: i64,
    /// 현재 페이지 번호
    pub page: u32,
    /// 페이지당 항목 수
    pub page_size: u32,
    /// 전체 페이지 수
    pub total_pages: u32,
}

/// 상품 라우터 생성.
pub fn products_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// 저장소 에러를 응답으로 변환합니다. 내부 상세는 숨깁니다.
fn repository_error(err: RepositoryError) -> (StatusCode, Json<ApiErrorResponse>) {
    tracing::error!(error = %err, "상품 저장소 에러");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new(
            "INTERNAL_ERROR",
            "내부 오류가 발생했습니다",
        )),
    )
}

fn not_found(id: i64) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiErrorResponse::new(
            "NOT_FOUND",
            format!("상품을 찾을 수 없습니다: {}", id),
        )),
    )
}

// ================================================================================================
// Handlers
// ================================================================================================

/// GET /api/products - 상품 목록 조회 (페이지네이션).
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(PageQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "상품 목록", body = ProductPageResponse),
        (status = 401, description = "인증 필요", body = ApiErrorResponse),
    )
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<ProductPageResponse>> {
    let page = query.page.unwrap_or(0);
    let size = state.config.validation.clamp_page_size(query.size);
    let sort = query
        .sort
        .as_deref()
        .map(ProductSort::parse)
        .unwrap_or_default();

    debug!(subject = %identity.subject, page, size, "상품 목록 조회");

    let request = PageRequest { page, size, sort };
    let result = state
        .products
        .list(request)
        .await
        .map_err(repository_error)?;

    let total_pages = if result.total_count == 0 {
        0
    } else {
        ((result.total_count as u64).div_ceil(u64::from(size))) as u32
    };

    Ok(Json(ProductPageResponse {
        items: result.items,
        total_count: result.total_count,
        page,
        page_size: size,
        total_pages,
    }))
}

/// POST /api/products - 상품 생성.
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    request_body = NewProduct,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "생성된 상품", body = Product),
        (status = 401, description = "인증 필요", body = ApiErrorResponse),
        (status = 422, description = "입력 검증 실패", body = ApiErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Json(input): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    state
        .config
        .validation
        .check_product(&input.name, input.stock)
        .map_err(core_error_response)?;

    let product = state
        .products
        .create(input)
        .await
        .map_err(repository_error)?;

    info!(subject = %identity.subject, id = product.id, "상품 생성");
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products/{id} - 상품 상세 조회.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "상품 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "상품", body = Product),
        (status = 401, description = "인증 필요", body = ApiErrorResponse),
        (status = 404, description = "상품 없음", body = ApiErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    debug!(subject = %identity.subject, id, "상품 상세 조회");

    state
        .products
        .get(id)
        .await
        .map_err(repository_error)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /api/products/{id} - 상품 수정.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "상품 ID")),
    request_body = ProductUpdate,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "수정된 상품", body = Product),
        (status = 401, description = "인증 필요", body = ApiErrorResponse),
        (status = 404, description = "상품 없음", body = ApiErrorResponse),
        (status = 422, description = "입력 검증 실패", body = ApiErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Path(id): Path<i64>,
    Json(update): Json<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    state
        .config
        .validation
        .check_product(&update.name, update.stock)
        .map_err(core_error_response)?;

    let updated = state
        .products
        .update(id, update)
        .await
        .map_err(repository_error)?
        .ok_or_else(|| not_found(id))?;

    info!(subject = %identity.subject, id, "상품 수정");
    Ok(Json(updated))
}

/// DELETE /api/products/{id} - 상품 삭제.
///
/// 대상이 없어도 204를 반환합니다 (멱등).
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "상품 ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "삭제 완료"),
        (status = 401, description = "인증 필요", body = ApiErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    AuthIdentity(identity): AuthIdentity,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let removed = state
        .products
        .delete(id)
        .await
        .map_err(repository_error)?;

    if removed {
        info!(subject = %identity.subject, id, "상품 삭제");
    } else {
        debug!(subject = %identity.subject, id, "삭제 대상 없음");
    }

    Ok(StatusCode::NO_CONTENT)
}
