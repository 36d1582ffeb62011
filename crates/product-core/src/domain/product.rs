//! 상품 엔티티 및 페이지네이션 타입.
//!
//! 이 모듈은 상품 관리의 핵심 타입을 정의합니다:
//! - `Product` - 상품 엔티티
//! - `NewProduct` / `ProductUpdate` - 생성/수정 입력
//! - `PageRequest` / `ProductPage` - 오프셋 기반 페이지네이션
//! - `ProductSort` - 정렬 지정 (`field,dir` 형식)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 상품 엔티티.
///
/// `id`는 생성 시 부여되며 고유합니다. `created_at`은 생성 시 한 번
/// 설정되고 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Product {
    /// 상품 ID (1 이상, 생성 순서대로 부여)
    pub id: i64,
    /// 상품명
    pub name: String,
    /// 가격
    #[serde(with = "rust_decimal::serde::float")]
    #[cfg_attr(feature = "utoipa-support", schema(value_type = f64))]
    pub price: Decimal,
    /// 재고 수량 (0 이상)
    pub stock: i32,
    /// 생성 시각 (생성 후 불변)
    pub created_at: DateTime<Utc>,
}

/// 새 상품 입력.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct NewProduct {
    /// 상품명
    pub name: String,
    /// 가격
    #[serde(with = "rust_decimal::serde::float")]
    #[cfg_attr(feature = "utoipa-support", schema(value_type = f64))]
    pub price: Decimal,
    /// 재고 수량
    pub stock: i32,
}

/// 상품 수정 입력.
///
/// 전체 필드를 교체합니다. `created_at`은 수정 대상이 아닙니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct ProductUpdate {
    /// 상품명
    pub name: String,
    /// 가격
    #[serde(with = "rust_decimal::serde::float")]
    #[cfg_attr(feature = "utoipa-support", schema(value_type = f64))]
    pub price: Decimal,
    /// 재고 수량
    pub stock: i32,
}

/// 정렬 대상 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// 상품 ID
    #[default]
    Id,
    /// 상품명
    Name,
    /// 가격
    Price,
    /// 재고
    Stock,
    /// 생성 시각
    CreatedAt,
}

impl SortField {
    /// SQL ORDER BY에 사용할 컬럼명을 반환합니다.
    ///
    /// 화이트리스트 기반이므로 사용자 입력이 SQL에 직접 삽입되지 않습니다.
    pub fn as_column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Stock => "stock",
            SortField::CreatedAt => "created_at",
        }
    }

    /// 문자열에서 정렬 필드 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "id" => Some(SortField::Id),
            "name" => Some(SortField::Name),
            "price" => Some(SortField::Price),
            "stock" => Some(SortField::Stock),
            "created_at" | "createdat" => Some(SortField::CreatedAt),
            _ => None,
        }
    }
}

/// 정렬 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// 오름차순
    #[default]
    Asc,
    /// 내림차순
    Desc,
}

impl SortDirection {
    /// SQL ORDER BY에 사용할 키워드를 반환합니다.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 정렬 지정.
///
/// `"name,asc"` 형식의 쿼리 파라미터에서 파싱됩니다.
/// 방향이 생략되면 오름차순, 알 수 없는 필드면 기본값(`id,asc`)으로
/// 조용히 대체됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductSort {
    /// 정렬 필드
    pub field: SortField,
    /// 정렬 방향
    pub direction: SortDirection,
}

impl ProductSort {
    /// `"field,dir"` 형식 문자열에서 파싱합니다.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.splitn(2, ',');
        let field = parts.next().and_then(SortField::parse);
        let direction = match parts.next().map(|d| d.trim().to_lowercase()) {
            Some(d) if d == "desc" => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        match field {
            Some(field) => Self { field, direction },
            None => Self::default(),
        }
    }
}

/// 페이지 요청.
///
/// `page`는 0부터 시작합니다 (기존 API와 동일).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 페이지 번호 (0부터 시작)
    pub page: u32,
    /// 페이지당 항목 수
    pub size: u32,
    /// 정렬 지정
    pub sort: ProductSort,
}

impl PageRequest {
    /// SQL OFFSET 값을 반환합니다.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// SQL LIMIT 값을 반환합니다.
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// 페이지 조회 결과.
#[derive(Debug, Clone)]
pub struct ProductPage {
    /// 현재 페이지 항목
    pub items: Vec<Product>,
    /// 전체 항목 수 (페이지와 무관)
    pub total_count: i64,
}
