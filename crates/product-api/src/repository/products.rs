//! 상품 저장소.
//!
//! 상품 관련 데이터 연산을 담당합니다. 인메모리 구현과 PostgreSQL
//! 구현을 제공하며, 핸들러는 `ProductStore` 트레이트만 봅니다.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;

use product_core::{
    NewProduct, PageRequest, Product, ProductPage, ProductUpdate, SortDirection, SortField,
};

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// 데이터베이스 에러
    #[error("상품 저장소 데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),

    /// 내부 상태 손상 (잠금 오염 등)
    #[error("상품 저장소 내부 에러: {0}")]
    Internal(String),
}

/// 상품 저장소 인터페이스.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 상품 생성. id와 created_at은 저장소가 부여합니다.
    async fn create(&self, input: NewProduct) -> Result<Product, RepositoryError>;

    /// id로 상품 조회.
    async fn get(&self, id: i64) -> Result<Option<Product>, RepositoryError>;

    /// 상품 전체 필드 수정. `created_at`은 변경되지 않습니다.
    /// 대상이 없으면 `None`.
    async fn update(&self, id: i64, update: ProductUpdate)
        -> Result<Option<Product>, RepositoryError>;

    /// 상품 삭제. 대상이 있었으면 `true`.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;

    /// 오프셋 기반 페이지 조회 + 전체 개수.
    async fn list(&self, page: PageRequest) -> Result<ProductPage, RepositoryError>;
}

// ================================================================================================
// 인메모리 구현
// ================================================================================================

/// 인메모리 상품 저장소.
///
/// 데이터베이스가 구성되지 않은 배포와 테스트에서 사용됩니다.
/// 잠금은 맵 연산 동안만 유지되며 await 지점을 걸치지 않습니다.
pub struct MemoryProductStore {
    items: RwLock<BTreeMap<i64, Product>>,
    next_id: AtomicI64,
}

impl MemoryProductStore {
    /// 빈 저장소를 만듭니다. id는 1부터 단조 증가합니다.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 정렬 필드 비교. 같은 값이면 id로 2차 정렬해 순서를 안정화합니다.
fn compare(a: &Product, b: &Product, field: SortField) -> CmpOrdering {
    let primary = match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Price => a.price.cmp(&b.price),
        SortField::Stock => a.stock.cmp(&b.stock),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    primary.then(a.id.cmp(&b.id))
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create(&self, input: NewProduct) -> Result<Product, RepositoryError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let product = Product {
            id,
            name: input.name,
            price: input.price,
            stock: input.stock,
            created_at: Utc::now(),
        };

        let mut items = self
            .items
            .write()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;
        items.insert(id, product.clone());

        debug!(id, "상품 생성");
        Ok(product)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let items = self
            .items
            .read()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;
        Ok(items.get(&id).cloned())
    }

    async fn update(
        &self,
        id: i64,
        update: ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;

        let Some(product) = items.get_mut(&id) else {
            return Ok(None);
        };

        product.name = update.name;
        product.price = update.price;
        product.stock = update.stock;
        // created_at은 생성 시 한 번만 설정된다

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;
        Ok(items.remove(&id).is_some())
    }

    async fn list(&self, page: PageRequest) -> Result<ProductPage, RepositoryError> {
        let items = self
            .items
            .read()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;

        let total_count = items.len() as i64;

        let mut sorted: Vec<Product> = items.values().cloned().collect();
        sorted.sort_by(|a, b| {
            let ord = compare(a, b, page.sort.field);
            match page.sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(0);
        let items = sorted.into_iter().skip(offset).take(limit).collect();

        Ok(ProductPage { items, total_count })
    }
}

// ================================================================================================
// PostgreSQL 구현
// ================================================================================================

/// PostgreSQL 기반 상품 저장소.
///
/// 스키마:
///
/// ```sql
/// CREATE TABLE products (
///     id         BIGSERIAL PRIMARY KEY,
///     name       TEXT NOT NULL,
///     price      NUMERIC NOT NULL,
///     stock      INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// 커넥션 풀로 저장소를 만듭니다.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn create(&self, input: NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, stock)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, stock, created_at
            "#,
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = product.id, "상품 생성");
        Ok(product)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, stock, created_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn update(
        &self,
        id: i64,
        update: ProductUpdate,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, price = $3, stock = $4
            WHERE id = $1
            RETURNING id, name, price, stock, created_at
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.price)
        .bind(update.stock)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, page: PageRequest) -> Result<ProductPage, RepositoryError> {
        // 전체 개수 조회
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        // 정렬 컬럼/방향은 화이트리스트 상수에서만 나오므로 문자열
        // 조립이 안전하다 (SortField::as_column 참고).
        let query = format!(
            "SELECT id, name, price, stock, created_at FROM products ORDER BY {} {} LIMIT $1 OFFSET $2",
            page.sort.field.as_column(),
            page.sort.direction.as_sql(),
        );

        let items = sqlx::query_as::<_, Product>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(ProductPage {
            items,
            total_count: count.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use product_core::ProductSort;
    use rust_decimal::Decimal;

    fn new_product(name: &str, price: i64, stock: i32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Decimal::new(price, 0),
            stock,
        }
    }

    fn page(page: u32, size: u32, sort: &str) -> PageRequest {
        PageRequest {
            page,
            size,
            sort: ProductSort::parse(sort),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_monotonic_ids_from_one() {
        let store = MemoryProductStore::new();

        let first = store.create(new_product("노트북", 1500, 5)).await.unwrap();
        let second = store.create(new_product("마우스", 25, 100)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = MemoryProductStore::new();
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let store = MemoryProductStore::new();
        let created = store.create(new_product("노트북", 1500, 5)).await.unwrap();

        let updated = store
            .update(
                created.id,
                ProductUpdate {
                    name: "게이밍 노트북".to_string(),
                    price: Decimal::new(2000, 0),
                    stock: 3,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "게이밍 노트북");
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let store = MemoryProductStore::new();
        let result = store
            .update(
                42,
                ProductUpdate {
                    name: "x".to_string(),
                    price: Decimal::ZERO,
                    stock: 0,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryProductStore::new();
        let created = store.create(new_product("노트북", 1500, 5)).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = MemoryProductStore::new();
        for i in 0..5 {
            store
                .create(new_product(&format!("상품{}", i), 100 + i, 10))
                .await
                .unwrap();
        }

        let first = store.list(page(0, 2, "id,asc")).await.unwrap();
        assert_eq!(first.total_count, 5);
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].id, 1);

        let last = store.list(page(2, 2, "id,asc")).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].id, 5);

        // 범위를 벗어난 페이지는 빈 목록이지만 total은 유지
        let beyond = store.list(page(10, 2, "id,asc")).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_count, 5);
    }

    #[tokio::test]
    async fn test_list_sort_by_name_desc() {
        let store = MemoryProductStore::new();
        for name in ["b", "a", "c"] {
            store.create(new_product(name, 100, 1)).await.unwrap();
        }

        let result = store.list(page(0, 10, "name,desc")).await.unwrap();
        let names: Vec<&str> = result.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_list_sort_by_price() {
        let store = MemoryProductStore::new();
        store.create(new_product("비싼것", 300, 1)).await.unwrap();
        store.create(new_product("싼것", 100, 1)).await.unwrap();
        store.create(new_product("중간", 200, 1)).await.unwrap();

        let result = store.list(page(0, 10, "price,asc")).await.unwrap();
        let prices: Vec<i64> = result
            .items
            .iter()
            .map(|p| p.price.mantissa() as i64)
            .collect();
        assert_eq!(prices, vec![100, 200, 300]);
    }
}
