//! Product Repository
//!
//! `stock_quantity` 在创建/手工修正时写入；审批、分配、回收走 [`crate::ledger`]。

use super::{RepoError, RepoResult};
use shared::models::{Price, Product, ProductCreate, ProductUpdate};
use sqlx::SqlitePool;

const PRODUCT_COLUMNS: &str = "id, name, sku, image_url, base_price, lowest_selling_price, stock_quantity, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    sku: String,
    image_url: Option<String>,
    base_price: i64,
    lowest_selling_price: i64,
    stock_quantity: i64,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            sku: row.sku,
            image_url: row.image_url,
            price: Price {
                base: row.base_price,
                lowest_selling_price: row.lowest_selling_price,
            },
            stock_quantity: row.stock_quantity,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO product (name, sku, image_url, base_price, lowest_selling_price, stock_quantity, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7) RETURNING id",
    )
    .bind(data.name)
    .bind(data.sku)
    .bind(data.image_url)
    .bind(data.price.base)
    .bind(data.price.lowest_selling_price)
    .bind(data.stock_quantity.unwrap_or(0))
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// Update; returns the product before and after (caller cleans up a replaced image)
///
/// 先用一条写语句认领行并取回旧值，保证 `before` 与本次覆盖的值一致，
/// 并发更新不会把对方的新图片当作旧图片。
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: ProductUpdate,
) -> RepoResult<(Product, Product)> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let before = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE product SET updated_at = ?1 WHERE id = ?2 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;

    let after = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE product SET name = COALESCE(?1, name), sku = COALESCE(?2, sku), \
         image_url = CASE WHEN ?3 THEN ?4 ELSE image_url END, \
         base_price = COALESCE(?5, base_price), lowest_selling_price = COALESCE(?6, lowest_selling_price), \
         stock_quantity = COALESCE(?7, stock_quantity) WHERE id = ?8 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(data.name)
    .bind(data.sku)
    .bind(data.image_url.is_some())
    .bind(data.image_url.flatten())
    .bind(data.price.map(|p| p.base))
    .bind(data.price.map(|p| p.lowest_selling_price))
    .bind(data.stock_quantity)
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((before.into(), after.into()))
}

/// Flip `is_active`, returning the new value
pub async fn toggle_status(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let active: Option<bool> = sqlx::query_scalar(
        "UPDATE product SET is_active = NOT is_active, updated_at = ?1 WHERE id = ?2 RETURNING is_active",
    )
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    active.ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Hard delete, returning the removed product (for image cleanup).
/// Refused while any employee still holds an allocation of it, or while
/// request or sale history references it (deactivate instead).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let Some(existing) = find_by_id(pool, id).await? else {
        return Ok(None);
    };

    let rows = sqlx::query(
        "DELETE FROM product WHERE id = ?1 \
         AND NOT EXISTS (SELECT 1 FROM employee_product WHERE product_id = ?1) \
         AND NOT EXISTS (SELECT 1 FROM stock_request WHERE product_id = ?1) \
         AND NOT EXISTS (SELECT 1 FROM sale_item WHERE product_id = ?1)",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() > 0 {
        return Ok(Some(existing));
    }
    let allocated: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM employee_product WHERE product_id = ?)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if allocated {
        return Err(RepoError::Validation(
            "Product is still assigned to employees".into(),
        ));
    }
    Err(RepoError::Validation(
        "Product has request or sale history; deactivate instead".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::memory_pool;
    use crate::db::repository::{employee, stock_request};

    fn soap() -> ProductCreate {
        ProductCreate {
            name: "Soap".into(),
            sku: "SOAP-1".into(),
            image_url: Some("/uploads/soap.png".into()),
            price: Price {
                base: 500,
                lowest_selling_price: 400,
            },
            stock_quantity: Some(10),
        }
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let pool = memory_pool().await;
        let product = create(&pool, soap()).await.unwrap();
        assert_eq!(product.stock_quantity, 10);
        assert!(product.is_active);

        let (before, after) = update(
            &pool,
            product.id,
            ProductUpdate {
                image_url: Some(Some("/uploads/soap-v2.png".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(before.image_url.as_deref(), Some("/uploads/soap.png"));
        assert_eq!(after.image_url.as_deref(), Some("/uploads/soap-v2.png"));
        assert_eq!(after.price, before.price);
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let pool = memory_pool().await;
        let product = create(&pool, soap()).await.unwrap();
        let err = update(
            &pool,
            product.id,
            ProductUpdate {
                stock_quantity: Some(-1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_sku() {
        let pool = memory_pool().await;
        create(&pool, soap()).await.unwrap();
        assert!(matches!(
            create(&pool, soap()).await,
            Err(RepoError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_product() {
        let pool = memory_pool().await;
        let product = create(&pool, soap()).await.unwrap();
        let removed = delete(&pool, product.id).await.unwrap().unwrap();
        assert_eq!(removed.sku, "SOAP-1");
        assert!(delete(&pool, product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_clears_image_and_keeps_unset_fields() {
        let pool = memory_pool().await;
        let product = create(&pool, soap()).await.unwrap();

        let (before, after) = update(
            &pool,
            product.id,
            ProductUpdate {
                image_url: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(before.image_url.as_deref(), Some("/uploads/soap.png"));
        assert_eq!(after.image_url, None);
        assert_eq!(after.name, "Soap");

        // 未提供 image_url 时保持不变
        let (_, after) = update(
            &pool,
            product.id,
            ProductUpdate {
                name: Some("Soap XL".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(after.image_url, None);
        assert_eq!(after.name, "Soap XL");
    }

    #[tokio::test]
    async fn test_sequential_updates_see_previous_image() {
        let pool = memory_pool().await;
        let product = create(&pool, soap()).await.unwrap();
        for (old, new) in [
            ("/uploads/soap.png", "/uploads/a.png"),
            ("/uploads/a.png", "/uploads/b.png"),
        ] {
            let (before, after) = update(
                &pool,
                product.id,
                ProductUpdate {
                    image_url: Some(Some(new.into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            assert_eq!(before.image_url.as_deref(), Some(old));
            assert_eq!(after.image_url.as_deref(), Some(new));
        }
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let pool = memory_pool().await;
        assert!(matches!(
            update(&pool, 404, ProductUpdate::default()).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_refused_while_request_history_exists() {
        let pool = memory_pool().await;
        let product = create(&pool, soap()).await.unwrap();
        let emp = employee::create(&pool, "Ravi", "+15550001", "hash").await.unwrap();
        let request = stock_request::create(&pool, emp.id, product.id, 2, "restock")
            .await
            .unwrap();

        let err = delete(&pool, product.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(msg) if msg.contains("history")));
        assert!(stock_request::find_by_id(&pool, request.id).await.unwrap().is_some());
        assert!(find_by_id(&pool, product.id).await.unwrap().is_some());
    }
}
