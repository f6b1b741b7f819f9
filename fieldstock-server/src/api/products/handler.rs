//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::permission::{Action, Module};

use crate::auth::CurrentAdmin;
use crate::auth::guard::authorize;
use crate::core::ServerState;
use crate::db::repository::{RepoError, duplicate_as, product};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// NotFound → ProductNotFound, Duplicate → ProductSkuExists
fn product_error(err: RepoError, id: i64) -> AppError {
    match err {
        RepoError::NotFound(_) => AppError::new(ErrorCode::ProductNotFound).with_detail("id", id),
        other => duplicate_as(other, ErrorCode::ProductSkuExists),
    }
}

fn validate_stock(value: Option<i64>) -> AppResult<()> {
    if let Some(quantity) = value
        && quantity < 0
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "stock_quantity must not be negative",
        )
        .with_detail("field", "stock_quantity"));
    }
    Ok(())
}

/// GET /api/products - 获取所有商品
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentAdmin,
) -> AppResult<Json<Vec<Product>>> {
    authorize(&current.principal, Module::Products, Action::Read)?;
    let products = product::find_all(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    authorize(&current.principal, Module::Products, Action::Read)?;
    let product = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("id", id))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    authorize(&current.principal, Module::Products, Action::Create)?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    payload.price.validate()?;
    validate_stock(payload.stock_quantity)?;

    let product = product::create(&state.pool, payload)
        .await
        .map_err(|e| duplicate_as(e, ErrorCode::ProductSkuExists))?;

    tracing::info!(product_id = product.id, sku = %product.sku, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    authorize(&current.principal, Module::Products, Action::Update)?;

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(sku) = &payload.sku {
        validate_required_text(sku, "sku", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(image_url) = &payload.image_url {
        validate_optional_text(image_url, "image_url", MAX_URL_LEN)?;
    }
    if let Some(price) = &payload.price {
        price.validate()?;
    }
    validate_stock(payload.stock_quantity)?;

    let (before, after) = product::update(&state.pool, id, payload)
        .await
        .map_err(|e| product_error(e, id))?;

    // 图片被替换或移除时清理旧文件
    if let Some(old) = before.image_url
        && after.image_url.as_deref() != Some(old.as_str())
    {
        state.file_store.spawn_delete(old);
    }

    tracing::info!(product_id = id, "Product updated");
    Ok(Json(after))
}

/// POST /api/products/:id/toggle-status
pub async fn toggle_status(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    authorize(&current.principal, Module::Products, Action::ToggleStatus)?;
    let is_active = product::toggle_status(&state.pool, id)
        .await
        .map_err(|e| product_error(e, id))?;

    tracing::info!(product_id = id, is_active, "Product status toggled");
    Ok(Json(json!({ "id": id, "is_active": is_active })))
}

/// DELETE /api/products/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    authorize(&current.principal, Module::Products, Action::Delete)?;

    let Some(removed) = product::delete(&state.pool, id).await? else {
        return Ok(Json(false));
    };
    if let Some(url) = removed.image_url {
        state.file_store.spawn_delete(url);
    }

    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(true))
}
