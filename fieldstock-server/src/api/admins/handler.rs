//! Admin API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Admin, AdminCreate, AdminUpdate};
use shared::permission::{Action, AdminRole, Module, default_permissions};

use crate::auth::CurrentAdmin;
use crate::auth::guard::{
    authorize, authorize_admin_create, authorize_admin_delete, authorize_admin_read,
    authorize_admin_update,
};
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::admin::{self, AdminChanges, NewAdmin};
use crate::db::repository::duplicate_as;
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_email, validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

async fn load(state: &ServerState, id: i64) -> AppResult<Admin> {
    admin::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AdminNotFound).with_detail("id", id))
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))
}

/// GET /api/admins
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentAdmin,
) -> AppResult<Json<Vec<Admin>>> {
    authorize(&current.principal, Module::Admins, Action::Read)?;
    let admins = admin::find_all(&state.pool).await?;
    Ok(Json(admins))
}

/// GET /api/admins/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<Admin>> {
    authorize_admin_read(&current.principal, id)?;
    Ok(Json(load(&state, id).await?))
}

/// POST /api/admins - 创建 sub-admin
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Json(payload): Json<AdminCreate>,
) -> AppResult<Json<Admin>> {
    authorize_admin_create(&current.principal)?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    let email = payload.email.trim().to_lowercase();
    validate_email(&email)?;
    validate_password(&payload.password)?;

    let permissions = payload
        .permission_set()?
        .unwrap_or_else(|| default_permissions(AdminRole::SubAdmin));
    let password_hash = hash(&payload.password)?;

    let created = admin::create(
        &state.pool,
        NewAdmin {
            name: payload.name.trim(),
            email: &email,
            password_hash: &password_hash,
            role: AdminRole::SubAdmin,
            permissions: &permissions,
        },
    )
    .await
    .map_err(|e| duplicate_as(e, ErrorCode::AdminEmailExists))?;

    security_log!(
        INFO,
        "admin_created",
        admin_id = current.id(),
        target_id = created.id
    );
    Ok(Json(created))
}

/// PUT /api/admins/:id
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdate>,
) -> AppResult<Json<Admin>> {
    let target = load(&state, id).await?;
    authorize_admin_update(&current.principal, &target, &payload)?;

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    let email = payload.email.as_deref().map(|e| e.trim().to_lowercase());
    if let Some(email) = &email {
        validate_email(email)?;
    }
    let permissions = payload.permission_set()?;
    let password_hash = match &payload.password {
        Some(password) => {
            validate_password(password)?;
            Some(hash(password)?)
        }
        None => None,
    };

    let privileged = payload.touches_privileged();
    let updated = admin::update(
        &state.pool,
        id,
        AdminChanges {
            name: payload.name.map(|n| n.trim().to_string()),
            email,
            password_hash,
            permissions,
        },
    )
    .await
    .map_err(|e| duplicate_as(e, ErrorCode::AdminEmailExists))?;

    if privileged {
        security_log!(
            INFO,
            "admin_permissions_changed",
            admin_id = current.id(),
            target_id = id
        );
    }
    Ok(Json(updated))
}

/// DELETE /api/admins/:id
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let target = load(&state, id).await?;
    authorize_admin_delete(&current.principal, &target)?;

    let result = admin::delete(&state.pool, id).await?;
    if result {
        security_log!(INFO, "admin_deleted", admin_id = current.id(), target_id = id);
    }
    Ok(Json(result))
}
