use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{self, rules, Principal};
use crate::errors::{AppError, AppResult};
use crate::models::property::{DbProperty, Property, PropertyCreateRequest, PropertyUpdateRequest};
use crate::utils::utc_now;

#[utoipa::path(
    get,
    path = "/properties",
    tag = "Properties",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "All listings", body = [Property]))
)]
pub async fn list_properties(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<Vec<Property>>> {
    authz::ensure(&principal, &rules::LIST_PROPERTIES)?;

    let properties = sqlx::query_as::<_, DbProperty>(
        "SELECT id, owner_id, title, description, price, created_at, updated_at FROM properties ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(properties.into_iter().map(Property::from).collect()))
}

#[utoipa::path(
    get,
    path = "/properties/{id}",
    tag = "Properties",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Property id")),
    responses(
        (status = 200, description = "Property detail", body = Property),
        (status = 404, description = "Property not found")
    )
)]
pub async fn get_property(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Property>> {
    authz::ensure(&principal, &rules::VIEW_PROPERTY)?;

    let property = DbProperty::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("property not found"))?;

    Ok(Json(property.into()))
}

#[utoipa::path(
    post,
    path = "/properties",
    tag = "Properties",
    security(("bearerAuth" = [])),
    request_body = PropertyCreateRequest,
    responses(
        (status = 201, description = "Property created", body = Property),
        (status = 403, description = "Caller is not an agent or admin")
    )
)]
pub async fn create_property(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<PropertyCreateRequest>,
) -> AppResult<(StatusCode, Json<Property>)> {
    authz::ensure(&principal, &rules::CREATE_PROPERTY)?;

    let now = utc_now();
    let property_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO properties (id, owner_id, title, description, price, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(property_id)
    .bind(principal.id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    tracing::info!(%property_id, owner_id = %principal.id, "property created");

    let property = DbProperty::find_by_id(&state.pool, property_id)
        .await?
        .ok_or_else(|| AppError::internal("property missing after insert"))?;

    Ok((StatusCode::CREATED, Json(property.into())))
}

#[utoipa::path(
    put,
    path = "/properties/{id}",
    tag = "Properties",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Property id")),
    request_body = PropertyUpdateRequest,
    responses(
        (status = 200, description = "Property updated", body = Property),
        (status = 403, description = "Caller does not own this property"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn update_property(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<PropertyUpdateRequest>,
) -> AppResult<Json<Property>> {
    // existence first: ownership of a nonexistent property is undefined
    let mut property = DbProperty::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("property not found"))?;

    authz::ensure_owner(&principal, &rules::UPDATE_PROPERTY, property.owner_id)?;

    if let Some(title) = payload.title.as_ref() {
        property.title = title.clone();
    }
    if payload.description.is_some() {
        property.description = payload.description.clone();
    }
    if let Some(price) = payload.price {
        property.price = price;
    }

    let now = utc_now();

    sqlx::query(
        "UPDATE properties SET title = ?, description = ?, price = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&property.title)
    .bind(&property.description)
    .bind(property.price)
    .bind(now)
    .bind(id)
    .execute(&state.pool)
    .await?;

    tracing::info!(property_id = %id, user_id = %principal.id, "property updated");

    let property = DbProperty::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::internal("property missing after update"))?;

    Ok(Json(property.into()))
}

#[utoipa::path(
    get,
    path = "/properties/my-properties",
    tag = "Properties",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Caller's listings", body = [Property]))
)]
pub async fn my_properties(
    State(state): State<AppState>,
    principal: Principal,
) -> AppResult<Json<Vec<Property>>> {
    authz::ensure(&principal, &rules::MY_PROPERTIES)?;

    let properties = sqlx::query_as::<_, DbProperty>(
        "SELECT id, owner_id, title, description, price, created_at, updated_at FROM properties WHERE owner_id = ? ORDER BY created_at DESC",
    )
    .bind(principal.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(properties.into_iter().map(Property::from).collect()))
}
