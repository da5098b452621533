use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::{self, rules, Principal, Role};
use crate::errors::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_agents: i64,
    pub total_properties: i64,
    pub accessed_by: String,
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "System statistics", body = AdminStats),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn stats(State(state): State<AppState>, principal: Principal) -> AppResult<Json<AdminStats>> {
    authz::ensure(&principal, &rules::ADMIN_STATS)?;

    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users")
        .fetch_one(&state.pool)
        .await?;
    let total_agents: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE role = ?")
        .bind(Role::Agent.as_str())
        .fetch_one(&state.pool)
        .await?;
    let total_properties: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM properties")
        .fetch_one(&state.pool)
        .await?;

    tracing::info!(user_id = %principal.id, "admin stats accessed");

    Ok(Json(AdminStats {
        total_users,
        total_agents,
        total_properties,
        accessed_by: principal.email,
    }))
}
