use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::{self, rules, Principal};
use crate::errors::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentDashboard {
    pub my_properties: i64,
    pub accessed_by: String,
}

#[utoipa::path(
    get,
    path = "/agent/dashboard",
    tag = "Agent",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Agent dashboard", body = AgentDashboard),
        (status = 403, description = "Caller is not an agent or admin")
    )
)]
pub async fn dashboard(State(state): State<AppState>, principal: Principal) -> AppResult<Json<AgentDashboard>> {
    authz::ensure(&principal, &rules::AGENT_DASHBOARD)?;

    let my_properties: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM properties WHERE owner_id = ?")
        .bind(principal.id)
        .fetch_one(&state.pool)
        .await?;

    tracing::info!(user_id = %principal.id, "agent dashboard accessed");

    Ok(Json(AgentDashboard {
        my_properties,
        accessed_by: principal.email,
    }))
}
