use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{Principal, Role};
use crate::errors::{AppError, AppResult};
use crate::models::user::{AuthResponse, DbUser, LoginRequest, RegisterRequest, User};
use crate::utils::{hash_password, utc_now, verify_password};

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Password too weak"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let email = payload.email.trim().to_lowercase();
    ensure_email_available(&state.pool, &email).await?;

    let password_hash = hash_password(&payload.password)?;
    let now = utc_now();
    let user_id = Uuid::new_v4();

    // every self-registered account starts as USER
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(&payload.name)
    .bind(&email)
    .bind(password_hash)
    .bind(Role::User.as_str())
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    tracing::info!(%user_id, "user registered");

    let db_user = DbUser::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::internal("user missing after insert"))?;
    let user: User = db_user.try_into()?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = verify_credentials(&state.pool, &payload.email, &payload.password).await?;
    let token = state.jwt.encode(&user.email, user.role)?;

    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(AuthResponse { token, user }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Current user", body = User))
)]
pub async fn me(State(state): State<AppState>, principal: Principal) -> AppResult<Json<User>> {
    let db_user = DbUser::find_by_id(&state.pool, principal.id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    let user: User = db_user.try_into()?;

    Ok(Json(user))
}

/// Credential check behind `login`.
///
/// An unknown email and a wrong password are logged differently but surface
/// as the same generic failure, so callers cannot enumerate accounts.
async fn verify_credentials(pool: &SqlitePool, email: &str, password: &str) -> AppResult<User> {
    let email = email.trim().to_lowercase();

    let Some(db_user) = DbUser::find_by_email(pool, &email).await? else {
        tracing::debug!("login rejected: unknown email");
        return Err(AppError::unauthorized("invalid email or password"));
    };

    if !verify_password(password, &db_user.password_hash)? {
        tracing::debug!(user_id = %db_user.id, "login rejected: password mismatch");
        return Err(AppError::unauthorized("invalid email or password"));
    }

    db_user.try_into()
}

async fn ensure_email_available(pool: &SqlitePool, email: &str) -> AppResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Err(AppError::conflict("email already registered"));
    }

    Ok(())
}
