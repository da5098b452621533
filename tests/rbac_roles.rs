use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use tempfile::tempdir;
use tower::util::ServiceExt;
use uuid::Uuid;

use property_api::authz::Role;
use property_api::create_app;
use property_api::utils::hash_password;

async fn seed_user(pool: &SqlitePool, name: &str, email: &str, password: &str, role: Role) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let password_hash = hash_password(password)?;

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

async fn login(app: &Router, email: &str, password: &str) -> Result<String> {
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(json!({"email": email, "password": password}).to_string()))?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");

    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let auth_res: serde_json::Value = serde_json::from_slice(&bytes)?;
    Ok(auth_res
        .get("token")
        .and_then(|v| v.as_str())
        .context("missing token")?
        .to_string())
}

async fn get_with_token(app: &Router, uri: &str, token: &str) -> Result<Response> {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())?;
    Ok(app.clone().oneshot(req).await?)
}

#[tokio::test]
async fn role_matrix_across_protected_endpoints() -> Result<()> {
    let dir = tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test_rbac.db");
    use sqlx::sqlite::SqliteConnectOptions;
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"))
        .await?;
    migrator.run(&pool).await?;

    seed_user(&pool, "Plain User", "user@test.com", "password123", Role::User).await?;
    seed_user(&pool, "Estate Agent", "agent@test.com", "password123", Role::Agent).await?;
    seed_user(&pool, "The Admin", "admin@test.com", "password123", Role::Admin).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;

    let user_token = login(&app, "user@test.com", "password123").await?;
    let agent_token = login(&app, "agent@test.com", "password123").await?;
    let admin_token = login(&app, "admin@test.com", "password123").await?;

    // Admin stats: ADMIN only
    let resp = get_with_token(&app, "/admin/stats", &user_token).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN, "USER must not see admin stats");
    let resp = get_with_token(&app, "/admin/stats", &agent_token).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN, "AGENT must not see admin stats");
    let resp = get_with_token(&app, "/admin/stats", &admin_token).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let stats: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(stats.get("total_users").and_then(|v| v.as_i64()), Some(3));
    assert_eq!(stats.get("total_agents").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(stats.get("accessed_by").and_then(|v| v.as_str()), Some("admin@test.com"));

    // Agent dashboard: AGENT and ADMIN, ADMIN by explicit listing
    let resp = get_with_token(&app, "/agent/dashboard", &user_token).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN, "USER must not see the agent dashboard");
    let resp = get_with_token(&app, "/agent/dashboard", &agent_token).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = get_with_token(&app, "/agent/dashboard", &admin_token).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // Creating a listing requires AGENT or ADMIN; a USER token is forbidden
    let listing = json!({"title": "Tiny studio", "price": 500.0});
    let req = Request::builder()
        .method("POST")
        .uri("/properties")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", user_token))
        .body(Body::from(listing.to_string()))?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN, "USER role cannot create listings");

    // All three roles can browse listings (empty role set = any principal)
    for token in [&user_token, &agent_token, &admin_token] {
        let resp = get_with_token(&app, "/properties", token).await?;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    Ok(())
}
