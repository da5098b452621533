use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::json;
use sqlx::SqlitePool;
use tempfile::tempdir;
use tower::util::ServiceExt;

use property_api::authz::Role;
use property_api::create_app;
use property_api::jwt::JwtConfig;

#[tokio::test]
async fn auth_edge_cases() -> Result<()> {
    let dir = tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test_auth.db");
    use sqlx::sqlite::SqliteConnectOptions;
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"))
        .await?;
    migrator.run(&pool).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool.clone()).await?;

    // 1. Register with short password
    let short_pass_body = json!({
        "name": "Short Pass",
        "email": "short@example.com",
        "password": "short"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(short_pass_body.to_string()))?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "Should fail with bad request for short password");

    // 2. Register with valid user; mixed-case email is stored lowercase,
    //    the account gets the USER role and no token is issued
    let valid_body = json!({
        "name": "Valid User",
        "email": "Valid@Example.com",
        "password": "password123"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(valid_body.to_string()))?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let registered: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(registered.get("email").and_then(|v| v.as_str()), Some("valid@example.com"));
    assert_eq!(registered.get("role").and_then(|v| v.as_str()), Some("USER"));
    assert!(registered.get("token").is_none(), "registration must not issue a token");

    // 3. Duplicate registration is rejected and issues nothing
    let dup_body = json!({
        "name": "Valid Again",
        "email": "valid@example.com",
        "password": "password456"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(dup_body.to_string()))?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT, "Duplicate email should conflict");

    // 4. Login with wrong password
    let wrong_pass_body = json!({
        "email": "valid@example.com",
        "password": "wrongpassword"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(wrong_pass_body.to_string()))?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "Should fail with unauthorized for wrong password");
    let wrong_pass_bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;

    // 5. Login with non-existent email looks identical to a wrong password
    let no_user_body = json!({
        "email": "nobody@example.com",
        "password": "password123"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(no_user_body.to_string()))?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "Should fail with unauthorized for non-existent user");
    let no_user_bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    assert_eq!(wrong_pass_bytes, no_user_bytes, "login failures must not be distinguishable");

    // 6. Login with the original mixed-case email succeeds
    let login_body = json!({
        "email": "Valid@Example.com",
        "password": "password123"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(login_body.to_string()))?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
    let auth_res: serde_json::Value = serde_json::from_slice(&bytes)?;
    let token = auth_res
        .get("token")
        .and_then(|v| v.as_str())
        .context("missing token")?
        .to_string();
    assert_eq!(
        auth_res.pointer("/user/role").and_then(|v| v.as_str()),
        Some("USER")
    );

    // 7. Protected route without a token
    let req = Request::builder()
        .method("GET")
        .uri("/properties")
        .body(Body::empty())?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "Should fail with unauthorized for missing token");

    // 8. Garbled token resolves to unauthorized, never forbidden
    let req = Request::builder()
        .method("GET")
        .uri("/properties")
        .header("authorization", "Bearer not.a.token")
        .body(Body::empty())?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 9. Expired token also resolves to unauthorized
    let expired_signer = JwtConfig {
        secret: Arc::new(b"test-secret".to_vec()),
        exp_hours: -1,
    };
    let expired = expired_signer.encode("valid@example.com", Role::User)?;
    let req = Request::builder()
        .method("GET")
        .uri("/properties")
        .header("authorization", format!("Bearer {}", expired))
        .body(Body::empty())?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "Expired token must be unauthorized, not forbidden");

    // 10. The fresh token is accepted
    let req = Request::builder()
        .method("GET")
        .uri("/properties")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())?;
    let resp: Response = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    Ok(())
}
