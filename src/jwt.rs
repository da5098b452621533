use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::app::AppState;
use crate::authz::{Principal, Role};
use crate::errors::AppError;
use crate::models::user::{DbUser, User};
use crate::utils::utc_now;

/// Why a token was rejected.
///
/// These kinds exist for logs and tests; at the HTTP boundary they all
/// collapse into one generic 401 so callers cannot probe the signing scheme.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature mismatch")]
    Forged,
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::Forged,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Arc<Vec<u8>>,
    pub exp_hours: i64,
}

/// Claims carried in every issued token: subject (the account email), the
/// role at issuance time, issued-at and expiry as unix seconds.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| AppError::configuration("JWT_SECRET not set"))?;
        let exp_hours = std::env::var("JWT_EXP_HOURS")
            .map(|val| val.parse::<i64>())
            .unwrap_or(Ok(24))
            .map_err(|_| AppError::configuration("JWT_EXP_HOURS must be a valid integer"))?;

        Ok(Self {
            secret: Arc::new(secret.into_bytes()),
            exp_hours,
        })
    }

    /// Sign a token for the given account. HS256 over the full
    /// header+payload byte sequence.
    pub fn encode(&self, email: &str, role: Role) -> Result<String, AppError> {
        use chrono::Duration;

        let now = utc_now();
        let exp = now + Duration::hours(self.exp_hours);

        let claims = Claims {
            sub: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|err| AppError::internal(format!("failed to sign token: {err}")))
    }

    /// Verify and decode a token.
    ///
    /// The signature is recomputed before any claim is trusted. Expiry is
    /// enforced manually with zero leeway: a token is dead the second
    /// `now >= exp` holds.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)?;

        if utc_now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Boolean check used at the request boundary: does this token verify
    /// AND belong to the expected account? Never surfaces an error.
    pub fn validate(&self, token: &str, expected_email: &str) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.sub == expected_email,
            Err(_) => false,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("invalid or missing token"))?;

        let claims = state.jwt.decode(token).map_err(|kind| {
            tracing::debug!(%kind, "rejected bearer token");
            AppError::unauthorized("invalid or missing token")
        })?;

        let db_user = DbUser::find_by_email(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("invalid or missing token"))?;
        let user: User = db_user.try_into()?;

        Ok(Principal {
            id: user.id,
            email: user.email,
            role: claims.role,
        })
    }
}
