use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbProperty {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbProperty {
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<DbProperty>, sqlx::Error> {
        sqlx::query_as::<_, DbProperty>(
            "SELECT id, owner_id, title, description, price, created_at, updated_at FROM properties WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

impl From<DbProperty> for Property {
    fn from(value: DbProperty) -> Self {
        Property {
            id: value.id,
            owner_id: value.owner_id,
            title: value.title,
            description: value.description,
            price: value.price,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PropertyCreateRequest {
    #[schema(example = "Sunny 2-bedroom apartment")]
    pub title: String,
    #[schema(example = "Close to the city centre, recently renovated.")]
    pub description: Option<String>,
    #[schema(example = 1250.0)]
    pub price: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PropertyUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}
