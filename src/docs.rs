use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::register,
        routes::auth::login,
        routes::auth::me,
        routes::properties::list_properties,
        routes::properties::create_property,
        routes::properties::get_property,
        routes::properties::update_property,
        routes::properties::my_properties,
        routes::agent::dashboard,
        routes::admin::stats,
        routes::health::health,
    ),
    components(schemas(
        models::user::User,
        models::user::AuthResponse,
        models::user::LoginRequest,
        models::user::RegisterRequest,
        models::property::Property,
        models::property::PropertyCreateRequest,
        models::property::PropertyUpdateRequest,
        routes::agent::AgentDashboard,
        routes::admin::AdminStats,
        routes::health::HealthResponse,
        crate::authz::Role,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Properties", description = "Property listings"),
        (name = "Agent", description = "Agent dashboard"),
        (name = "Admin", description = "Administrative statistics"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
