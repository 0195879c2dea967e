//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{bug_handler, user_handler};
use crate::domain::{BugPriority, BugResponse, BugStats, BugStatus, UserResponse, UserRole};
use crate::services::TokenResponse;
use crate::types::MessageResponse;

/// OpenAPI documentation for the Bugtrail API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bugtrail API",
        version = "0.1.0",
        description = "Bug tracking API with ownership-based authorization",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // User endpoints
        user_handler::register,
        user_handler::login,
        user_handler::get_profile,
        user_handler::update_profile,
        user_handler::list_users,
        // Bug endpoints
        bug_handler::create_bug,
        bug_handler::list_bugs,
        bug_handler::bug_stats,
        bug_handler::get_bug,
        bug_handler::update_bug,
        bug_handler::delete_bug,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            BugStatus,
            BugPriority,
            BugResponse,
            BugStats,
            // Request/response types
            user_handler::RegisterRequest,
            user_handler::LoginRequest,
            user_handler::UpdateProfileRequest,
            user_handler::AuthResponse,
            bug_handler::CreateBugRequest,
            bug_handler::UpdateBugRequest,
            TokenResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Registration, login, and profile management"),
        (name = "Bugs", description = "Bug lifecycle and dashboard statistics")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/users/login"))
                        .build(),
                ),
            );
        }
    }
}
