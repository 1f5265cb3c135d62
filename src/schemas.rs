use axum::{http::StatusCode, response::Json};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use validator::ValidationError;

use crate::handlers::{
    ingredients::{CreateIngredientRequest, IngredientResponse},
    recipes::{CreateRecipeRequest, RecipeDetailResponse, RecipeResponse},
    tags::{CreateTagRequest, TagResponse},
    users::{CreateUserRequest, TokenRequest, TokenResponse, UpdateUserRequest, UserResponse},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Token digest to user id, so authenticated requests skip the token lookup
    pub token_cache: Cache<String, i32>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Builds an error response with a machine-readable code.
pub fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }),
    )
}

/// 500 response for a failed database operation.
pub fn database_error(action: &str) -> ApiError {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to {}", action),
        "DATABASE_ERROR",
    )
}

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Registers the `Authorization: Token <key>` scheme.
pub struct TokenSecurity;

impl Modify for TokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token <key> as returned by POST /api/user/token/",
                ))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::create_token,
        crate::handlers::users::get_me,
        crate::handlers::users::update_me,
        crate::handlers::tags::get_tags,
        crate::handlers::tags::create_tag,
        crate::handlers::ingredients::get_ingredients,
        crate::handlers::ingredients::create_ingredient,
        crate::handlers::recipes::get_recipes,
        crate::handlers::recipes::create_recipe,
        crate::handlers::recipes::get_recipe,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            TokenRequest,
            TokenResponse,
            CreateTagRequest,
            TagResponse,
            CreateIngredientRequest,
            IngredientResponse,
            CreateRecipeRequest,
            RecipeResponse,
            RecipeDetailResponse,
        )
    ),
    modifiers(&TokenSecurity),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Account registration, tokens and profile"),
        (name = "tags", description = "Per-user recipe tags"),
        (name = "ingredients", description = "Per-user ingredients"),
        (name = "recipes", description = "Per-user recipes"),
    ),
    info(
        title = "Recipe API",
        description = "Recipe management API with per-user tags, ingredients and recipes",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
