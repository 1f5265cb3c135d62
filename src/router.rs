use crate::handlers::{
    health::health_check,
    ingredients::{create_ingredient, get_ingredients},
    recipes::{create_recipe, get_recipe, get_recipes},
    tags::{create_tag, get_tags},
    users::{create_token, create_user, get_me, update_me},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User routes
        .route("/api/user/create/", post(create_user))
        .route("/api/user/token/", post(create_token))
        .route("/api/user/me/", get(get_me).patch(update_me))
        // Recipe catalog routes, all scoped to the authenticated user
        .route("/api/recipe/tags/", get(get_tags).post(create_tag))
        .route("/api/recipe/ingredients/", get(get_ingredients).post(create_ingredient))
        .route("/api/recipe/recipes/", get(get_recipes).post(create_recipe))
        .route("/api/recipe/recipes/:recipe_id/", get(get_recipe))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
