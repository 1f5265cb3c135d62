use crate::auth::AuthUser;
use crate::schemas::{database_error, not_blank, ApiError, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use model::entities::ingredient;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Request structure for creating a new ingredient
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateIngredientRequest {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(model: ingredient::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// List the caller's ingredients, reverse-alphabetically by name
#[utoipa::path(
    get,
    path = "/api/recipe/ingredients/",
    security(("token" = [])),
    responses(
        (status = 200, description = "Ingredients owned by the caller", body = Vec<IngredientResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "ingredients"
)]
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn get_ingredients(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    debug!("Fetching ingredients for user {}", user.id());

    let ingredients = ingredient::Entity::find()
        .filter(ingredient::Column::UserId.eq(user.id()))
        .order_by_desc(ingredient::Column::Name)
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to fetch ingredients: {}", e);
            database_error("fetch ingredients")
        })?;

    info!("Successfully fetched {} ingredients", ingredients.len());
    Ok(Json(ingredients.into_iter().map(IngredientResponse::from).collect()))
}

/// Create an ingredient owned by the caller
#[utoipa::path(
    post,
    path = "/api/recipe/ingredients/",
    security(("token" = [])),
    request_body = CreateIngredientRequest,
    responses(
        (status = 201, description = "Ingredient created successfully", body = IngredientResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "ingredients"
)]
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    user: AuthUser,
    Valid(Json(request)): Valid<Json<CreateIngredientRequest>>,
) -> Result<(StatusCode, Json<IngredientResponse>), ApiError> {
    debug!("Creating ingredient with name: {}", request.name);

    let created = ingredient::ActiveModel {
        name: Set(request.name.trim().to_string()),
        user_id: Set(user.id()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        error!("Failed to create ingredient: {}", e);
        database_error("create ingredient")
    })?;

    info!("Successfully created ingredient with ID: {}", created.id);
    Ok((StatusCode::CREATED, Json(IngredientResponse::from(created))))
}
