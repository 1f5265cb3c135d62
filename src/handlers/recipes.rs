use crate::auth::AuthUser;
use crate::handlers::{ingredients::IngredientResponse, tags::TagResponse};
use crate::schemas::{api_error, database_error, not_blank, ApiError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Request body for creating a recipe
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateRecipeRequest {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub title: String,
    /// Preparation time in minutes
    #[validate(range(min = 0))]
    pub time_minutes: i32,
    /// Up to 999.99, at most two decimal places
    #[validate(custom(function = "valid_price"))]
    pub price: Decimal,
    #[validate(length(max = 255))]
    pub link: Option<String>,
    /// Ids of the caller's tags to attach
    #[serde(default)]
    pub tags: Vec<i32>,
    /// Ids of the caller's ingredients to attach
    #[serde(default)]
    pub ingredients: Vec<i32>,
}

/// Prices must fit the `NUMERIC(5, 2)` column.
fn valid_price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    if value.normalize().scale() > 2 {
        return Err(ValidationError::new("too_many_decimal_places"));
    }
    if *value >= Decimal::ONE_THOUSAND {
        return Err(ValidationError::new("too_large"));
    }
    Ok(())
}

/// Filters for the recipe list; each is a comma-separated list of ids
#[derive(Debug, Deserialize, IntoParams)]
pub struct RecipeQuery {
    /// Keep recipes carrying any of these tag ids
    pub tags: Option<String>,
    /// Keep recipes using any of these ingredient ids
    pub ingredients: Option<String>,
}

/// Recipe list entry; tags and ingredients are ids
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

impl RecipeResponse {
    fn new(model: recipe::Model, tags: Vec<i32>, ingredients: Vec<i32>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            time_minutes: model.time_minutes,
            price: model.price,
            link: model.link,
            tags,
            ingredients,
        }
    }
}

/// Recipe detail with tags and ingredients expanded
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeDetailResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

/// Parses `"1,2, 3"` into ids. An empty string yields no ids.
pub fn parse_ids(raw: &str) -> Result<Vec<i32>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

fn parse_filter(raw: Option<&str>, name: &str) -> Result<Vec<i32>, ApiError> {
    match raw {
        Some(raw) => parse_ids(raw).map_err(|e| {
            warn!("Invalid {} filter '{}': {}", name, raw, e);
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid {} filter: expected comma-separated ids", name),
                "INVALID_FILTER",
            )
        }),
        None => Ok(Vec::new()),
    }
}

fn dedup(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Groups `(recipe_id, other_id)` link pairs by recipe.
fn group_links(pairs: impl IntoIterator<Item = (i32, i32)>) -> HashMap<i32, Vec<i32>> {
    let mut grouped: HashMap<i32, Vec<i32>> = HashMap::new();
    for (recipe_id, other_id) in pairs {
        grouped.entry(recipe_id).or_default().push(other_id);
    }
    for ids in grouped.values_mut() {
        ids.sort_unstable();
    }
    grouped
}

async fn recipe_ids_with_tags<C: ConnectionTrait>(db: &C, tag_ids: &[i32]) -> Result<Vec<i32>, DbErr> {
    let links = recipe_tag::Entity::find()
        .filter(recipe_tag::Column::TagId.is_in(tag_ids.to_vec()))
        .all(db)
        .await?;
    Ok(dedup(&links.into_iter().map(|l| l.recipe_id).collect::<Vec<_>>()))
}

async fn recipe_ids_with_ingredients<C: ConnectionTrait>(
    db: &C,
    ingredient_ids: &[i32],
) -> Result<Vec<i32>, DbErr> {
    let links = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::IngredientId.is_in(ingredient_ids.to_vec()))
        .all(db)
        .await?;
    Ok(dedup(&links.into_iter().map(|l| l.recipe_id).collect::<Vec<_>>()))
}

/// List the caller's recipes, newest first
#[utoipa::path(
    get,
    path = "/api/recipe/recipes/",
    tag = "recipes",
    security(("token" = [])),
    params(RecipeQuery),
    responses(
        (status = 200, description = "Recipes owned by the caller", body = Vec<RecipeResponse>),
        (status = 400, description = "Malformed filter", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn get_recipes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    trace!("Entering get_recipes function");
    let tag_filter = parse_filter(query.tags.as_deref(), "tags")?;
    let ingredient_filter = parse_filter(query.ingredients.as_deref(), "ingredients")?;

    let mut select = recipe::Entity::find().filter(recipe::Column::UserId.eq(user.id()));

    if !tag_filter.is_empty() {
        debug!("Filtering recipes by tags {:?}", tag_filter);
        let ids = recipe_ids_with_tags(&state.db, &tag_filter).await.map_err(|e| {
            error!("Failed to filter recipes by tags: {}", e);
            database_error("fetch recipes")
        })?;
        select = select.filter(recipe::Column::Id.is_in(ids));
    }
    if !ingredient_filter.is_empty() {
        debug!("Filtering recipes by ingredients {:?}", ingredient_filter);
        let ids = recipe_ids_with_ingredients(&state.db, &ingredient_filter)
            .await
            .map_err(|e| {
                error!("Failed to filter recipes by ingredients: {}", e);
                database_error("fetch recipes")
            })?;
        select = select.filter(recipe::Column::Id.is_in(ids));
    }

    let recipes = select
        .order_by_desc(recipe::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| {
            error!("Failed to fetch recipes: {}", e);
            database_error("fetch recipes")
        })?;

    let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
    let (tag_links, ingredient_links) = match load_links(&state.db, &recipe_ids).await {
        Ok(links) => links,
        Err(e) => {
            error!("Failed to fetch recipe links: {}", e);
            return Err(database_error("fetch recipes"));
        }
    };
    let mut tags_by_recipe = group_links(tag_links);
    let mut ingredients_by_recipe = group_links(ingredient_links);

    let responses: Vec<RecipeResponse> = recipes
        .into_iter()
        .map(|r| {
            let tags = tags_by_recipe.remove(&r.id).unwrap_or_default();
            let ingredients = ingredients_by_recipe.remove(&r.id).unwrap_or_default();
            RecipeResponse::new(r, tags, ingredients)
        })
        .collect();

    info!("Successfully fetched {} recipes", responses.len());
    Ok(Json(responses))
}

async fn load_links<C: ConnectionTrait>(
    db: &C,
    recipe_ids: &[i32],
) -> Result<(Vec<(i32, i32)>, Vec<(i32, i32)>), DbErr> {
    if recipe_ids.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }
    let tags = recipe_tag::Entity::find()
        .filter(recipe_tag::Column::RecipeId.is_in(recipe_ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|l| (l.recipe_id, l.tag_id))
        .collect();
    let ingredients = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|l| (l.recipe_id, l.ingredient_id))
        .collect();
    Ok((tags, ingredients))
}

/// Create a recipe owned by the caller
#[utoipa::path(
    post,
    path = "/api/recipe/recipes/",
    tag = "recipes",
    security(("token" = [])),
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request or foreign tag/ingredient", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Valid(Json(request)): Valid<Json<CreateRecipeRequest>>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    debug!("Creating recipe with title: {}", request.title);
    let tag_ids = dedup(&request.tags);
    let ingredient_ids = dedup(&request.ingredients);

    // Links may only point at the caller's own tags and ingredients.
    if !tag_ids.is_empty() {
        let owned = tag::Entity::find()
            .filter(tag::Column::UserId.eq(user.id()))
            .filter(tag::Column::Id.is_in(tag_ids.clone()))
            .all(&state.db)
            .await
            .map_err(|e| {
                error!("Failed to validate tags: {}", e);
                database_error("validate tags")
            })?;
        if owned.len() != tag_ids.len() {
            warn!("Recipe references tags not owned by user {}", user.id());
            return Err(api_error(StatusCode::BAD_REQUEST, "Unknown tag id", "UNKNOWN_TAG"));
        }
    }
    if !ingredient_ids.is_empty() {
        let owned = ingredient::Entity::find()
            .filter(ingredient::Column::UserId.eq(user.id()))
            .filter(ingredient::Column::Id.is_in(ingredient_ids.clone()))
            .all(&state.db)
            .await
            .map_err(|e| {
                error!("Failed to validate ingredients: {}", e);
                database_error("validate ingredients")
            })?;
        if owned.len() != ingredient_ids.len() {
            warn!("Recipe references ingredients not owned by user {}", user.id());
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Unknown ingredient id",
                "UNKNOWN_INGREDIENT",
            ));
        }
    }

    let new_recipe = recipe::ActiveModel {
        title: Set(request.title.trim().to_string()),
        time_minutes: Set(request.time_minutes),
        price: Set(request.price.round_dp(2)),
        link: Set(request.link),
        user_id: Set(user.id()),
        ..Default::default()
    };

    match insert_recipe(&state, new_recipe, &tag_ids, &ingredient_ids).await {
        Ok(recipe_model) => {
            info!("Successfully created recipe with ID: {}", recipe_model.id);
            Ok((
                StatusCode::CREATED,
                Json(RecipeResponse::new(recipe_model, tag_ids, ingredient_ids)),
            ))
        }
        Err(e) => {
            error!("Failed to create recipe: {}", e);
            Err(database_error("create recipe"))
        }
    }
}

/// Inserts the recipe and its links in one transaction.
async fn insert_recipe(
    state: &AppState,
    new_recipe: recipe::ActiveModel,
    tag_ids: &[i32],
    ingredient_ids: &[i32],
) -> Result<recipe::Model, DbErr> {
    let txn = state.db.begin().await?;
    let recipe_model = new_recipe.insert(&txn).await?;

    if !tag_ids.is_empty() {
        recipe_tag::Entity::insert_many(tag_ids.iter().map(|&tag_id| recipe_tag::ActiveModel {
            recipe_id: Set(recipe_model.id),
            tag_id: Set(tag_id),
        }))
        .exec_without_returning(&txn)
        .await?;
    }
    if !ingredient_ids.is_empty() {
        recipe_ingredient::Entity::insert_many(ingredient_ids.iter().map(|&ingredient_id| {
            recipe_ingredient::ActiveModel {
                recipe_id: Set(recipe_model.id),
                ingredient_id: Set(ingredient_id),
            }
        }))
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(recipe_model)
}

/// Get one of the caller's recipes
#[utoipa::path(
    get,
    path = "/api/recipe/recipes/{recipe_id}/",
    tag = "recipes",
    security(("token" = [])),
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeDetailResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn get_recipe(
    Path(recipe_id): Path<i32>,
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<RecipeDetailResponse>, ApiError> {
    debug!("Fetching recipe with ID: {}", recipe_id);

    // Another user's recipe is indistinguishable from a missing one.
    let recipe_model = match recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user.id()))
        .one(&state.db)
        .await
    {
        Ok(Some(recipe_model)) => recipe_model,
        Ok(None) => {
            warn!("Recipe with ID {} not found", recipe_id);
            return Err(api_error(StatusCode::NOT_FOUND, "Recipe not found", "NOT_FOUND"));
        }
        Err(e) => {
            error!("Failed to fetch recipe: {}", e);
            return Err(database_error("fetch recipe"));
        }
    };

    let tags = recipe_model
        .find_related(tag::Entity)
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await;
    let ingredients = recipe_model
        .find_related(ingredient::Entity)
        .order_by_asc(ingredient::Column::Name)
        .all(&state.db)
        .await;
    let (tags, ingredients) = match (tags, ingredients) {
        (Ok(tags), Ok(ingredients)) => (tags, ingredients),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to fetch links for recipe {}: {}", recipe_id, e);
            return Err(database_error("fetch recipe"));
        }
    };

    info!("Successfully found recipe with ID: {}", recipe_id);
    Ok(Json(RecipeDetailResponse {
        id: recipe_model.id,
        title: recipe_model.title,
        time_minutes: recipe_model.time_minutes,
        price: recipe_model.price,
        link: recipe_model.link,
        tags: tags.into_iter().map(TagResponse::from).collect(),
        ingredients: ingredients.into_iter().map(IngredientResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_ids("").unwrap(), Vec::<i32>::new());
        assert_eq!(parse_ids("4,").unwrap(), vec![4]);
        assert!(parse_ids("1,abc").is_err());
    }

    #[test]
    fn test_valid_price() {
        assert!(valid_price(&Decimal::new(1150, 2)).is_ok());
        assert!(valid_price(&Decimal::ZERO).is_ok());
        assert!(valid_price(&Decimal::new(99999, 2)).is_ok());
        assert!(valid_price(&Decimal::new(5250, 3)).is_ok());
        assert!(valid_price(&Decimal::new(-1, 0)).is_err());
        assert!(valid_price(&Decimal::new(1000, 0)).is_err());
        assert!(valid_price(&Decimal::new(5251, 3)).is_err());
        assert!(valid_price(&Decimal::new(123456789, 3)).is_err());
    }

    #[test]
    fn test_group_links_sorts_per_recipe() {
        let grouped = group_links(vec![(1, 5), (2, 3), (1, 2)]);
        assert_eq!(grouped[&1], vec![2, 5]);
        assert_eq!(grouped[&2], vec![3]);
    }
}
