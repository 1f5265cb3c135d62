use crate::auth::AuthUser;
use crate::schemas::{database_error, not_blank, ApiError, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use model::entities::tag;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

/// Request structure for creating a new tag
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTagRequest {
    /// The name of the tag
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: String,
}

/// Response structure for tag operations
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(model: tag::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// List the caller's tags, reverse-alphabetically by name
#[utoipa::path(
    get,
    path = "/api/recipe/tags/",
    security(("token" = [])),
    responses(
        (status = 200, description = "Tags owned by the caller", body = Vec<TagResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tags"
)]
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn get_tags(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    debug!("Fetching tags for user {}", user.id());

    match tag::Entity::find()
        .filter(tag::Column::UserId.eq(user.id()))
        .order_by_desc(tag::Column::Name)
        .all(&state.db)
        .await
    {
        Ok(tags) => {
            let tag_responses: Vec<TagResponse> = tags.into_iter().map(TagResponse::from).collect();
            info!("Successfully fetched {} tags", tag_responses.len());
            Ok(Json(tag_responses))
        }
        Err(e) => {
            error!("Failed to fetch tags: {}", e);
            Err(database_error("fetch tags"))
        }
    }
}

/// Create a tag owned by the caller
#[utoipa::path(
    post,
    path = "/api/recipe/tags/",
    security(("token" = [])),
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created successfully", body = TagResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "tags"
)]
#[instrument(skip(state, user), fields(user_id = user.id()))]
pub async fn create_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Valid(Json(request)): Valid<Json<CreateTagRequest>>,
) -> Result<(StatusCode, Json<TagResponse>), ApiError> {
    debug!("Creating tag with name: {}", request.name);

    let new_tag = tag::ActiveModel {
        name: Set(request.name.trim().to_string()),
        user_id: Set(user.id()),
        ..Default::default()
    };

    match new_tag.insert(&state.db).await {
        Ok(tag_model) => {
            info!("Successfully created tag with ID: {}", tag_model.id);
            Ok((StatusCode::CREATED, Json(TagResponse::from(tag_model))))
        }
        Err(e) => {
            error!("Failed to create tag: {}", e);
            Err(database_error("create tag"))
        }
    }
}
