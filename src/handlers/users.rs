use crate::auth::AuthUser;
use crate::schemas::{api_error, database_error, ApiError, AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use model::accounts::{self, AccountError};
use model::entities::user;
use model::tokens;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for registering a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Email address, used to log in
    #[validate(email)]
    pub email: String,
    /// Password (at least 5 characters)
    #[validate(length(min = 5))]
    pub password: String,
    /// Optional display name
    #[serde(default)]
    pub name: String,
}

/// Request body for updating the authenticated user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    #[validate(length(min = 5))]
    pub password: Option<String>,
}

/// Credentials exchanged for an API token
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Send as `Authorization: Token <token>`
    pub token: String,
}

/// User response model; never includes the password hash
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
        }
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/user/create/",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    trace!("Entering create_user function");

    match accounts::create_user_with_name(&state.db, &request.email, &request.password, &request.name).await {
        Ok(user_model) => {
            info!("User created successfully with ID: {}", user_model.id);
            Ok((StatusCode::CREATED, Json(UserResponse::from(user_model))))
        }
        Err(AccountError::MissingEmail) => Err(api_error(
            StatusCode::BAD_REQUEST,
            AccountError::MissingEmail.to_string(),
            "VALIDATION_ERROR",
        )),
        Err(AccountError::DuplicateEmail(email)) => {
            warn!("Email '{}' already registered", email);
            Err(api_error(
                StatusCode::CONFLICT,
                format!("User with email '{}' already exists", email),
                "EMAIL_ALREADY_EXISTS",
            ))
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(database_error("create user"))
        }
    }
}

/// Exchange credentials for an API token
#[utoipa::path(
    post,
    path = "/api/user/token/",
    tag = "users",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn create_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    trace!("Entering create_token function");

    let user = match accounts::authenticate(&state.db, &request.email, &request.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Rejected credentials");
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Unable to authenticate with provided credentials",
                "INVALID_CREDENTIALS",
            ));
        }
        Err(e) => {
            error!("Failed to authenticate: {}", e);
            return Err(database_error("authenticate"));
        }
    };

    match tokens::issue_token(&state.db, user.id).await {
        Ok(token) => {
            info!("Issued token for user {}", user.id);
            Ok(Json(TokenResponse { token }))
        }
        Err(e) => {
            error!("Failed to issue token for user {}: {}", user.id, e);
            Err(database_error("issue token"))
        }
    }
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/api/user/me/",
    tag = "users",
    security(("token" = [])),
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[instrument(skip(user))]
pub async fn get_me(user: AuthUser) -> Json<UserResponse> {
    debug!("Returning profile for user {}", user.id());
    Json(UserResponse::from(user.0))
}

/// Update the authenticated user's name and/or password
#[utoipa::path(
    patch,
    path = "/api/user/me/",
    tag = "users",
    security(("token" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request))]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Valid(Json(request)): Valid<Json<UpdateUserRequest>>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = user.id();
    debug!("Updating user {}", user_id);

    // Hash before touching the row so the update is applied in one write.
    let password_hash = match request.password.as_deref().map(accounts::hash_password) {
        Some(Ok(hash)) => Some(hash),
        Some(Err(e)) => {
            error!("Failed to hash password for user {}: {}", user_id, e);
            return Err(database_error("update user"));
        }
        None => None,
    };

    if request.name.is_none() && password_hash.is_none() {
        debug!("Nothing to update for user {}", user_id);
        return Ok(Json(UserResponse::from(user.0)));
    }

    let mut active: user::ActiveModel = user.0.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(password_hash) = password_hash {
        active.password_hash = Set(password_hash);
    }

    let user_model = active.update(&state.db).await.map_err(|e| {
        error!("Failed to update user {}: {}", user_id, e);
        database_error("update user")
    })?;

    info!("User {} updated", user_id);
    Ok(Json(UserResponse::from(user_model)))
}
