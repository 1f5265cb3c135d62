//! API token issuing and resolution.
//!
//! Keys are 20 random bytes rendered as 40 hex characters. Only the SHA-256
//! digest of a key is persisted, so a leaked table cannot be replayed.

use chrono::Utc;
use rand::RngCore;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::accounts::AccountError;
use crate::entities::{auth_token, user};

/// Hash a key using SHA-256; this is what gets stored in the database.
pub fn hash_token(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_key() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Issues a new token for the user and returns the plaintext key.
/// The key is only ever available from this return value.
pub async fn issue_token<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<String, AccountError> {
    let key = generate_key();

    auth_token::ActiveModel {
        token_hash: Set(hash_token(&key)),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Issued API token for user {}", user_id);
    Ok(key)
}

/// Finds the id of the user owning a token digest.
pub async fn find_user_id<C: ConnectionTrait>(
    db: &C,
    token_hash: &str,
) -> Result<Option<i32>, AccountError> {
    let token = auth_token::Entity::find()
        .filter(auth_token::Column::TokenHash.eq(token_hash))
        .one(db)
        .await?;
    Ok(token.map(|t| t.user_id))
}

/// Loads a user by id, returning it only when active.
pub async fn load_active_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<user::Model>, AccountError> {
    let user = user::Entity::find_by_id(user_id).one(db).await?;
    Ok(user.filter(|u| {
        if !u.is_active {
            debug!("User {} is inactive", u.id);
        }
        u.is_active
    }))
}

/// Resolves a plaintext key to its active owner.
pub async fn resolve_token<C: ConnectionTrait>(
    db: &C,
    key: &str,
) -> Result<Option<user::Model>, AccountError> {
    match find_user_id(db, &hash_token(key)).await? {
        Some(user_id) => load_active_user(db, user_id).await,
        None => {
            debug!("Unknown API token presented");
            Ok(None)
        }
    }
}
