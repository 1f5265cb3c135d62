//! User account manager.
//!
//! All user creation goes through here so that email normalization, the
//! non-empty email invariant and password hashing are applied uniformly.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::entities::user;

/// Errors raised by account operations
#[derive(Error, Debug)]
pub enum AccountError {
    /// Users must have an email address
    #[error("Users must have an email address")]
    MissingEmail,

    /// A user with the normalized email already exists
    #[error("A user with email '{0}' already exists")]
    DuplicateEmail(String),

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Lowercases the whole address and strips surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hashes a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AccountError::PasswordHash(format!("Failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::PasswordHash(format!("Failed to hash password: {}", e)))
}

/// Verifies a password against a PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Creates a regular user.
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> Result<user::Model, AccountError> {
    create_user_with_name(db, email, password, "").await
}

/// Creates a regular user with a display name.
#[instrument(skip(db, password))]
pub async fn create_user_with_name<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
    name: &str,
) -> Result<user::Model, AccountError> {
    insert_user(db, email, password, name, false).await
}

/// Creates a user with `is_staff` and `is_superuser` set.
#[instrument(skip(db, password))]
pub async fn create_superuser<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> Result<user::Model, AccountError> {
    insert_user(db, email, password, "", true).await
}

async fn insert_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
    name: &str,
    elevated: bool,
) -> Result<user::Model, AccountError> {
    let email = normalize_email(email);
    if email.is_empty() {
        warn!("Refusing to create a user without an email address");
        return Err(AccountError::MissingEmail);
    }

    if find_by_email(db, &email).await?.is_some() {
        warn!("User with email '{}' already exists", email);
        return Err(AccountError::DuplicateEmail(email));
    }

    let new_user = user::ActiveModel {
        email: Set(email.clone()),
        name: Set(name.to_string()),
        password_hash: Set(hash_password(password)?),
        is_active: Set(true),
        is_staff: Set(elevated),
        is_superuser: Set(elevated),
        ..Default::default()
    };

    // A concurrent registration can still win the race past the lookup above.
    let user = new_user
        .insert(db)
        .await
        .map_err(|e| insert_error(e, &email))?;
    info!(
        "Created user with ID: {}, email: {}, superuser: {}",
        user.id, user.email, user.is_superuser
    );
    Ok(user)
}

/// Maps a unique violation on insert to `DuplicateEmail`.
fn insert_error(err: DbErr, email: &str) -> AccountError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!("User with email '{}' was inserted concurrently", email);
            AccountError::DuplicateEmail(email.to_string())
        }
        _ => AccountError::Database(err),
    }
}

/// Looks up a user by email, normalizing the input first.
pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, AccountError> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?;
    Ok(user)
}

/// Returns the user when the credentials are valid and the account is active.
#[instrument(skip(db, password))]
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> Result<Option<user::Model>, AccountError> {
    let Some(user) = find_by_email(db, email).await? else {
        debug!("No user found for email");
        return Ok(None);
    };

    if !user.is_active || !user.check_password(password) {
        debug!("Credentials rejected for user {}", user.id);
        return Ok(None);
    }

    Ok(Some(user))
}

/// Replaces the stored password hash.
pub async fn set_password<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    password: &str,
) -> Result<user::Model, AccountError> {
    let mut active: user::ActiveModel = user.into();
    active.password_hash = Set(hash_password(password)?);
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_user_with_email_successful() {
        let db = setup_test_db().await;

        let user = create_user(&db, "test@mail.com", "testpass123").await.unwrap();

        assert_eq!(user.email, "test@mail.com");
        assert!(user.check_password("testpass123"));
        assert!(!user.check_password("wrongpass"));
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
    }

    #[tokio::test]
    async fn test_new_user_email_normalized() {
        let db = setup_test_db().await;
        let email = "test@MAIL.COM";

        let user = create_user(&db, email, "testpass123").await.unwrap();

        assert_eq!(user.email, email.to_lowercase());
    }

    #[tokio::test]
    async fn test_new_user_invalid_email() {
        let db = setup_test_db().await;

        let result = create_user(&db, "", "testpass123").await;
        assert!(matches!(result, Err(AccountError::MissingEmail)));

        let result = create_user(&db, "   ", "testpass123").await;
        assert!(matches!(result, Err(AccountError::MissingEmail)));
    }

    #[tokio::test]
    async fn test_create_new_superuser() {
        let db = setup_test_db().await;

        let user = create_superuser(&db, "test@MAIL.COM", "testpass123").await.unwrap();

        assert!(user.is_superuser);
        assert!(user.is_staff);
        assert_eq!(user.email, "test@mail.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_case_insensitively() {
        let db = setup_test_db().await;
        create_user(&db, "test@mail.com", "testpass123").await.unwrap();

        let result = create_user(&db, "TEST@mail.com", "otherpass").await;

        assert!(matches!(result, Err(AccountError::DuplicateEmail(e)) if e == "test@mail.com"));
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_duplicate_email() {
        let db = setup_test_db().await;
        create_user(&db, "test@mail.com", "testpass123").await.unwrap();

        // Bypasses the lookup, as a racing registration would.
        let err = user::ActiveModel {
            email: Set("test@mail.com".to_string()),
            name: Set(String::new()),
            password_hash: Set(hash_password("otherpass").unwrap()),
            is_active: Set(true),
            is_staff: Set(false),
            is_superuser: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap_err();

        let mapped = insert_error(err, "test@mail.com");
        assert!(matches!(mapped, AccountError::DuplicateEmail(e) if e == "test@mail.com"));
    }

    #[test]
    fn test_other_insert_errors_stay_database_errors() {
        let mapped = insert_error(DbErr::Custom("boom".to_string()), "test@mail.com");
        assert!(matches!(mapped, AccountError::Database(_)));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = setup_test_db().await;
        create_user(&db, "test@mail.com", "testpass123").await.unwrap();

        let user = authenticate(&db, "Test@Mail.com", "testpass123").await.unwrap();
        assert!(user.is_some());

        let user = authenticate(&db, "test@mail.com", "wrong").await.unwrap();
        assert!(user.is_none());

        let user = authenticate(&db, "nobody@mail.com", "testpass123").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_set_password() {
        let db = setup_test_db().await;
        let user = create_user(&db, "test@mail.com", "testpass123").await.unwrap();

        let user = set_password(&db, user, "newpass456").await.unwrap();

        assert!(user.check_password("newpass456"));
        assert!(!user.check_password("testpass123"));
    }

    #[test]
    fn test_verify_password_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
