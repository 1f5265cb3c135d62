use anyhow::{Context, Result};
use sea_orm::Database;
use tracing::{error, info};

pub async fn create_superuser(database_url: &str, email: &str, password: &str) -> Result<()> {
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    match model::accounts::create_superuser(&db, email, password).await {
        Ok(user) => {
            info!("Superuser {} created with ID {}", user.email, user.id);
            Ok(())
        }
        Err(e) => {
            error!("Failed to create superuser: {}", e);
            Err(e.into())
        }
    }
}
