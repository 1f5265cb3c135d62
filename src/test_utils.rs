#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::http::{header::AUTHORIZATION, HeaderName, HeaderValue};
    use axum_test::TestServer;
    use migration::{Migrator, MigratorTrait};
    use model::entities::{ingredient, tag, user};
    use moka::future::Cache;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        let token_cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(60))
            .build();

        AppState { db, token_cache }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create a test server and keep the state so tests can seed the database directly
    pub async fn setup_test_server() -> (TestServer, AppState, tracing::subscriber::DefaultGuard) {
        let guard = init_test_tracing();
        let state = setup_test_app_state().await;
        let server = TestServer::new(create_router(state.clone())).expect("Failed to build test server");
        (server, state, guard)
    }

    /// Create a user and issue a token for it
    pub async fn create_user_with_token(state: &AppState, email: &str, password: &str) -> (user::Model, String) {
        let user = model::accounts::create_user(&state.db, email, password)
            .await
            .expect("Failed to create test user");
        let token = model::tokens::issue_token(&state.db, user.id)
            .await
            .expect("Failed to issue test token");
        (user, token)
    }

    /// Header pair authenticating as the token's owner
    pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Token {}", token)).expect("Invalid token header");
        (AUTHORIZATION, value)
    }

    pub async fn create_tag(state: &AppState, user_id: i32, name: &str) -> tag::Model {
        tag::ActiveModel {
            name: Set(name.to_string()),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .expect("Failed to create test tag")
    }

    pub async fn create_ingredient(state: &AppState, user_id: i32, name: &str) -> ingredient::Model {
        ingredient::ActiveModel {
            name: Set(name.to_string()),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .expect("Failed to create test ingredient")
    }
}
