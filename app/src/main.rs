mod logging;

use std::path::PathBuf;

use api::{ApiConfig, AppState};
use catalog::CatalogStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};
use user::{AccountStore, CodeAuth, Mailer, MailerConfig, TokenKeys};

/// Server configuration loaded from the environment (and `.env`).
#[derive(Debug, Clone)]
struct EnvConfig {
    data_path: PathBuf,
    database_file: String,
    port: u16,
    jwt_secret: String,
    token_ttl_minutes: i64,
    smtp_host: String,
    smtp_port: u16,
    smtp_username: String,
    smtp_password: String,
    from_email: String,
    from_name: String,
}

impl EnvConfig {
    fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();

        Self {
            data_path: PathBuf::from(
                std::env::var("DATA_PATH").unwrap_or_else(|_| "./data".to_string()),
            ),
            database_file: std::env::var("DATABASE_FILE")
                .unwrap_or_else(|_| "marquee.db".to_string()),
            port: env_parsed("PORT", 3030),
            jwt_secret,
            token_ttl_minutes: env_parsed("TOKEN_TTL_MINUTES", 24 * 60),
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: env_parsed("SMTP_PORT", 1025),
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: std::env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@marquee.local".to_string()),
            from_name: std::env::var("FROM_NAME").unwrap_or_else(|_| "Marquee".to_string()),
        }
    }

    fn mailer_config(&self) -> MailerConfig {
        MailerConfig {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            smtp_username: self.smtp_username.clone(),
            smtp_password: self.smtp_password.clone(),
            from_email: self.from_email.clone(),
            from_name: self.from_name.clone(),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EnvConfig::from_env();

    let _guard = logging::init_logging(&config.data_path)?;
    info!("=== Marquee starting up ===");

    let database_path = config.data_path.join(&config.database_file);
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    info!("Opening database at {:?}", database_path);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(&database_path)
                .create_if_missing(true),
        )
        .await?;

    let accounts = AccountStore::new(pool.clone());
    accounts.migrate().await?;
    let catalog = CatalogStore::new(pool.clone());
    catalog.migrate().await?;
    info!("Database migrations complete");

    let jwt_secret = if config.jwt_secret.is_empty() {
        warn!("JWT_SECRET is not set; tokens will not survive a restart");
        format!("marquee-ephemeral-{}", std::process::id())
    } else {
        config.jwt_secret.clone()
    };
    let tokens = TokenKeys::from_secret(jwt_secret.as_bytes(), config.token_ttl_minutes);

    let mailer = match Mailer::new(config.mailer_config()) {
        Ok(mailer) => Some(mailer),
        Err(e) => {
            warn!("Mailer unavailable, confirmation codes stay in the database: {}", e);
            None
        }
    };

    let code_auth = CodeAuth::new(accounts.clone(), tokens.clone(), mailer);
    let state = AppState {
        accounts,
        catalog,
        code_auth,
        tokens,
    };

    let result = api::start_server_with_config(state, ApiConfig::new().with_port(config.port)).await;
    logging::log_shutdown();
    result
}
