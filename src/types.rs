pub use crate::utils::database;
use async_trait::async_trait;
use std::env;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub port: u32,
    pub total_on_page: u32,
}

#[derive(Clone)]
pub struct MediaContext {
    pub root: PathBuf,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub db_conn: database::DatabaseConnection,
    pub media: MediaContext,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u32,
    pub total_on_page: u32,
}

#[derive(Clone)]
pub struct MediaConfig {
    pub root: PathBuf,
}

#[derive(Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub media: MediaConfig,
}

impl Default for Config {
    fn default() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let database_pool_size = env::var("DATABASE_POOL_SIZE")
            .unwrap_or_else(|_| "4".to_string())
            .parse::<u32>()
            .expect("Invalid DATABASE_POOL_SIZE number");
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u32>()
            .expect("Invalid PORT number");
        let total_on_page = env::var("TOTAL_ON_PAGE")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .expect("Invalid TOTAL_ON_PAGE number");
        let media_root = env::var("MEDIA_DIR").unwrap_or_else(|_| "media".to_string());

        Self {
            database: DatabaseConfig {
                url: database_url,
                max_connections: database_pool_size,
            },
            app: AppConfig {
                host,
                port,
                total_on_page,
            },
            media: MediaConfig {
                root: PathBuf::from(media_root),
            },
        }
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Context;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Context {
        let db_conn = database::connect(
            self.database.url.as_str(),
            self.database.max_connections,
        )
        .await;
        database::migrate(&db_conn).await;

        tokio::fs::create_dir_all(&self.media.root)
            .await
            .unwrap_or_else(|err| {
                tracing::error!("{}", err);
                panic!("Failed to create media directory {:?}", self.media.root)
            });

        Context {
            app: AppContext {
                host: self.app.host,
                port: self.app.port,
                total_on_page: self.app.total_on_page,
            },
            db_conn,
            media: MediaContext {
                root: self.media.root,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-wide, so everything env-driven lives in this one
    // test to avoid ordering races with other tests.
    #[test]
    fn config_reads_pool_and_page_sizes_from_env() {
        env::set_var("DATABASE_URL", "postgres://localhost/adboard_test");
        env::set_var("DATABASE_POOL_SIZE", "9");
        env::set_var("TOTAL_ON_PAGE", "7");

        let config = Config::default();
        assert_eq!(config.database.max_connections, 9);
        assert_eq!(config.app.total_on_page, 7);

        env::remove_var("DATABASE_POOL_SIZE");
        env::remove_var("TOTAL_ON_PAGE");

        let config = Config::default();
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.app.total_on_page, 5);
    }
}
