use sqlx::{postgres::PgPoolOptions, PgPool};

#[derive(Clone)]
pub struct DatabaseConnection {
    pub pool: PgPool,
}

pub async fn connect(database_url: &str, max_connections: u32) -> DatabaseConnection {
    DatabaseConnection {
        pool: PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await
            .unwrap_or_else(|err| {
                tracing::error!("{}", err);
                // The URL can carry credentials, so it stays out of the panic.
                panic!("Could not connect to the database")
            }),
    }
}

pub async fn migrate(db_conn: &DatabaseConnection) {
    if let Err(err) = sqlx::migrate!().run(&db_conn.pool).await {
        tracing::error!("{}", err);
        panic!("Could not apply database migrations");
    }
}
