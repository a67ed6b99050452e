use serde::Serialize;
use sqlx::PgPool;

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
}

pub enum Error {
    UnexpectedError,
}

/// Looks a location up by its name, creating it when absent. `name` is the
/// natural key; the upsert returns the existing row untouched on conflict.
pub async fn get_or_create(pool: &PgPool, name: &str) -> Result<Location, Error> {
    sqlx::query_as::<_, Location>(
        "
        INSERT INTO locations (name)
        VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING *
        ",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to get or create location {}: {}",
            name,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn find_names_by_user_id(pool: &PgPool, user_id: i64) -> Result<Vec<String>, Error> {
    sqlx::query_scalar::<_, String>(
        "
        SELECT l.name
        FROM locations l
        JOIN user_locations ul ON ul.location_id = l.id
        WHERE ul.user_id = $1
        ORDER BY l.id
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while fetching locations for user {}: {}",
            user_id,
            err
        );
        Error::UnexpectedError
    })
}
