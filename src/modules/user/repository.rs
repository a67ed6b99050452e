use crate::utils::pagination::{PageSlice, Paginated};
use chrono::NaiveDateTime;
use sqlx::PgPool;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub age: i32,
    pub created_at: NaiveDateTime,
}

/// List projection: a user joined with their ad count and location names.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct UserWithStats {
    pub id: i64,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub age: i32,
    pub total_ads: i64,
    pub locations: Vec<String>,
}

pub struct CreateUserPayload {
    pub user_name: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub age: i32,
}

pub struct UpdateUserPayload {
    pub user_name: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

pub enum Error {
    UnexpectedError,
}

pub async fn create(pool: &PgPool, payload: CreateUserPayload) -> Result<User, Error> {
    sqlx::query_as::<_, User>(
        "
        INSERT INTO users (user_name, password, first_name, last_name, role, age)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(payload.user_name)
    .bind(payload.password)
    .bind(payload.first_name)
    .bind(payload.last_name)
    .bind(payload.role)
    .bind(payload.age)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create a user: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching user with id {}: {}", id, err);
            Error::UnexpectedError
        })
}

pub async fn find_page(
    pool: &PgPool,
    page: u32,
    per_page: u32,
) -> Result<Paginated<UserWithStats>, Error> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while counting users: {}", err);
            Error::UnexpectedError
        })?;

    let slice = PageSlice::new(total, page, per_page);

    let items = sqlx::query_as::<_, UserWithStats>(
        "
        SELECT
            u.id,
            u.user_name,
            u.first_name,
            u.last_name,
            u.role,
            u.age,
            COUNT(DISTINCT a.id) AS total_ads,
            ARRAY_REMOVE(ARRAY_AGG(DISTINCT l.name), NULL) AS locations
        FROM users u
        LEFT JOIN ads a ON a.author_id = u.id
        LEFT JOIN user_locations ul ON ul.user_id = u.id
        LEFT JOIN locations l ON l.id = ul.location_id
        GROUP BY u.id
        ORDER BY u.id
        LIMIT $1
        OFFSET $2
        ",
    )
    .bind(slice.limit)
    .bind(slice.offset)
    .fetch_all(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to fetch many users: {}", err);
        Error::UnexpectedError
    })?;

    Ok(Paginated::new(items, total as u32, slice.num_pages))
}

/// Overwrites the mutable profile fields; `role` and `id` stay as they are.
pub async fn update_by_id(
    pool: &PgPool,
    id: i64,
    payload: UpdateUserPayload,
) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>(
        "
        UPDATE users SET
            user_name = $1,
            password = $2,
            first_name = $3,
            last_name = $4,
            age = $5
        WHERE id = $6
        RETURNING *
        ",
    )
    .bind(payload.user_name)
    .bind(payload.password)
    .bind(payload.first_name)
    .bind(payload.last_name)
    .bind(payload.age)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to update user with id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn delete_by_id(pool: &PgPool, id: i64) -> Result<(), Error> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to delete user with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

/// Attaches a location to a user; attaching the same location twice is a
/// no-op thanks to the composite primary key.
pub async fn attach_location(pool: &PgPool, user_id: i64, location_id: i64) -> Result<(), Error> {
    sqlx::query(
        "
        INSERT INTO user_locations (user_id, location_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(location_id)
    .execute(pool)
    .await
    .map(|_| ())
    .map_err(|err| {
        tracing::error!(
            "Error occurred while attaching location {} to user {}: {}",
            location_id,
            user_id,
            err
        );
        Error::UnexpectedError
    })
}
