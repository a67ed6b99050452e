use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

pub enum Error {
    UnexpectedError,
}

pub async fn create(pool: &PgPool, name: String) -> Result<Category, Error> {
    sqlx::query_as::<_, Category>(
        "
        INSERT INTO categories (name)
        VALUES ($1)
        RETURNING *
        ",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create a category: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Category>, Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while fetching category with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Category>, Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while trying to fetch categories: {}", err);
            Error::UnexpectedError
        })
}

pub async fn update_by_id(pool: &PgPool, id: i64, name: String) -> Result<Option<Category>, Error> {
    sqlx::query_as::<_, Category>(
        "
        UPDATE categories SET name = $1
        WHERE id = $2
        RETURNING *
        ",
    )
    .bind(name)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to update category with id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn delete_by_id(pool: &PgPool, id: i64) -> Result<(), Error> {
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to delete category with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}
