use crate::utils::pagination::{PageSlice, Paginated};
use chrono::NaiveDateTime;
use sqlx::PgPool;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Ad {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub price: f64,
    pub description: String,
    pub address: Option<String>,
    pub is_published: bool,
    pub category_id: i64,
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
}

/// An ad joined with its author's first name, as the API reports it.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct AdWithAuthor {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
    pub author: String,
    pub price: f64,
    pub description: String,
    pub address: Option<String>,
    pub is_published: bool,
    pub category_id: i64,
    pub image: Option<String>,
}

impl Ad {
    pub fn with_author(self, author: String) -> AdWithAuthor {
        AdWithAuthor {
            id: self.id,
            name: self.name,
            author_id: self.author_id,
            author,
            price: self.price,
            description: self.description,
            address: self.address,
            is_published: self.is_published,
            category_id: self.category_id,
            image: self.image,
        }
    }
}

pub struct CreateAdPayload {
    pub name: String,
    pub author_id: i64,
    pub price: f64,
    pub description: String,
    pub is_published: bool,
    pub category_id: i64,
}

pub struct UpdateAdPayload {
    pub name: String,
    pub author_id: i64,
    pub price: f64,
    pub description: String,
    pub category_id: i64,
}

pub enum Error {
    UnexpectedError,
}

pub async fn create(pool: &PgPool, payload: CreateAdPayload) -> Result<Ad, Error> {
    sqlx::query_as::<_, Ad>(
        "
        INSERT INTO ads (name, author_id, price, description, is_published, category_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(payload.name)
    .bind(payload.author_id)
    .bind(payload.price)
    .bind(payload.description)
    .bind(payload.is_published)
    .bind(payload.category_id)
    .fetch_one(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create an ad: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id_with_author(pool: &PgPool, id: i64) -> Result<Option<AdWithAuthor>, Error> {
    sqlx::query_as::<_, AdWithAuthor>(
        "
        SELECT
            a.id,
            a.name,
            a.author_id,
            u.first_name AS author,
            a.price,
            a.description,
            a.address,
            a.is_published,
            a.category_id,
            a.image
        FROM ads a
        JOIN users u ON u.id = a.author_id
        WHERE a.id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching ad with id {}: {}", id, err);
        Error::UnexpectedError
    })
}

/// One page of ads ordered by price descending; the count is taken fresh so
/// `total`/`num_page` always reflect the table at request time.
pub async fn find_page(
    pool: &PgPool,
    page: u32,
    per_page: u32,
) -> Result<Paginated<AdWithAuthor>, Error> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ads")
        .fetch_one(pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while counting ads: {}", err);
            Error::UnexpectedError
        })?;

    let slice = PageSlice::new(total, page, per_page);

    let items = sqlx::query_as::<_, AdWithAuthor>(
        "
        SELECT
            a.id,
            a.name,
            a.author_id,
            u.first_name AS author,
            a.price,
            a.description,
            a.address,
            a.is_published,
            a.category_id,
            a.image
        FROM ads a
        JOIN users u ON u.id = a.author_id
        ORDER BY a.price DESC, a.id
        LIMIT $1
        OFFSET $2
        ",
    )
    .bind(slice.limit)
    .bind(slice.offset)
    .fetch_all(pool)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to fetch many ads: {}", err);
        Error::UnexpectedError
    })?;

    Ok(Paginated::new(items, total as u32, slice.num_pages))
}

/// Overwrites the updatable fields; `is_published`, `address` and `image`
/// are left untouched.
pub async fn update_by_id(
    pool: &PgPool,
    id: i64,
    payload: UpdateAdPayload,
) -> Result<Option<Ad>, Error> {
    sqlx::query_as::<_, Ad>(
        "
        UPDATE ads SET
            name = $1,
            author_id = $2,
            price = $3,
            description = $4,
            category_id = $5
        WHERE id = $6
        RETURNING *
        ",
    )
    .bind(payload.name)
    .bind(payload.author_id)
    .bind(payload.price)
    .bind(payload.description)
    .bind(payload.category_id)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to update ad with id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn set_image_by_id(pool: &PgPool, id: i64, image: String) -> Result<Option<Ad>, Error> {
    sqlx::query_as::<_, Ad>(
        "
        UPDATE ads SET image = $1
        WHERE id = $2
        RETURNING *
        ",
    )
    .bind(image)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while trying to set image for ad with id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
}

pub async fn delete_by_id(pool: &PgPool, id: i64) -> Result<(), Error> {
    sqlx::query("DELETE FROM ads WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!(
                "Error occurred while trying to delete ad with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}
