use super::repository;
use super::repository::{User, UserWithStats};
use crate::{
    modules::location,
    types::Context,
    utils::pagination::Pagination,
};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct CreateUserPayload {
    user_name: String,
    password: String,
    first_name: String,
    last_name: String,
    role: String,
    age: i32,
    locations: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserPayload {
    user_name: String,
    password: String,
    first_name: String,
    last_name: String,
    age: i32,
    locations: Vec<String>,
}

fn user_json(user: &User, locations: &[String]) -> Value {
    json!({
        "id": user.id,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "user_name": user.user_name,
        "role": user.role,
        "age": user.age,
        "location": locations,
    })
}

fn user_list_json(user: &UserWithStats) -> Value {
    json!({
        "id": user.id,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "user_name": user.user_name,
        "age": user.age,
        "role": user.role,
        "location": user.locations,
        "total_ads": user.total_ads,
    })
}

// Get-or-create every named location and attach it to the user. Duplicate
// names resolve to the same row, so each ends up attached exactly once.
async fn attach_locations(
    pool: &PgPool,
    user_id: i64,
    names: &[String],
) -> Result<(), location::repository::Error> {
    for name in names {
        let loc = location::repository::get_or_create(pool, name).await?;
        repository::attach_location(pool, user_id, loc.id)
            .await
            .map_err(|_| location::repository::Error::UnexpectedError)?;
    }

    Ok(())
}

async fn list_users(State(ctx): State<Arc<Context>>, pagination: Pagination) -> impl IntoResponse {
    match repository::find_page(&ctx.db_conn.pool, pagination.page, ctx.app.total_on_page).await {
        Ok(page) => (
            StatusCode::OK,
            Json(json!(page.map(|user| user_list_json(&user)))),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch users" })),
        ),
    }
}

async fn get_user_by_id(State(ctx): State<Arc<Context>>, Path(id): Path<i64>) -> Response {
    let user = match repository::find_by_id(&ctx.db_conn.pool, id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "User not found" })),
            )
                .into_response()
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch user" })),
            )
                .into_response()
        }
    };

    match location::repository::find_names_by_user_id(&ctx.db_conn.pool, id).await {
        Ok(locations) => (StatusCode::OK, Json(user_json(&user, &locations))).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch user locations" })),
        )
            .into_response(),
    }
}

async fn create_user(
    State(ctx): State<Arc<Context>>,
    Json(payload): Json<CreateUserPayload>,
) -> Response {
    let pool = &ctx.db_conn.pool;

    let user = match repository::create(
        pool,
        repository::CreateUserPayload {
            user_name: payload.user_name,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            role: payload.role,
            age: payload.age,
        },
    )
    .await
    {
        Ok(user) => user,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "User creation failed" })),
            )
                .into_response()
        }
    };

    if attach_locations(pool, user.id, &payload.locations).await.is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to resolve locations" })),
        )
            .into_response();
    }

    match location::repository::find_names_by_user_id(pool, user.id).await {
        Ok(locations) => (StatusCode::CREATED, Json(user_json(&user, &locations))).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch user locations" })),
        )
            .into_response(),
    }
}

async fn update_user_by_id(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserPayload>,
) -> Response {
    let pool = &ctx.db_conn.pool;

    let user = match repository::update_by_id(
        pool,
        id,
        repository::UpdateUserPayload {
            user_name: payload.user_name,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            age: payload.age,
        },
    )
    .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "User not found" })),
            )
                .into_response()
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to update user" })),
            )
                .into_response()
        }
    };

    // Names from the body extend the user's location set; existing
    // attachments are never removed here.
    if attach_locations(pool, user.id, &payload.locations).await.is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to resolve locations" })),
        )
            .into_response();
    }

    match location::repository::find_names_by_user_id(pool, user.id).await {
        Ok(locations) => (StatusCode::OK, Json(user_json(&user, &locations))).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch user locations" })),
        )
            .into_response(),
    }
}

async fn delete_user_by_id(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match repository::delete_by_id(&ctx.db_conn.pool, id).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok/delete" }))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete user" })),
        ),
    }
}

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/:id",
            get(get_user_by_id)
                .patch(update_user_by_id)
                .delete(delete_user_by_id),
        )
}
