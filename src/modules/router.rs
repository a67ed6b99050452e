use super::{ad, category, health, user};
use crate::types::Context;
use axum::Router;
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .nest("/ads", ad::routes::get_router())
        .nest("/categories", category::routes::get_router())
        .nest("/users", user::routes::get_router())
        .nest("/healthcheck", health::routes::get_router())
}
