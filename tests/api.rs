//! End-to-end checks against a running instance. Start the server with a
//! scratch database, then run `cargo test -- --ignored`.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

fn base_url() -> String {
    std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn healthcheck_reports_ok() {
    let client = Client::new();

    let response = client
        .get(format!("{}/healthcheck/", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn category_lifecycle_round_trip() {
    let client = Client::new();

    let created = client
        .post(format!("{}/categories/", base_url()))
        .json(&json!({ "name": "Electronics" }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Electronics");

    let fetched = client
        .get(format!("{}/categories/{}/", base_url(), id))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let deleted = client
        .delete(format!("{}/categories/{}/", base_url(), id))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(deleted, json!({ "status": "ok/delete" }));

    let gone = client
        .get(format!("{}/categories/{}/", base_url(), id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn deleting_a_missing_category_still_answers_ok_delete() {
    let client = Client::new();

    let response = client
        .delete(format!("{}/categories/999999/", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body, json!({ "status": "ok/delete" }));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn creating_an_ad_with_unknown_author_is_not_found() {
    let client = Client::new();

    let response = client
        .post(format!("{}/ads/", base_url()))
        .json(&json!({
            "name": "Bike",
            "author_id": 999999,
            "price": 120.0,
            "description": "Barely used",
            "is_published": false,
            "category_id": 999999,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(body, json!({ "error": "Author not found" }));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn duplicate_location_names_attach_once() {
    let client = Client::new();

    let created = client
        .post(format!("{}/users/", base_url()))
        .json(&json!({
            "user_name": "jdoe",
            "password": "hunter2",
            "first_name": "John",
            "last_name": "Doe",
            "role": "member",
            "age": 30,
            "locations": ["Moscow", "Moscow"],
        }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();

    assert_eq!(created["location"], json!(["Moscow"]));
    assert!(created.get("password").is_none());
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn updating_a_user_extends_locations_without_replacing() {
    let client = Client::new();

    let created = client
        .post(format!("{}/users/", base_url()))
        .json(&json!({
            "user_name": "asmith",
            "password": "hunter2",
            "first_name": "Anna",
            "last_name": "Smith",
            "role": "member",
            "age": 27,
            "locations": ["Moscow"],
        }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["location"], json!(["Moscow"]));

    let updated = client
        .patch(format!("{}/users/{}/", base_url(), id))
        .json(&json!({
            "user_name": "asmith",
            "password": "hunter2",
            "first_name": "Anna",
            "last_name": "Smith",
            "age": 28,
            "locations": ["Kazan"],
        }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();

    assert_eq!(updated["location"], json!(["Moscow", "Kazan"]));
    assert_eq!(updated["age"], 28);
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn updating_an_ad_leaves_is_published_untouched() {
    let client = Client::new();

    let author = client
        .post(format!("{}/users/", base_url()))
        .json(&json!({
            "user_name": "seller",
            "password": "hunter2",
            "first_name": "Sam",
            "last_name": "Seller",
            "role": "member",
            "age": 40,
            "locations": [],
        }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let author_id = author["id"].as_i64().unwrap();

    let category = client
        .post(format!("{}/categories/", base_url()))
        .json(&json!({ "name": "Vehicles" }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let category_id = category["id"].as_i64().unwrap();

    let created = client
        .post(format!("{}/ads/", base_url()))
        .json(&json!({
            "name": "Bike",
            "author_id": author_id,
            "price": 120.0,
            "description": "Barely used",
            "is_published": true,
            "category_id": category_id,
        }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let ad_id = created["id"].as_i64().unwrap();
    assert_eq!(created["is_published"], json!(true));

    let updated = client
        .patch(format!("{}/ads/{}/", base_url(), ad_id))
        .json(&json!({
            "name": "Bike",
            "author_id": author_id,
            "price": 99.5,
            "description": "Price drop",
            "category_id": category_id,
        }))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(updated["is_published"], json!(true));
    assert_eq!(updated["price"], json!(99.5));

    let fetched = client
        .get(format!("{}/ads/{}/", base_url(), ad_id))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    assert_eq!(fetched["is_published"], json!(true));
}

#[tokio::test]
#[ignore = "requires a running server and database"]
async fn ads_list_is_paginated_and_ordered_by_price() {
    let client = Client::new();

    let page = client
        .get(format!("{}/ads/?page=1", base_url()))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();

    let items = page["items"].as_array().unwrap();
    let prices: Vec<f64> = items
        .iter()
        .map(|item| item["price"].as_f64().unwrap())
        .collect();
    let mut sorted = prices.clone();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert_eq!(prices, sorted);

    assert!(page["num_page"].as_u64().unwrap() >= 1);
    assert!(page["total"].as_u64().unwrap() >= items.len() as u64);
}
