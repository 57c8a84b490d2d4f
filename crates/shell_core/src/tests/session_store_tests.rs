use std::collections::HashMap;

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::{config::Settings, session_store::SessionStore};

async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn store_for(base: &str) -> SessionStore {
    SessionStore::new(&Settings {
        user_info_url: format!("{base}/api/user_info"),
        table_data_url: format!("{base}/api/table"),
    })
}

#[tokio::test]
async fn fetch_user_commits_the_decoded_data_object() {
    let router = Router::new().route(
        "/api/user_info",
        get(|| async { Json(json!({"data": {"username": "alice", "id": 7}})) }),
    );
    let base = spawn_server(router).await;
    let store = store_for(&base);

    let user = store.fetch_user().await.expect("fetch user");
    assert_eq!(user.get("username"), Some(&json!("alice")));
    assert_eq!(store.user().await, user);
}

#[tokio::test]
async fn fetch_user_defaults_to_empty_object_when_data_is_absent() {
    let router = Router::new().route(
        "/api/user_info",
        get(|| async { Json(json!({"result": true})) }),
    );
    let base = spawn_server(router).await;
    let store = store_for(&base);

    let user = store.fetch_user().await.expect("fetch user");
    assert!(user.is_empty());
    assert!(store.user().await.is_empty());
}

#[tokio::test]
async fn fetch_user_failure_leaves_the_store_unchanged() {
    let router = Router::new().route(
        "/api/user_info",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = spawn_server(router).await;
    let store = store_for(&base);

    let mut seeded = crate::session_store::UserInfo::new();
    seeded.insert("username".into(), json!("bob"));
    store.update_user(&seeded).await;

    store
        .fetch_user()
        .await
        .expect_err("server error must propagate");
    assert_eq!(store.user().await, seeded);
}

#[tokio::test]
async fn update_user_replaces_wholesale_with_a_defensive_copy() {
    let store = store_for("http://127.0.0.1:0");

    let mut first = crate::session_store::UserInfo::new();
    first.insert("username".into(), json!("alice"));
    first.insert("role".into(), json!("admin"));
    store.update_user(&first).await;

    // Mutating the caller's map after the call must not reach the store.
    first.insert("role".into(), json!("guest"));
    assert_eq!(store.user().await.get("role"), Some(&json!("admin")));

    // A later update replaces the object wholesale, not by merge.
    let mut second = crate::session_store::UserInfo::new();
    second.insert("username".into(), json!("carol"));
    store.update_user(&second).await;
    let user = store.user().await;
    assert_eq!(user.get("username"), Some(&json!("carol")));
    assert!(user.get("role").is_none());
}

#[tokio::test]
async fn fetch_table_data_sends_params_as_query_string() {
    let router = Router::new().route(
        "/api/table",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!({"data": params}))
        }),
    );
    let base = spawn_server(router).await;
    let store = store_for(&base);

    #[derive(Serialize)]
    struct TableQuery<'a> {
        page: u32,
        keyword: &'a str,
    }

    let body = store
        .fetch_table_data(&TableQuery {
            page: 3,
            keyword: "resource",
        })
        .await
        .expect("fetch table data");

    assert_eq!(body, json!({"data": {"page": "3", "keyword": "resource"}}));
}
