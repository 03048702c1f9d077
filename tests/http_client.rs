//! WordPress client against a fake REST API on loopback
//!
//! The fake is an axum router served from a background thread with its own
//! runtime; the tests themselves stay synchronous like the blocking client.
//!
//! Run with: cargo test --test http_client

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::tempdir;

use wpsync::remote::{ContentSource, WordPressClient, MAX_PAGES, PAGE_SIZE};
use wpsync::{ContentType, SyncConfig, SyncEngine};

type Calls = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// How the fake answers collection requests
#[derive(Clone, Copy)]
enum Listing {
    /// Full pages forever
    Endless,
    /// `n` items, then WordPress' invalid page error
    Finite(usize),
    /// One full page, then a server error
    FailsOnPageTwo,
}

#[derive(Clone)]
struct Fake {
    listing: Listing,
    calls: Calls,
}

fn record(value: i64, slug: String) -> Value {
    json!({
        "id": value,
        "slug": slug,
        "date": "2024-01-15T10:30:00",
        "title": {"rendered": format!("Item {}", value)},
        "content": {"rendered": "<p>Body</p>"},
        "categories": [],
        "tags": [],
        "featured_media": 0,
        "parent": 0,
        "template": ""
    })
}

async fn list_posts(
    State(fake): State<Fake>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.calls.lock().push(query.clone());
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page = PAGE_SIZE as usize;

    match fake.listing {
        Listing::Endless => {
            let items: Vec<Value> = (0..per_page)
                .map(|i| {
                    let id = (page * 1000 + i) as i64;
                    record(id, format!("p-{}-{}", page, i))
                })
                .collect();
            Json(items).into_response()
        }
        Listing::Finite(total) => {
            let start = (page - 1) * per_page;
            if start >= total {
                let body = json!({
                    "code": "rest_post_invalid_page_number",
                    "message": "The page number requested is larger than the number of pages available.",
                    "data": {"status": 400}
                });
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            let items: Vec<Value> = (start..total.min(start + per_page))
                .map(|i| record(i as i64 + 1, format!("post-{}", i + 1)))
                .collect();
            Json(items).into_response()
        }
        Listing::FailsOnPageTwo => {
            if page == 1 {
                let items: Vec<Value> = (1..=per_page as i64)
                    .map(|i| record(i, format!("post-{}", i)))
                    .collect();
                Json(items).into_response()
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
            }
        }
    }
}

async fn single_post(
    Path(id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if id != 7 {
        let body = json!({"code": "rest_post_invalid_id", "data": {"status": 404}});
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }
    if query.get("_fields").map(String::as_str) == Some("categories") {
        return Json(json!({"categories": [3, 4]})).into_response();
    }
    Json(json!({
        "id": 7,
        "slug": "hello-world",
        "date": "2024-01-15T10:30:00",
        "title": {"rendered": "Hello World"},
        "content": {"rendered": "<p>This is <strong>test</strong> content.</p>"},
        "categories": [3, 4],
        "tags": [9],
        "featured_media": 12
    }))
    .into_response()
}

async fn category(Path(id): Path<i64>) -> Response {
    match id {
        3 => Json(json!({"name": "News"})).into_response(),
        4 => Json(json!({"name": "Archived"})).into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"code": "rest_term_invalid"}))).into_response(),
    }
}

async fn no_pages() -> Json<Vec<Value>> {
    Json(Vec::new())
}

/// Serve a fake WordPress; returns the API base URL and the recorded
/// collection queries
fn serve(listing: Listing) -> (String, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/wp-json/wp/v2/posts", get(list_posts))
        .route("/wp-json/wp/v2/posts/:id", get(single_post))
        .route("/wp-json/wp/v2/pages", get(no_pages))
        .route("/wp-json/wp/v2/categories/:id", get(category))
        .with_state(Fake {
            listing,
            calls: calls.clone(),
        });

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    (format!("http://{}/wp-json/wp/v2", addr), calls)
}

fn client(base_url: &str) -> WordPressClient {
    WordPressClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[test]
fn test_listing_is_bounded_at_max_pages() {
    let (url, calls) = serve(Listing::Endless);
    let listing = client(&url).fetch_items(ContentType::Post, None);

    assert_eq!(listing.items.len(), (PAGE_SIZE * MAX_PAGES) as usize);
    assert!(!listing.complete);
    assert_eq!(calls.lock().len(), MAX_PAGES as usize);
}

#[test]
fn test_listing_query_parameters() {
    let (url, calls) = serve(Listing::Finite(5));
    client(&url).fetch_items(ContentType::Post, None);

    let calls = calls.lock();
    let first = &calls[0];
    assert_eq!(first.get("page").map(String::as_str), Some("1"));
    assert_eq!(first.get("per_page").map(String::as_str), Some("100"));
    assert_eq!(first.get("status").map(String::as_str), Some("publish"));
    assert!(!first.contains_key("after"));
}

#[test]
fn test_listing_forwards_after_filter() {
    let (url, calls) = serve(Listing::Finite(5));
    let posts = client(&url).fetch_posts(Some("2024-01-01T00:00:00Z"));

    assert_eq!(posts.len(), 5);
    assert!(calls
        .lock()
        .iter()
        .all(|q| q.get("after").map(String::as_str) == Some("2024-01-01T00:00:00Z")));
}

#[test]
fn test_invalid_page_error_ends_listing_cleanly() {
    let (url, calls) = serve(Listing::Finite(250));
    let listing = client(&url).fetch_items(ContentType::Post, None);

    assert_eq!(listing.items.len(), 250);
    assert!(listing.complete);
    // The short third page ends the listing
    assert_eq!(calls.lock().len(), 3);
}

#[test]
fn test_invalid_page_error_after_full_page_ends_listing_cleanly() {
    let (url, calls) = serve(Listing::Finite(200));
    let listing = client(&url).fetch_items(ContentType::Post, None);

    assert_eq!(listing.items.len(), 200);
    assert!(listing.complete);
    assert_eq!(calls.lock().len(), 3);
}

#[test]
fn test_short_page_at_cap_is_complete() {
    let (url, calls) = serve(Listing::Finite(950));
    let listing = client(&url).fetch_items(ContentType::Post, None);

    assert_eq!(listing.items.len(), 950);
    assert!(listing.complete);
    assert_eq!(calls.lock().len(), MAX_PAGES as usize);
}

#[test]
fn test_server_error_keeps_partial_listing() {
    let (url, _calls) = serve(Listing::FailsOnPageTwo);
    let listing = client(&url).fetch_items(ContentType::Post, None);

    assert_eq!(listing.items.len(), PAGE_SIZE as usize);
    assert_eq!(listing.items[0].slug, "post-1");
    assert!(!listing.complete);
}

#[test]
fn test_decodes_wire_sentinels() {
    let (url, _calls) = serve(Listing::Finite(1));
    let posts = client(&url).fetch_posts(None);

    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(post.title, "Item 1");
    assert_eq!(post.html_content, "<p>Body</p>");
    assert_eq!(post.featured_media_id, None);
    assert_eq!(post.parent_id, None);
    assert_eq!(post.template_name, None);
}

#[test]
fn test_fetch_single() {
    let (url, _calls) = serve(Listing::Finite(0));
    let client = client(&url);

    let post = client.fetch_single(7).unwrap();
    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.title, "Hello World");
    assert_eq!(post.category_ids, vec![3, 4]);
    assert_eq!(post.tag_ids, vec![9]);
    assert_eq!(post.featured_media_id, Some(12));

    assert!(client.fetch_single(8).is_none());
}

#[test]
fn test_category_lookups() {
    let (url, _calls) = serve(Listing::Finite(0));
    let client = client(&url);

    assert_eq!(client.fetch_category_ids_for_post(7), vec![3, 4]);
    assert!(client.fetch_category_ids_for_post(8).is_empty());

    assert_eq!(client.fetch_category_name(4).as_deref(), Some("Archived"));
    assert_eq!(client.fetch_category_name(99), None);
    assert_eq!(client.fetch_category_name(0), None);
}

#[test]
fn test_unreachable_server_degrades_to_empty() {
    // Reserve a port, then close it
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = WordPressClient::new(
        format!("http://{}/wp-json/wp/v2", addr),
        Duration::from_secs(1),
    )
    .unwrap();

    let listing = client.fetch_items(ContentType::Page, None);
    assert!(listing.items.is_empty());
    assert!(!listing.complete);
    assert!(client.fetch_single(1).is_none());
    assert!(client.fetch_category_ids_for_post(1).is_empty());
    assert!(client.fetch_category_name(1).is_none());
}

#[test]
fn test_single_sync_end_to_end() {
    let (url, _calls) = serve(Listing::Finite(0));
    let dir = tempdir().unwrap();
    let config = SyncConfig {
        api_url: url,
        posts_dir: dir.path().join("content/posts"),
        pages_dir: dir.path().join("content/pages"),
        state_file: dir.path().join(".last-sync"),
        ..SyncConfig::default()
    };

    let mut engine = SyncEngine::from_config(&config).unwrap();
    assert!(config.pages_dir.is_dir());
    assert_eq!(engine.sync_single(7), 1);

    let written = std::fs::read_to_string(config.posts_dir.join("hello-world.md")).unwrap();
    assert_eq!(
        written,
        "---\n\
         title: \"Hello World\"\n\
         date: \"2024-01-15T10:30:00Z\"\n\
         draft: false\n\
         slug: \"hello-world\"\n\
         categories:\n  - 3\n  - 4\n\
         tags:\n  - 9\n\
         featured_image: \"/images/featured/hello-world.jpg\"\n\
         archived: true\n\
         ---\n\n\
         This is **test** content.\n"
    );
}
