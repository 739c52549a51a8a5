use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Note, Post};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "mockuser:1234";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(path: &str, query: &str) -> Request<String> {
    let separator = if query.is_empty() { "" } else { "&" };
    Request::builder()
        .uri(format!("/v1/{path}?auth_token={TOKEN}&format=json{separator}{query}"))
        .body(String::new())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn wrong_token_returns_401() {
    let resp = app(TOKEN)
        .oneshot(
            Request::builder()
                .uri("/v1/tags/get?auth_token=nope&format=json")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_format_returns_400() {
    let resp = app(TOKEN)
        .oneshot(
            Request::builder()
                .uri(format!("/v1/tags/get?auth_token={TOKEN}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- posts ---

#[tokio::test]
async fn all_posts_empty_is_bare_array() {
    let resp = app(TOKEN)
        .oneshot(get("posts/all", "meta=0&results=-1&start=0"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Post> = body_json(resp).await;
    assert!(posts.is_empty());
}

#[tokio::test]
async fn all_posts_bad_results_returns_400() {
    let resp = app(TOKEN)
        .oneshot(get("posts/all", "results=lots"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_without_url_is_refused_in_body() {
    let resp = app(TOKEN)
        .oneshot(get("posts/add", "description=x"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "missing url");
}

#[tokio::test]
async fn delete_unknown_post_is_not_done() {
    let resp = app(TOKEN)
        .oneshot(get("posts/delete", "url=http%3A%2F%2Fnowhere.example"))
        .await
        .unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "item not found");
}

#[tokio::test]
async fn suggest_without_url_returns_400() {
    let resp = app(TOKEN).oneshot(get("posts/suggest", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- user ---

#[tokio::test]
async fn api_token_echoes_token() {
    let resp = app(TOKEN).oneshot(get("user/api_token/", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["result"], TOKEN);
}

#[tokio::test]
async fn secret_is_non_blank() {
    let resp = app(TOKEN).oneshot(get("user/secret", "")).await.unwrap();
    let body: Value = body_json(resp).await;
    assert!(!body["result"].as_str().unwrap().is_empty());
}

// --- notes ---

#[tokio::test]
async fn notes_list_counts_notes() {
    let resp = app(TOKEN).oneshot(get("notes/list", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let notes: Vec<Note> = serde_json::from_value(body["notes"].clone()).unwrap();
    assert_eq!(body["count"], notes.len());
}

#[tokio::test]
async fn unknown_note_returns_404() {
    let resp = app(TOKEN).oneshot(get("notes/missing", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- full lifecycle ---

#[tokio::test]
async fn bookmark_lifecycle() {
    use tower::Service;

    let mut app = app(TOKEN).into_service();

    // add
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(
            "posts/add",
            "url=http%3A%2F%2Fgarfield.com&description=cat&tags=pbctest%20pbctest2\
             &dt=2017-08-16T08%3A21%3A11Z&shared=yes&toread=no",
        ))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "done");

    // adding again without replace is refused
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("posts/add", "url=http%3A%2F%2Fgarfield.com&description=cat&replace=no"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "item already exists");

    // all by tag
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("posts/all", "tag=pbctest"))
        .await
        .unwrap();
    let posts: Vec<Post> = body_json(resp).await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].tags, "pbctest pbctest2");
    assert_eq!(posts[0].time, "2017-08-16T08:21:11Z");

    // get by url is wrapped
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("posts/get", "url=http%3A%2F%2Fgarfield.com"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert!(body["user"].is_string());

    // dates
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("posts/dates", "tag=pbctest"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["dates"]["2017-08-16"], 1);

    // tag cloud is a flat map
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("tags/get", ""))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["pbctest2"], 1);

    // suggestions are a two-slot array
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("posts/suggest", "url=http%3A%2F%2Fgarfield.com"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body[0]["recommended"][0], "pbctest");
    assert!(body[1]["popular"].is_array());

    // delete tag
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("tags/delete", "tag=pbctest2"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "done");

    // delete post
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("posts/delete", "url=http%3A%2F%2Fgarfield.com"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "done");

    // all after delete is empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("posts/all", ""))
        .await
        .unwrap();
    let posts: Vec<Post> = body_json(resp).await;
    assert!(posts.is_empty());
}
