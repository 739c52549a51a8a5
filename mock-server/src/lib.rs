use std::{collections::HashMap, str::FromStr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const USER: &str = "mockuser";

/// A bookmark in wire form: string timestamps, "yes"/"no" flags and
/// space-joined tags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    pub href: String,
    pub description: String,
    pub extended: String,
    pub hash: String,
    pub meta: String,
    pub time: String,
    pub shared: String,
    pub toread: String,
    pub tags: String,
}

impl Post {
    fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.split_whitespace()
    }

    fn has_tags(&self, wanted: &[&str]) -> bool {
        wanted.iter().all(|tag| self.tags().any(|t| t == *tag))
    }

    fn day(&self) -> &str {
        self.time.get(..10).unwrap_or(&self.time)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub length: u64,
    pub created_at: String,
    pub updated_at: String,
    pub hash: String,
}

pub struct Store {
    token: String,
    secret: String,
    posts: Vec<Post>,
    notes: Vec<Note>,
    update_time: String,
}

impl Store {
    pub fn new(token: &str) -> Self {
        let notes = [("Groceries", "milk eggs"), ("Reading list", "rust book")]
            .into_iter()
            .map(|(title, text)| Note {
                id: Uuid::new_v4().simple().to_string(),
                title: title.to_string(),
                length: text.len() as u64,
                created_at: "20170816082111".to_string(),
                updated_at: "20170817093000".to_string(),
                hash: Uuid::new_v4().simple().to_string(),
            })
            .collect();
        Self {
            token: token.to_string(),
            secret: Uuid::new_v4().simple().to_string(),
            posts: Vec::new(),
            notes,
            update_time: now(),
        }
    }

    fn touch(&mut self) {
        self.update_time = now();
    }
}

pub type Db = Arc<RwLock<Store>>;

type Params = HashMap<String, String>;

pub fn app(token: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(token)));
    let api = Router::new()
        .route("/posts/all", get(all_posts))
        .route("/posts/get", get(get_posts))
        .route("/posts/recent", get(recent_posts))
        .route("/posts/add", get(add_post))
        .route("/posts/delete", get(delete_post))
        .route("/posts/dates", get(post_dates))
        .route("/posts/suggest", get(suggest_tags))
        .route("/posts/update", get(last_update))
        .route("/tags/get", get(tags))
        .route("/tags/delete", get(delete_tag))
        .route("/tags/rename", get(rename_tag))
        .route("/user/secret", get(user_secret))
        .route("/user/api_token/", get(api_token))
        .route("/notes/list", get(notes))
        .route("/notes/{id}", get(note))
        .with_state(db);
    Router::new().nest("/v1", api)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

fn now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Every request must carry the configured token and ask for JSON.
fn authorize(store: &Store, params: &Params) -> Result<(), StatusCode> {
    if params.get("auth_token") != Some(&store.token) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if params.get("format").map(String::as_str) != Some("json") {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

fn number<T: FromStr>(params: &Params, key: &str, default: T) -> Result<T, StatusCode> {
    match params.get(key) {
        Some(raw) => raw.parse().map_err(|_| StatusCode::BAD_REQUEST),
        None => Ok(default),
    }
}

fn required<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn tag_filter(params: &Params) -> Vec<&str> {
    params
        .get("tag")
        .map(|raw| raw.split_whitespace().collect())
        .unwrap_or_default()
}

fn status(value: &str) -> Json<Value> {
    Json(json!({ "status": value }))
}

/// Matching posts, newest first.
fn matching<'a>(store: &'a Store, tags: &[&str]) -> Vec<&'a Post> {
    let mut posts: Vec<&Post> = store.posts.iter().filter(|p| p.has_tags(tags)).collect();
    posts.sort_by(|a, b| b.time.cmp(&a.time));
    posts
}

async fn all_posts(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    let start: usize = number(&params, "start", 0)?;
    let results: i64 = number(&params, "results", -1)?;
    // Timestamps share one fixed-width format, so string order is time order.
    let from = params.get("fromdt");
    let to = params.get("todt");
    let posts = matching(&store, &tag_filter(&params))
        .into_iter()
        .filter(|p| from.map_or(true, |from| p.time >= *from))
        .filter(|p| to.map_or(true, |to| p.time <= *to))
        .skip(start)
        .take(usize::try_from(results).unwrap_or(usize::MAX))
        .collect::<Vec<_>>();
    debug!("posts/all -> {} posts", posts.len());
    Ok(Json(json!(posts)))
}

async fn get_posts(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    let mut posts = matching(&store, &tag_filter(&params));
    if let Some(url) = params.get("url") {
        posts.retain(|p| &p.href == url);
    }
    // Without a filter the service answers with the most recent day.
    let day = match params.get("dt") {
        Some(dt) => dt.get(..10).map(str::to_string),
        None if !params.contains_key("url") && !params.contains_key("tag") => {
            posts.first().map(|p| p.day().to_string())
        }
        None => None,
    };
    if let Some(day) = day {
        posts.retain(|p| p.day() == day);
    }
    Ok(Json(json!({ "user": USER, "date": store.update_time, "posts": posts })))
}

async fn recent_posts(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    let count: usize = number(&params, "count", 15)?;
    let posts: Vec<&Post> = matching(&store, &tag_filter(&params))
        .into_iter()
        .take(count.min(100))
        .collect();
    Ok(Json(json!({ "user": USER, "date": store.update_time, "posts": posts })))
}

async fn add_post(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    authorize(&store, &params)?;
    let Some(href) = required(&params, "url") else {
        return Ok(status("missing url"));
    };
    let Some(description) = required(&params, "description") else {
        return Ok(status("missing description"));
    };
    let flag = |key: &str, default: &str| params.get(key).cloned().unwrap_or_else(|| default.to_string());
    let post = Post {
        href: href.to_string(),
        description: description.to_string(),
        extended: flag("extended", ""),
        hash: Uuid::new_v4().simple().to_string(),
        meta: Uuid::new_v4().simple().to_string(),
        time: params.get("dt").cloned().unwrap_or_else(now),
        shared: flag("shared", "yes"),
        toread: flag("toread", "no"),
        tags: params
            .get("tags")
            .map(|raw| raw.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default(),
    };
    match store.posts.iter().position(|p| p.href == post.href) {
        Some(_) if flag("replace", "yes") == "no" => return Ok(status("item already exists")),
        Some(index) => store.posts[index] = post,
        None => store.posts.push(post),
    }
    store.touch();
    Ok(status("done"))
}

async fn delete_post(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    authorize(&store, &params)?;
    let href = required(&params, "url").ok_or(StatusCode::BAD_REQUEST)?;
    let before = store.posts.len();
    store.posts.retain(|p| p.href != href);
    if store.posts.len() == before {
        return Ok(status("item not found"));
    }
    store.touch();
    Ok(status("done"))
}

async fn post_dates(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    let mut dates: HashMap<&str, u64> = HashMap::new();
    for post in matching(&store, &tag_filter(&params)) {
        *dates.entry(post.day()).or_default() += 1;
    }
    let tag = params.get("tag").cloned().unwrap_or_default();
    Ok(Json(json!({ "user": USER, "tag": tag, "dates": dates })))
}

fn tag_counts(store: &Store) -> HashMap<&str, u64> {
    let mut counts = HashMap::new();
    for tag in store.posts.iter().flat_map(Post::tags) {
        *counts.entry(tag).or_default() += 1;
    }
    counts
}

async fn suggest_tags(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    let url = required(&params, "url").ok_or(StatusCode::BAD_REQUEST)?;
    let recommended: Vec<&str> = store
        .posts
        .iter()
        .filter(|p| p.href == url)
        .flat_map(Post::tags)
        .collect();
    let mut popular: Vec<(&str, u64)> = tag_counts(&store).into_iter().collect();
    popular.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    let popular: Vec<&str> = popular.into_iter().take(3).map(|(tag, _)| tag).collect();
    Ok(Json(json!([{ "recommended": recommended }, { "popular": popular }])))
}

async fn last_update(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    Ok(Json(json!({ "update_time": store.update_time })))
}

async fn tags(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    Ok(Json(json!(tag_counts(&store))))
}

fn retag(store: &mut Store, old: &str, new: Option<&str>) {
    for post in &mut store.posts {
        post.tags = post
            .tags()
            .filter_map(|t| if t == old { new } else { Some(t) })
            .collect::<Vec<_>>()
            .join(" ");
    }
    store.touch();
}

async fn delete_tag(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    authorize(&store, &params)?;
    let tag = required(&params, "tag").ok_or(StatusCode::BAD_REQUEST)?;
    retag(&mut store, tag, None);
    Ok(status("done"))
}

async fn rename_tag(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    authorize(&store, &params)?;
    let (Some(old), Some(new)) = (required(&params, "old"), required(&params, "new")) else {
        return Ok(status("rename requires old and new"));
    };
    retag(&mut store, old, Some(new));
    Ok(status("done"))
}

async fn user_secret(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    Ok(Json(json!({ "result": store.secret })))
}

async fn api_token(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    Ok(Json(json!({ "result": store.token })))
}

async fn notes(
    State(db): State<Db>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    Ok(Json(json!({ "count": store.notes.len(), "notes": store.notes })))
}

async fn note(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Note>, StatusCode> {
    let store = db.read().await;
    authorize(&store, &params)?;
    store
        .notes
        .iter()
        .find(|n| n.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
