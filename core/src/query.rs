//! Endpoint paths and query-string rendering.
//!
//! Every query carries `auth_token` and `format=json`. Parameters are kept in
//! a `BTreeMap`, so the rendered string is in lexical order by name no matter
//! which order they were added in. Values are percent-encoded once, at render
//! time: a tag list is joined with single spaces first and the joined string
//! is encoded as a whole (`a b` becomes `a%20b`).

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::date::encode_bookmark_time;
use crate::error::ApiError;
use crate::types::join_tags;

/// A remote operation and the path it lives at, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    PostsAll,
    PostsGet,
    PostsRecent,
    PostsAdd,
    PostsDelete,
    PostsDates,
    PostsSuggest,
    PostsUpdate,
    TagsGet,
    TagsDelete,
    TagsRename,
    UserSecret,
    UserApiToken,
    NotesList,
    Note(String),
}

impl Endpoint {
    pub fn path(&self) -> Cow<'static, str> {
        let path = match self {
            Endpoint::PostsAll => "posts/all",
            Endpoint::PostsGet => "posts/get",
            Endpoint::PostsRecent => "posts/recent",
            Endpoint::PostsAdd => "posts/add",
            Endpoint::PostsDelete => "posts/delete",
            Endpoint::PostsDates => "posts/dates",
            Endpoint::PostsSuggest => "posts/suggest",
            Endpoint::PostsUpdate => "posts/update",
            Endpoint::TagsGet => "tags/get",
            Endpoint::TagsDelete => "tags/delete",
            Endpoint::TagsRename => "tags/rename",
            Endpoint::UserSecret => "user/secret",
            // The service registers this one with a trailing slash.
            Endpoint::UserApiToken => "user/api_token/",
            Endpoint::NotesList => "notes/list",
            Endpoint::Note(id) => return Cow::Owned(format!("notes/{}", urlencoding::encode(id))),
        };
        Cow::Borrowed(path)
    }
}

/// Query under construction for one endpoint.
#[derive(Debug, Clone)]
pub struct Query {
    endpoint: Endpoint,
    params: BTreeMap<&'static str, String>,
}

impl Query {
    pub fn new(endpoint: Endpoint, token: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert("auth_token", token.to_string());
        params.insert("format", "json".to_string());
        Self { endpoint, params }
    }

    pub fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.insert(name, value.to_string());
        self
    }

    /// Adds `name` only when `value` is present.
    pub fn optional<V: ToString>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// Adds a space-joined tag list. An empty list is omitted.
    pub fn tags<S: AsRef<str>>(self, name: &'static str, tags: &[S]) -> Self {
        if tags.is_empty() {
            return self;
        }
        let joined = join_tags(tags);
        self.param(name, joined)
    }

    pub fn date(self, name: &'static str, time: Option<&DateTime<Utc>>) -> Self {
        self.optional(name, time.map(encode_bookmark_time))
    }

    pub fn flag(self, name: &'static str, value: bool) -> Self {
        self.param(name, if value { "yes" } else { "no" })
    }

    /// Renders `path?name=value&...` with every value percent-encoded.
    pub fn render(&self) -> String {
        let query = self
            .params
            .iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.endpoint.path())
    }
}

/// Fails with `InvalidRequest` when `value` is empty or whitespace.
pub fn require<'a>(name: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidRequest(format!("`{name}` is required")));
    }
    Ok(value)
}

/// Tags travel space-separated, so a tag may not be empty or contain
/// whitespace.
pub fn validate_tags<S: AsRef<str>>(tags: &[S]) -> Result<(), ApiError> {
    match tags
        .iter()
        .map(AsRef::as_ref)
        .find(|tag| tag.is_empty() || tag.chars().any(char::is_whitespace))
    {
        Some(tag) => Err(ApiError::InvalidRequest(format!("malformed tag {tag:?}"))),
        None => Ok(()),
    }
}
