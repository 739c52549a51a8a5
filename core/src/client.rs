//! Request builder, response parser and blocking facade for the Pinboard API.
//!
//! # Design
//! `PinboardClient` holds the auth token, the base URL and a transport, none
//! of which change after construction. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; the facade methods (`all_posts`,
//! `add_post`, ...) chain the two through the transport. Callers that run
//! their own I/O can use the build/parse pairs and never touch `Transport`.

use chrono::{DateTime, Utc};
use log::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::decode;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::query::{require, validate_tags, Endpoint, Query};
use crate::types::{
    AddPost, AllPostsQuery, DateCounts, GetPostsQuery, Note, NotesIndex, PostList, PostsResult,
    RecentPostsQuery, TagCloud, TagSuggestion,
};

/// Synchronous client for the Pinboard API.
#[derive(Clone)]
pub struct PinboardClient<T = UreqTransport> {
    token: String,
    base_url: String,
    transport: T,
}

impl<T> std::fmt::Debug for PinboardClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinboardClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PinboardClient<UreqTransport> {
    /// Client over the default ureq transport.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T> PinboardClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            token: config.token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn query(&self, endpoint: Endpoint) -> Query {
        Query::new(endpoint, &self.token)
    }

    fn request(&self, query: Query) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/{}", self.base_url, query.render()),
        }
    }

    pub fn build_all_posts(&self, query: &AllPostsQuery) -> Result<HttpRequest, ApiError> {
        validate_tags(&query.tags)?;
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(ApiError::InvalidRequest(format!("`fromdt` {from} is after `todt` {to}")));
            }
        }
        let results = query.results.map_or(-1, i64::from);
        Ok(self.request(
            self.query(Endpoint::PostsAll)
                .param("meta", 0)
                .param("start", query.start)
                .param("results", results)
                .tags("tag", &query.tags)
                .date("fromdt", query.from.as_ref())
                .date("todt", query.to.as_ref()),
        ))
    }

    pub fn build_get_posts(&self, query: &GetPostsQuery) -> Result<HttpRequest, ApiError> {
        validate_tags(&query.tags)?;
        Ok(self.request(
            self.query(Endpoint::PostsGet)
                .optional("url", query.url.as_deref())
                .tags("tag", &query.tags)
                .date("dt", query.dt.as_ref()),
        ))
    }

    pub fn build_recent_posts(&self, query: &RecentPostsQuery) -> Result<HttpRequest, ApiError> {
        validate_tags(&query.tags)?;
        Ok(self.request(
            self.query(Endpoint::PostsRecent)
                .param("count", query.count)
                .tags("tag", &query.tags),
        ))
    }

    pub fn build_add_post(&self, post: &AddPost) -> Result<HttpRequest, ApiError> {
        let href = require("url", &post.href)?;
        let description = require("description", &post.description)?;
        validate_tags(&post.tags)?;
        let extended = Some(post.extended.as_str()).filter(|extended| !extended.is_empty());
        Ok(self.request(
            self.query(Endpoint::PostsAdd)
                .param("url", href)
                .param("description", description)
                .optional("extended", extended)
                .tags("tags", &post.tags)
                .date("dt", Some(&post.time))
                .flag("replace", post.replace)
                .flag("shared", post.shared)
                .flag("toread", post.toread),
        ))
    }

    pub fn build_delete_post(&self, href: &str) -> Result<HttpRequest, ApiError> {
        let href = require("url", href)?;
        Ok(self.request(self.query(Endpoint::PostsDelete).param("url", href)))
    }

    pub fn build_post_dates<S: AsRef<str>>(&self, tags: &[S]) -> Result<HttpRequest, ApiError> {
        validate_tags(tags)?;
        Ok(self.request(self.query(Endpoint::PostsDates).tags("tag", tags)))
    }

    pub fn build_suggest_tags(&self, url: &str) -> Result<HttpRequest, ApiError> {
        let url = require("url", url)?;
        Ok(self.request(self.query(Endpoint::PostsSuggest).param("url", url)))
    }

    pub fn build_last_update(&self) -> HttpRequest {
        self.request(self.query(Endpoint::PostsUpdate))
    }

    pub fn build_tags(&self) -> HttpRequest {
        self.request(self.query(Endpoint::TagsGet))
    }

    pub fn build_delete_tag(&self, tag: &str) -> Result<HttpRequest, ApiError> {
        let tag = require("tag", tag)?;
        Ok(self.request(self.query(Endpoint::TagsDelete).param("tag", tag)))
    }

    pub fn build_rename_tag(&self, old: &str, new: &str) -> Result<HttpRequest, ApiError> {
        let old = require("old", old)?;
        let new = require("new", new)?;
        validate_tags(&[new])?;
        Ok(self.request(
            self.query(Endpoint::TagsRename)
                .param("old", old)
                .param("new", new),
        ))
    }

    pub fn build_user_secret(&self) -> HttpRequest {
        self.request(self.query(Endpoint::UserSecret))
    }

    pub fn build_api_token(&self) -> HttpRequest {
        self.request(self.query(Endpoint::UserApiToken))
    }

    pub fn build_notes(&self) -> HttpRequest {
        self.request(self.query(Endpoint::NotesList))
    }

    pub fn build_note(&self, id: &str) -> Result<HttpRequest, ApiError> {
        let id = require("id", id)?;
        Ok(self.request(self.query(Endpoint::Note(id.to_string()))))
    }

    /// Decodes a `posts/all` response, keeping at most `query.results`
    /// bookmarks.
    pub fn parse_all_posts(&self, query: &AllPostsQuery, response: HttpResponse) -> Result<PostList, ApiError> {
        let mut posts = decode_body(response, decode::post_list)?;
        if let Some(limit) = query.results {
            posts.truncate(limit as usize);
        }
        Ok(posts)
    }

    /// Decodes `posts/get` and `posts/recent` responses.
    pub fn parse_posts(&self, response: HttpResponse) -> Result<PostsResult, ApiError> {
        decode_body(response, decode::posts_result)
    }

    pub fn parse_post_dates(&self, response: HttpResponse) -> Result<DateCounts, ApiError> {
        decode_body(response, decode::date_counts)
    }

    pub fn parse_suggest_tags(&self, response: HttpResponse) -> Result<TagSuggestion, ApiError> {
        decode_body(response, decode::tag_suggestion)
    }

    pub fn parse_last_update(&self, response: HttpResponse) -> Result<DateTime<Utc>, ApiError> {
        decode_body(response, decode::update_time)
    }

    pub fn parse_tags(&self, response: HttpResponse) -> Result<TagCloud, ApiError> {
        decode_body(response, decode::tag_cloud)
    }

    /// Decodes the `{"status": ...}` acknowledgement of `posts/add`,
    /// `posts/delete`, `tags/delete` and `tags/rename`.
    pub fn parse_status(&self, response: HttpResponse) -> Result<bool, ApiError> {
        decode_body(response, decode::status)
    }

    /// Decodes the `{"result": ...}` payload of `user/secret` and
    /// `user/api_token`.
    pub fn parse_result(&self, response: HttpResponse) -> Result<String, ApiError> {
        decode_body(response, decode::result)
    }

    pub fn parse_notes(&self, response: HttpResponse) -> Result<NotesIndex, ApiError> {
        decode_body(response, decode::notes_index)
    }

    pub fn parse_note(&self, response: HttpResponse) -> Result<Note, ApiError> {
        decode_body(response, decode::note)
    }
}

impl<T: Transport> PinboardClient<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        // Log the path only; the query string carries the token.
        let path = request.url.split('?').next().unwrap_or_default();
        debug!("GET {path}");
        let response = self.transport.send(&request)?;
        trace!("{path} -> {}", response.status);
        Ok(response)
    }

    /// Every bookmark matching `query`. Unbounded unless `results` is set.
    pub fn all_posts(&self, query: &AllPostsQuery) -> Result<PostList, ApiError> {
        let response = self.execute(self.build_all_posts(query)?)?;
        self.parse_all_posts(query, response)
    }

    pub fn get_posts(&self, query: &GetPostsQuery) -> Result<PostsResult, ApiError> {
        let response = self.execute(self.build_get_posts(query)?)?;
        self.parse_posts(response)
    }

    pub fn recent_posts(&self, query: &RecentPostsQuery) -> Result<PostsResult, ApiError> {
        let response = self.execute(self.build_recent_posts(query)?)?;
        self.parse_posts(response)
    }

    /// Returns whether the service acknowledged the bookmark with `done`.
    pub fn add_post(&self, post: &AddPost) -> Result<bool, ApiError> {
        let response = self.execute(self.build_add_post(post)?)?;
        self.parse_status(response)
    }

    pub fn delete_post(&self, href: &str) -> Result<bool, ApiError> {
        let response = self.execute(self.build_delete_post(href)?)?;
        self.parse_status(response)
    }

    pub fn post_dates<S: AsRef<str>>(&self, tags: &[S]) -> Result<DateCounts, ApiError> {
        let response = self.execute(self.build_post_dates(tags)?)?;
        self.parse_post_dates(response)
    }

    pub fn suggest_tags(&self, url: &str) -> Result<TagSuggestion, ApiError> {
        let response = self.execute(self.build_suggest_tags(url)?)?;
        self.parse_suggest_tags(response)
    }

    /// When any bookmark was last added, changed or deleted.
    pub fn last_update(&self) -> Result<DateTime<Utc>, ApiError> {
        let response = self.execute(self.build_last_update())?;
        self.parse_last_update(response)
    }

    pub fn tags(&self) -> Result<TagCloud, ApiError> {
        let response = self.execute(self.build_tags())?;
        self.parse_tags(response)
    }

    pub fn delete_tag(&self, tag: &str) -> Result<bool, ApiError> {
        let response = self.execute(self.build_delete_tag(tag)?)?;
        self.parse_status(response)
    }

    pub fn rename_tag(&self, old: &str, new: &str) -> Result<bool, ApiError> {
        let response = self.execute(self.build_rename_tag(old, new)?)?;
        self.parse_status(response)
    }

    pub fn user_secret(&self) -> Result<String, ApiError> {
        let response = self.execute(self.build_user_secret())?;
        self.parse_result(response)
    }

    pub fn api_token(&self) -> Result<String, ApiError> {
        let response = self.execute(self.build_api_token())?;
        self.parse_result(response)
    }

    pub fn notes(&self) -> Result<NotesIndex, ApiError> {
        let response = self.execute(self.build_notes())?;
        self.parse_notes(response)
    }

    pub fn note(&self, id: &str) -> Result<Note, ApiError> {
        let response = self.execute(self.build_note(id)?)?;
        self.parse_note(response)
    }
}

/// Map non-2xx status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode_body<R>(
    response: HttpResponse,
    decoder: fn(&str) -> Result<R, ApiError>,
) -> Result<R, ApiError> {
    check_status(&response)?;
    decoder(&response.body).inspect_err(|err| warn!("can't decode response: {err}"))
}
