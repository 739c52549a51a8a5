//! Synchronous client for the Pinboard bookmarking API.
//!
//! # Overview
//! Turns typed calls into the service's query-string requests and maps its
//! inconsistent JSON responses (bare arrays, wrapped objects, flat maps,
//! two-slot arrays) back into one typed model.
//!
//! # Design
//! - `PinboardClient` holds only the token, the base URL and a transport; it
//!   has no mutable state and can be shared across threads when its
//!   transport can.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response). The facade methods chain them through a
//!   `Transport`, `UreqTransport` by default.
//! - Every operation is a GET; outcomes of mutations travel in the body.

pub mod client;
pub mod config;
pub mod date;
pub mod decode;
pub mod error;
pub mod http;
pub mod query;
pub mod types;

pub use client::PinboardClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    AddPost, AllPostsQuery, Bookmark, DateCounts, GetPostsQuery, Note, NotesIndex, PostList,
    PostsResult, RecentPostsQuery, TagCloud, TagSuggestion,
};
