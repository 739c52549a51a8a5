//! Domain model and operation inputs.
//!
//! # Design
//! Outputs are immutable value objects built fresh from each response; the
//! wire quirks (space-joined tags, "yes"/"no" flags, two timestamp formats)
//! are resolved by the decoder before these types are constructed. Inputs
//! for operations with several optional parameters are plain structs with a
//! `Default`, so callers only spell out what they set.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Number of posts `posts/recent` returns when no count is given.
pub const DEFAULT_RECENT_COUNT: u32 = 15;

/// A saved link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub href: String,
    pub description: String,
    pub extended: String,
    pub hash: String,
    pub meta: String,
    pub time: DateTime<Utc>,
    pub shared: bool,
    pub toread: bool,
    pub tags: Vec<String>,
}

/// Bare list of bookmarks, as returned by `posts/all`.
pub type PostList = Vec<Bookmark>;

/// Wrapped list of bookmarks, as returned by `posts/get` and `posts/recent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsResult {
    pub user: Option<String>,
    pub date: DateTime<Utc>,
    pub posts: Vec<Bookmark>,
}

/// Bookmarks per day for a tag filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateCounts {
    /// The tag filter as echoed by the server (space-separated).
    pub tag: String,
    pub user: String,
    /// Date label to number of bookmarks. Labels are passed through verbatim.
    pub dates: HashMap<String, u64>,
}

impl DateCounts {
    pub fn tags(&self) -> Vec<String> {
        split_tags(&self.tag)
    }
}

/// Tag label to usage count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCloud(HashMap<String, u64>);

impl TagCloud {
    pub fn new(counts: HashMap<String, u64>) -> Self {
        Self(counts)
    }

    pub fn count(&self, tag: &str) -> Option<u64> {
        self.0.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(tag, count)| (tag.as_str(), *count))
    }

    pub fn into_inner(self) -> HashMap<String, u64> {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSuggestion {
    pub recommended: Vec<String>,
    pub popular: Vec<String>,
}

/// A note. `notes/list` and `notes/{id}` return the same structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub length: u64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesIndex {
    pub count: u64,
    pub notes: Vec<Note>,
}

/// Filters for `posts/all`. `results: None` means unbounded.
#[derive(Debug, Clone, Default)]
pub struct AllPostsQuery {
    pub tags: Vec<String>,
    pub start: u32,
    pub results: Option<u32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AllPostsQuery {
    pub fn tagged<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Filters for `posts/get`. With no filter the server returns the most
/// recent day's bookmarks.
#[derive(Debug, Clone, Default)]
pub struct GetPostsQuery {
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub dt: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct RecentPostsQuery {
    pub tags: Vec<String>,
    pub count: u32,
}

impl Default for RecentPostsQuery {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            count: DEFAULT_RECENT_COUNT,
        }
    }
}

/// Payload for `posts/add`.
#[derive(Debug, Clone)]
pub struct AddPost {
    pub href: String,
    pub description: String,
    pub extended: String,
    pub tags: Vec<String>,
    pub time: DateTime<Utc>,
    pub replace: bool,
    pub shared: bool,
    pub toread: bool,
}

impl From<&Bookmark> for AddPost {
    fn from(bookmark: &Bookmark) -> Self {
        Self {
            href: bookmark.href.clone(),
            description: bookmark.description.clone(),
            extended: bookmark.extended.clone(),
            tags: bookmark.tags.clone(),
            time: bookmark.time,
            replace: true,
            shared: bookmark.shared,
            toread: bookmark.toread,
        }
    }
}

/// Split a space-separated tag string. Runs of whitespace never produce
/// empty tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

pub fn join_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_empty_or_blank_yields_no_tags() {
        assert!(split_tags("").is_empty());
        assert!(split_tags("   ").is_empty());
    }

    #[test]
    fn split_normalizes_irregular_whitespace() {
        assert_eq!(split_tags("  rust   cli "), vec!["rust", "cli"]);
        assert_eq!(join_tags(&split_tags("  rust   cli ")), "rust cli");
    }

    #[test]
    fn join_then_split_roundtrips() {
        let tags = vec!["pbctest".to_string(), "pbctest2".to_string(), "twis".to_string()];
        assert_eq!(split_tags(&join_tags(&tags)), tags);
        let none: Vec<String> = Vec::new();
        assert_eq!(split_tags(&join_tags(&none)), none);
    }

    mod tag_roundtrip {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn join_then_split_roundtrips_any_tags(
                tags in proptest::collection::vec("[a-z0-9]{1,12}", 0..10)
            ) {
                prop_assert_eq!(split_tags(&join_tags(&tags)), tags);
            }

            #[test]
            fn split_never_yields_empty_tags(raw in "[a-z0-9 \t]{0,40}") {
                prop_assert!(split_tags(&raw).iter().all(|tag| !tag.is_empty()));
            }
        }
    }

    #[test]
    fn recent_query_defaults_to_fifteen() {
        assert_eq!(RecentPostsQuery::default().count, 15);
    }

    #[test]
    fn all_posts_query_defaults_are_unbounded() {
        let query = AllPostsQuery::tagged(["twis"]);
        assert_eq!(query.tags, vec!["twis"]);
        assert_eq!(query.start, 0);
        assert!(query.results.is_none());
        assert!(query.from.is_none() && query.to.is_none());
    }

    #[test]
    fn add_post_from_bookmark_replaces() {
        let bookmark = Bookmark {
            href: "http://garfield.com".into(),
            description: "description".into(),
            extended: "extended".into(),
            hash: "hash".into(),
            meta: "meta".into(),
            time: DateTime::from_timestamp(1_502_871_671, 0).unwrap(),
            shared: true,
            toread: false,
            tags: vec!["pbctest".into()],
        };
        let post = AddPost::from(&bookmark);
        assert!(post.replace);
        assert_eq!(post.href, bookmark.href);
        assert_eq!(post.tags, bookmark.tags);
        assert_eq!(post.time, bookmark.time);
    }

    #[test]
    fn date_counts_splits_echoed_tag() {
        let counts = DateCounts {
            tag: "twis cats".into(),
            user: "starbuxman".into(),
            dates: HashMap::new(),
        };
        assert_eq!(counts.tags(), vec!["twis", "cats"]);
    }
}
