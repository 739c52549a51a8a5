//! Response decoding, one function per response shape.
//!
//! # Design
//! The facade picks the decoder for the operation it just ran; bodies are
//! never sniffed to guess their shape. Each decoder first deserializes into a
//! private wire struct that mirrors the JSON as sent (string timestamps,
//! "yes"/"no" flags, space-joined tags) and then converts field by field into
//! the domain model. A wrong shape fails in the first step
//! (`DeserializationError`); a bad field value fails in the second
//! (`Format`).

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::date::{decode_bookmark_time, decode_note_time};
use crate::error::ApiError;
use crate::types::{
    split_tags, Bookmark, DateCounts, Note, NotesIndex, PostList, PostsResult, TagCloud,
    TagSuggestion,
};

/// Literal the service uses in `status` to acknowledge a mutation.
const STATUS_DONE: &str = "done";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YesNo {
    Yes,
    No,
}

impl YesNo {
    fn parse(field: &'static str, value: &str) -> Result<Self, ApiError> {
        match value {
            "yes" => Ok(YesNo::Yes),
            "no" => Ok(YesNo::No),
            other => Err(ApiError::format(field, other)),
        }
    }
}

impl From<YesNo> for bool {
    fn from(value: YesNo) -> Self {
        value == YesNo::Yes
    }
}

#[derive(Deserialize)]
struct WireBookmark {
    href: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    extended: String,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    meta: String,
    time: String,
    shared: String,
    toread: String,
    #[serde(default)]
    tags: String,
}

impl TryFrom<WireBookmark> for Bookmark {
    type Error = ApiError;

    fn try_from(wire: WireBookmark) -> Result<Self, Self::Error> {
        Ok(Bookmark {
            time: decode_bookmark_time("time", &wire.time)?,
            shared: YesNo::parse("shared", &wire.shared)?.into(),
            toread: YesNo::parse("toread", &wire.toread)?.into(),
            tags: split_tags(&wire.tags),
            href: wire.href,
            description: wire.description,
            extended: wire.extended,
            hash: wire.hash,
            meta: wire.meta,
        })
    }
}

fn bookmarks(items: Vec<Value>) -> Result<Vec<Bookmark>, ApiError> {
    items
        .into_iter()
        .map(|item| Bookmark::try_from(from_object::<WireBookmark>("bookmark", item)?))
        .collect()
}

#[derive(Deserialize)]
struct WirePosts {
    user: Option<String>,
    date: String,
    posts: Vec<Value>,
}

#[derive(Deserialize)]
struct WireDates {
    tag: String,
    user: String,
    dates: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct WireSuggestion {
    recommended: Option<Vec<String>>,
    popular: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct WireNote {
    id: String,
    #[serde(default)]
    title: String,
    length: Value,
    created_at: String,
    updated_at: String,
    #[serde(default)]
    hash: String,
}

impl TryFrom<WireNote> for Note {
    type Error = ApiError;

    fn try_from(wire: WireNote) -> Result<Self, Self::Error> {
        Ok(Note {
            length: count_value("length", &wire.length)?,
            created: decode_note_time("created_at", &wire.created_at)?,
            updated: decode_note_time("updated_at", &wire.updated_at)?,
            id: wire.id,
            title: wire.title,
            hash: wire.hash,
        })
    }
}

#[derive(Deserialize)]
struct WireNotes {
    count: Value,
    notes: Vec<Value>,
}

#[derive(Deserialize)]
struct WireStatus {
    status: String,
}

#[derive(Deserialize)]
struct WireResult {
    result: String,
}

#[derive(Deserialize)]
struct WireUpdate {
    update_time: String,
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserialize a wire struct from `value`, which must be a JSON object.
/// Derived struct visitors also take a sequence of fields, which the service
/// never sends.
fn from_object<T: DeserializeOwned>(what: &str, value: Value) -> Result<T, ApiError> {
    if !value.is_object() {
        return Err(ApiError::DeserializationError(format!(
            "expected {what} object, got {}",
            kind(&value)
        )));
    }
    Ok(serde_json::from_value(value)?)
}

fn parse_object<T: DeserializeOwned>(what: &str, body: &str) -> Result<T, ApiError> {
    from_object(what, serde_json::from_str(body)?)
}

fn parse_array(what: &str, body: &str) -> Result<Vec<Value>, ApiError> {
    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ApiError::DeserializationError(format!(
            "expected {what} array, got {}",
            kind(&other)
        ))),
    }
}

/// Counts arrive as JSON integers or, from some endpoints, numeric strings.
fn count_value(field: &'static str, value: &Value) -> Result<u64, ApiError> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| ApiError::format(field, value.to_string()))
}

fn counts(field: &'static str, raw: HashMap<String, Value>) -> Result<HashMap<String, u64>, ApiError> {
    raw.into_iter()
        .map(|(key, value)| Ok((key, count_value(field, &value)?)))
        .collect()
}

/// `posts/all`: a bare array of bookmarks.
pub fn post_list(body: &str) -> Result<PostList, ApiError> {
    bookmarks(parse_array("bookmark list", body)?)
}

/// `posts/get`, `posts/recent`: `{"user", "date", "posts": [...]}`.
pub fn posts_result(body: &str) -> Result<PostsResult, ApiError> {
    let wire: WirePosts = parse_object("posts", body)?;
    Ok(PostsResult {
        user: wire.user,
        date: decode_bookmark_time("date", &wire.date)?,
        posts: bookmarks(wire.posts)?,
    })
}

/// `posts/dates`: `{"tag", "user", "dates": {label: count}}`.
pub fn date_counts(body: &str) -> Result<DateCounts, ApiError> {
    let wire: WireDates = parse_object("dates", body)?;
    Ok(DateCounts {
        tag: wire.tag,
        user: wire.user,
        dates: counts("dates", wire.dates)?,
    })
}

/// `tags/get`: the top-level object is the tag to count map.
pub fn tag_cloud(body: &str) -> Result<TagCloud, ApiError> {
    let raw: HashMap<String, Value> = parse_object("tag cloud", body)?;
    Ok(TagCloud::new(counts("tag count", raw)?))
}

/// `posts/suggest`: `[{"recommended": [...]}, {"popular": [...]}]`.
///
/// The array must have exactly two elements. They are matched by key, not
/// position; a missing key leaves that list empty.
pub fn tag_suggestion(body: &str) -> Result<TagSuggestion, ApiError> {
    let slots = parse_array("suggestion", body)?;
    if slots.len() != 2 {
        return Err(ApiError::DeserializationError(format!(
            "expected 2 suggestion slots, got {}",
            slots.len()
        )));
    }
    let mut suggestion = TagSuggestion::default();
    for slot in slots {
        let slot: WireSuggestion = from_object("suggestion", slot)?;
        suggestion.recommended.extend(slot.recommended.unwrap_or_default());
        suggestion.popular.extend(slot.popular.unwrap_or_default());
    }
    Ok(suggestion)
}

/// `notes/list`: `{"count", "notes": [...]}`.
pub fn notes_index(body: &str) -> Result<NotesIndex, ApiError> {
    let wire: WireNotes = parse_object("notes", body)?;
    Ok(NotesIndex {
        count: count_value("count", &wire.count)?,
        notes: wire
            .notes
            .into_iter()
            .map(|item| Note::try_from(from_object::<WireNote>("note", item)?))
            .collect::<Result<_, _>>()?,
    })
}

/// `notes/{id}`: the top-level object is the note.
pub fn note(body: &str) -> Result<Note, ApiError> {
    let wire: WireNote = parse_object("note", body)?;
    Note::try_from(wire)
}

/// Status-style acknowledgement: `{"status": "done"}` is success, any other
/// string is a refusal. A missing field is a decode failure.
pub fn status(body: &str) -> Result<bool, ApiError> {
    let wire: WireStatus = parse_object("status", body)?;
    Ok(wire.status == STATUS_DONE)
}

/// Result-style payload: `{"result": "<value>"}` with a non-blank value.
pub fn result(body: &str) -> Result<String, ApiError> {
    let wire: WireResult = parse_object("result", body)?;
    if wire.result.trim().is_empty() {
        return Err(ApiError::DeserializationError("blank `result`".to_string()));
    }
    Ok(wire.result)
}

/// `posts/update`: `{"update_time": "<bookmark timestamp>"}`.
pub fn update_time(body: &str) -> Result<chrono::DateTime<chrono::Utc>, ApiError> {
    let wire: WireUpdate = parse_object("update", body)?;
    decode_bookmark_time("update_time", &wire.update_time)
}
