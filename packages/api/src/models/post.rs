//! # Post payloads and response normalisation
//!
//! Servers behind this client have shipped more than one shape for a post:
//!
//! ```json
//! {"id":1,"title":"T","content":"C","memberId":4,"memberName":"Kim","createdAt":"2024-03-01T10:20:30"}
//! {"id":1,"title":"T","content":"C","author":{"id":4,"name":"Kim"},"createdAt":"2024-03-01T10:20:30Z"}
//! ```
//!
//! [`PostResponse`] accepts both (and `body` in place of `content`) and
//! converts into the single [`store::Post`]. A post with no author in either
//! form is rejected, since ownership checks depend on it. So is a post whose
//! title or body is blank; a `Post` always has both.
//!
//! Timestamps are RFC 3339, or a zone-less local timestamp that is read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use store::{Page, Post};

/// Title and content sent on create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Prefill an edit form from an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self::new(post.title.clone(), post.body.clone())
    }

    /// Both fields are required.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("Content is required".to_string());
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
struct AuthorResponse {
    id: i64,
    #[serde(default)]
    name: String,
}

/// A post as the server sends it.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    id: i64,
    title: String,
    #[serde(alias = "body")]
    content: String,
    #[serde(default)]
    member_id: Option<i64>,
    #[serde(default)]
    member_name: Option<String>,
    #[serde(default)]
    author: Option<AuthorResponse>,
    created_at: String,
}

impl TryFrom<PostResponse> for Post {
    type Error = String;

    fn try_from(wire: PostResponse) -> Result<Self, Self::Error> {
        let (author_id, author_name) = match (wire.member_id, wire.author) {
            (Some(id), _) => (id, wire.member_name.unwrap_or_default()),
            (None, Some(author)) => (author.id, author.name),
            (None, None) => return Err(format!("post {} has no author", wire.id)),
        };
        if wire.title.trim().is_empty() || wire.content.trim().is_empty() {
            return Err(format!("post {} has a blank title or body", wire.id));
        }
        let created_at = parse_timestamp(&wire.created_at).ok_or_else(|| {
            format!(
                "post {} has unreadable createdAt {:?}",
                wire.id, wire.created_at
            )
        })?;

        Ok(Post {
            id: wire.id,
            title: wire.title,
            body: wire.content,
            author_id,
            author_name,
            created_at,
        })
    }
}

/// Parse RFC 3339, falling back to a zone-less timestamp taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// One page of posts as the server sends it.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    content: Vec<PostResponse>,
    total_pages: u32,
    #[serde(default)]
    total_elements: u64,
    /// Zero-based page index; absent on some servers.
    #[serde(default)]
    number: Option<u32>,
    #[serde(default)]
    size: Option<u32>,
}

impl PageResponse {
    /// Normalise against the index and size that were requested.
    pub fn into_page(self, requested_index: u32, requested_size: u32) -> Result<Page<Post>, String> {
        let items = self
            .content
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let page_index = self.number.unwrap_or(requested_index);
        let page_size = self.size.filter(|s| *s > 0).unwrap_or(requested_size);

        Page::new(
            items,
            page_index,
            page_size,
            self.total_pages,
            self.total_elements,
        )
        .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_flat_member_shape() {
        let wire: PostResponse = serde_json::from_str(
            r#"{"id":1,"title":"T","content":"C","memberId":4,"memberName":"Kim","createdAt":"2024-03-01T10:20:30.123"}"#,
        )
        .unwrap();
        let post = Post::try_from(wire).unwrap();
        assert_eq!(post.author_id, 4);
        assert_eq!(post.author_name, "Kim");
        assert_eq!(post.body, "C");
        assert_eq!(post.created_at.hour(), 10);
    }

    #[test]
    fn test_nested_author_shape() {
        let wire: PostResponse = serde_json::from_str(
            r#"{"id":2,"title":"T","body":"B","author":{"id":9,"name":"Lee"},"createdAt":"2024-03-01T10:20:30+09:00"}"#,
        )
        .unwrap();
        let post = Post::try_from(wire).unwrap();
        assert_eq!(post.author_id, 9);
        assert_eq!(post.author_name, "Lee");
        assert_eq!(post.body, "B");
        // Offset is folded into UTC
        assert_eq!(post.created_at.hour(), 1);
    }

    #[test]
    fn test_post_without_author_is_rejected() {
        let wire: PostResponse = serde_json::from_str(
            r#"{"id":3,"title":"T","content":"C","createdAt":"2024-03-01T10:20:30Z"}"#,
        )
        .unwrap();
        assert!(Post::try_from(wire).is_err());
    }

    #[test]
    fn test_blank_title_or_body_is_rejected() {
        for body in [
            r#"{"id":4,"title":" ","content":"C","memberId":1,"createdAt":"2024-03-01T10:20:30Z"}"#,
            r#"{"id":5,"title":"T","body":"","memberId":1,"createdAt":"2024-03-01T10:20:30Z"}"#,
        ] {
            let wire: PostResponse = serde_json::from_str(body).unwrap();
            assert!(Post::try_from(wire).unwrap_err().contains("blank"));
        }
    }

    #[test]
    fn test_timestamp_formats() {
        let plain = parse_timestamp("2023-12-31T23:59:59").unwrap();
        assert_eq!(plain.year(), 2023);
        assert!(parse_timestamp("2023-12-31T23:59:59.5Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_page_uses_requested_index_when_missing() {
        let wire: PageResponse =
            serde_json::from_str(r#"{"content":[],"totalPages":3,"totalElements":21}"#).unwrap();
        let page = wire.into_page(3, 10).unwrap();
        assert_eq!(page.page_index, 3);
        assert_eq!(page.page_size, 10);
        assert!(page.is_out_of_range());
    }

    #[test]
    fn test_oversized_page_is_rejected() {
        let post = r#"{"id":1,"title":"T","content":"C","memberId":1,"createdAt":"2024-01-01T00:00:00"}"#;
        let body = format!(r#"{{"content":[{post},{post}],"totalPages":1,"size":1}}"#);
        let wire: PageResponse = serde_json::from_str(&body).unwrap();
        assert!(wire.into_page(0, 1).is_err());
    }

    #[test]
    fn test_draft_validation() {
        assert!(PostDraft::new("T", "C").validate().is_ok());
        assert!(PostDraft::new("  ", "C").validate().is_err());
        assert!(PostDraft::new("T", "").validate().is_err());
    }
}
