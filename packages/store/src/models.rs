//! # Domain models for sessions, members and blog posts
//!
//! Defines the data structures the rest of the workspace passes around once a
//! response has been normalised by the `api` crate. These types are
//! `Serialize + Deserialize` so the identity can be persisted between runs and
//! so views can cache them freely.
//!
//! ## Types
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`Identity`] | The signed-in member: numeric id, display name and email. |
//! | [`Session`] | Either anonymous or a bearer token paired with its [`Identity`]. The enum makes "identity present iff token present" the only representable state. |
//! | [`Post`] | A blog post as the remote system owns it. Views hold read-only copies. |
//! | [`Page`] | One window of a collection plus pagination metadata, rebuilt on every fetch. |
//!
//! ## Invariants
//!
//! [`Page::new`] refuses a zero page size and more items than the page size.
//! A page whose index lies past the last page is still constructible, since a
//! server legitimately returns one after the last item of the last page is
//! deleted; [`Page::is_out_of_range`] lets callers detect it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    pub name: String,
}

impl Identity {
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Get display name, falling back to email if name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// The client's record of being authenticated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated { token: String, identity: Identity },
}

impl Session {
    pub fn authenticated(token: impl Into<String>, identity: Identity) -> Self {
        Session::Authenticated {
            token: token.into(),
            identity,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { token, .. } => Some(token),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { identity, .. } => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }
}

/// A blog post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author_id: i64,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

/// Why a [`Page`] could not be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageError {
    ZeroPageSize,
    TooManyItems { items: usize, page_size: u32 },
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::ZeroPageSize => write!(f, "page size must be positive"),
            PageError::TooManyItems { items, page_size } => {
                write!(f, "{items} items do not fit a page of {page_size}")
            }
        }
    }
}

impl std::error::Error for PageError {}

/// One windowed slice of a collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based.
    pub page_index: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(
        items: Vec<T>,
        page_index: u32,
        page_size: u32,
        total_pages: u32,
        total_elements: u64,
    ) -> Result<Self, PageError> {
        if page_size == 0 {
            return Err(PageError::ZeroPageSize);
        }
        if items.len() > page_size as usize {
            return Err(PageError::TooManyItems {
                items: items.len(),
                page_size,
            });
        }
        Ok(Self {
            items,
            page_index,
            page_size,
            total_pages,
            total_elements,
        })
    }

    /// True when the index points past the last page of a non-empty collection.
    pub fn is_out_of_range(&self) -> bool {
        self.total_pages > 0 && self.page_index >= self.total_pages
    }

    /// Index of the last page, or `None` for an empty collection.
    pub fn last_page_index(&self) -> Option<u32> {
        self.total_pages.checked_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email() {
        let named = Identity::new(1, "Alice", "a@b.com");
        assert_eq!(named.display_name(), "Alice");

        let unnamed = Identity::new(2, "  ", "c@d.com");
        assert_eq!(unnamed.display_name(), "c@d.com");
    }

    #[test]
    fn test_session_accessors() {
        let anon = Session::default();
        assert!(anon.token().is_none());
        assert!(anon.identity().is_none());
        assert!(!anon.is_authenticated());

        let session = Session::authenticated("tok", Identity::new(7, "Bo", "bo@x.io"));
        assert_eq!(session.token(), Some("tok"));
        assert_eq!(session.identity().map(|i| i.id), Some(7));
    }

    #[test]
    fn test_page_rejects_bad_shapes() {
        assert_eq!(
            Page::<u8>::new(vec![], 0, 0, 0, 0),
            Err(PageError::ZeroPageSize)
        );
        assert_eq!(
            Page::new(vec![1, 2, 3], 0, 2, 2, 3),
            Err(PageError::TooManyItems {
                items: 3,
                page_size: 2
            })
        );
    }

    #[test]
    fn test_page_out_of_range() {
        // Index 2 of a two-page collection: what a server returns after the
        // only item of the last page is deleted.
        let page = Page::<u8>::new(vec![], 2, 10, 2, 20).unwrap();
        assert!(page.is_out_of_range());
        assert_eq!(page.last_page_index(), Some(1));

        let empty = Page::<u8>::new(vec![], 0, 10, 0, 0).unwrap();
        assert!(!empty.is_out_of_range());
        assert_eq!(empty.last_page_index(), None);
    }
}
