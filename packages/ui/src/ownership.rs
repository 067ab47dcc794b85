//! Who may edit or delete what.
//!
//! Decides whether edit and delete controls are offered. The server enforces
//! ownership on its own; a `true` here only means the request is worth
//! sending.

use store::{Identity, Post};

/// A resource with a single owning member.
pub trait Authored {
    fn author_id(&self) -> i64;
}

impl Authored for Post {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// True iff someone is signed in and wrote `resource`.
pub fn can_modify<R: Authored + ?Sized>(identity: Option<&Identity>, resource: &R) -> bool {
    identity.is_some_and(|me| me.id == resource.author_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owned(i64);

    impl Authored for Owned {
        fn author_id(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn test_can_modify_truth_table() {
        let me = Identity::new(7, "Kim", "kim@example.com");
        let other = Identity::new(8, "Lee", "lee@example.com");

        assert!(can_modify(Some(&me), &Owned(7)));
        assert!(!can_modify(Some(&other), &Owned(7)));
        assert!(!can_modify(None, &Owned(7)));
    }
}
