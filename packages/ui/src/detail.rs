use std::cell::{Cell, RefCell};
use std::rc::Rc;

use api::{ApiError, ApiResult, HttpTransport, ResourceClient};
use store::{KeyValueStore, Post, Session};

use crate::ownership;
use crate::scope::ViewScope;

#[derive(Clone, Debug, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(Post),
    NotFound,
    Failed(ApiError),
    /// The post was deleted from this view; navigate away.
    Deleted,
}

/// State of the single-post screen.
///
/// Follows the same rules as [`crate::PaginatedList`]: the newest `load`
/// wins and nothing is written after [`close`](PostDetail::close).
pub struct PostDetail<S: KeyValueStore, T: HttpTransport> {
    client: ResourceClient<S, T>,
    state: Rc<RefCell<DetailState>>,
    latest_ticket: Rc<Cell<u64>>,
    scope: ViewScope,
}

impl<S: KeyValueStore, T: HttpTransport> Clone for PostDetail<S, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            state: Rc::clone(&self.state),
            latest_ticket: Rc::clone(&self.latest_ticket),
            scope: self.scope.clone(),
        }
    }
}

impl<S: KeyValueStore, T: HttpTransport> PostDetail<S, T> {
    pub fn new(client: ResourceClient<S, T>) -> Self {
        Self {
            client,
            state: Rc::new(RefCell::new(DetailState::Loading)),
            latest_ticket: Rc::new(Cell::new(0)),
            scope: ViewScope::new(),
        }
    }

    pub fn state(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn post(&self) -> Option<Post> {
        match &*self.state.borrow() {
            DetailState::Loaded(post) => Some(post.clone()),
            _ => None,
        }
    }

    pub async fn load(&self, id: i64) {
        if !self.scope.is_alive() {
            return;
        }
        let ticket = self.latest_ticket.get() + 1;
        self.latest_ticket.set(ticket);
        self.state.replace(DetailState::Loading);

        let result = self.client.get(id).await;
        if !self.scope.is_alive() || self.latest_ticket.get() != ticket {
            tracing::debug!("Dropping stale response for post {}", id);
            return;
        }

        let next = match result {
            Ok(post) => DetailState::Loaded(post),
            Err(ApiError::NotFound) => DetailState::NotFound,
            Err(err) => {
                tracing::warn!("Failed to load post {}: {}", id, err);
                DetailState::Failed(err)
            }
        };
        self.state.replace(next);
    }

    /// Delete the loaded post. On failure the post stays on screen.
    pub async fn delete(&self) -> ApiResult<()> {
        let Some(post) = self.post() else {
            return Err(ApiError::validation("No post is loaded"));
        };
        self.client.remove(post.id).await?;
        if self.scope.is_alive() {
            self.state.replace(DetailState::Deleted);
        }
        Ok(())
    }

    /// Whether edit and delete controls should be offered to `session`.
    pub fn can_modify(&self, session: &Session) -> bool {
        match &*self.state.borrow() {
            DetailState::Loaded(post) => ownership::can_modify(session.identity(), post),
            _ => false,
        }
    }

    pub fn close(&self) {
        self.scope.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::testing::FakeBackend;
    use api::{Credentials, SessionStore};
    use store::MemoryStore;

    async fn setup() -> (FakeBackend, ResourceClient<MemoryStore, FakeBackend>, i64, i64) {
        let backend = FakeBackend::new();
        let alice = backend.add_member("a@b.com", "secret1", "Alice");
        let carol = backend.add_member("c@d.com", "secret2", "Carol");
        let mine = backend.seed_post(alice, "Mine", "a");
        let theirs = backend.seed_post(carol, "Theirs", "b");

        let session = SessionStore::open(MemoryStore::new(), backend.clone()).await;
        session
            .login(&Credentials::new("a@b.com", "secret1"))
            .await
            .unwrap();
        (backend, ResourceClient::new(session), mine, theirs)
    }

    #[tokio::test]
    async fn test_owner_can_delete() {
        let (backend, client, mine, _) = setup().await;
        let session = client.session().clone();
        let detail = PostDetail::new(client);

        detail.load(mine).await;
        assert!(detail.can_modify(&session.current()));

        detail.delete().await.unwrap();
        assert_eq!(detail.state(), DetailState::Deleted);
        assert_eq!(backend.post_count(), 1);
    }

    #[tokio::test]
    async fn test_other_authors_post_is_read_only() {
        let (_, client, _, theirs) = setup().await;
        let session = client.session().clone();
        let detail = PostDetail::new(client);

        detail.load(theirs).await;
        assert_eq!(detail.post().map(|p| p.author_name), Some("Carol".to_string()));
        assert!(!detail.can_modify(&session.current()));
        assert!(!detail.can_modify(&Session::Anonymous));
    }

    #[tokio::test]
    async fn test_missing_post() {
        let (_, client, _, _) = setup().await;
        let detail = PostDetail::new(client);

        detail.load(1234).await;
        assert_eq!(detail.state(), DetailState::NotFound);
        assert!(detail.delete().await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_closed_view_ignores_late_response() {
        let (_, client, mine, _) = setup().await;
        let detail = PostDetail::new(client);
        let closer = detail.clone();

        futures::join!(detail.load(mine), async { closer.close() });
        assert_eq!(detail.state(), DetailState::Loading);
    }
}
