//! # Paginated list view state
//!
//! [`PaginatedList`] drives one list screen: it fetches a page from a
//! [`ListSource`], tracks the load state, refetches after mutations and
//! recovers when the current page disappears.
//!
//! ## Ordering
//!
//! Every fetch takes a ticket. A response is applied only if its ticket is
//! still the newest one issued, so clicking page 2 and then page 3 always ends
//! on page 3 whichever response lands first.
//!
//! ## Out-of-range pages
//!
//! If a fetch comes back with `page_index >= total_pages` (the last item of
//! the last page was deleted, say) the controller asks for the last page that
//! still exists instead of showing an empty one.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use api::{ApiError, ApiResult, Collection, HttpTransport, PostDraft, ResourceClient};
use store::{KeyValueStore, Page, Post};

use crate::scope::ViewScope;

/// Bound on consecutive out-of-range redirects for one navigation.
const MAX_RECOVERY_HOPS: u32 = 3;

/// Where a [`PaginatedList`] gets its pages and sends its mutations.
pub trait ListSource {
    type Item: Clone;
    type Mutation;

    fn fetch(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> impl Future<Output = ApiResult<Page<Self::Item>>>;

    fn mutate(&self, mutation: Self::Mutation) -> impl Future<Output = ApiResult<()>>;
}

/// A change to the blog collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostMutation {
    Create(PostDraft),
    Update(i64, PostDraft),
    Delete(i64),
}

/// Posts of one [`Collection`], read through a [`ResourceClient`].
pub struct PostList<S: KeyValueStore, T: HttpTransport> {
    client: ResourceClient<S, T>,
    collection: Collection,
}

impl<S: KeyValueStore, T: HttpTransport> PostList<S, T> {
    pub fn new(client: ResourceClient<S, T>, collection: Collection) -> Self {
        Self { client, collection }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }
}

impl<S: KeyValueStore, T: HttpTransport> ListSource for PostList<S, T> {
    type Item = Post;
    type Mutation = PostMutation;

    async fn fetch(&self, page_index: u32, page_size: u32) -> ApiResult<Page<Post>> {
        self.client
            .list(&self.collection, page_index, page_size)
            .await
    }

    async fn mutate(&self, mutation: PostMutation) -> ApiResult<()> {
        match mutation {
            PostMutation::Create(draft) => self.client.create(&draft).await.map(|_| ()),
            PostMutation::Update(id, draft) => self.client.update(id, &draft).await.map(|_| ()),
            PostMutation::Delete(id) => self.client.remove(id).await,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListState<T> {
    Idle,
    Loading,
    Loaded(Page<T>),
    Failed(ApiError),
}

impl<T> ListState<T> {
    pub fn page(&self) -> Option<&Page<T>> {
        match self {
            ListState::Loaded(page) => Some(page),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }
}

struct ListInner<L: ListSource> {
    source: L,
    page_size: u32,
    state: RefCell<ListState<L::Item>>,
    page_index: Cell<u32>,
    latest_ticket: Cell<u64>,
    scope: ViewScope,
}

/// Paginated view over a [`ListSource`]. Clones share state.
pub struct PaginatedList<L: ListSource> {
    inner: Rc<ListInner<L>>,
}

impl<L: ListSource> Clone for PaginatedList<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<L: ListSource> PaginatedList<L> {
    pub fn new(source: L, page_size: u32) -> Self {
        Self {
            inner: Rc::new(ListInner {
                source,
                page_size: page_size.max(1),
                state: RefCell::new(ListState::Idle),
                page_index: Cell::new(0),
                latest_ticket: Cell::new(0),
                scope: ViewScope::new(),
            }),
        }
    }

    pub fn state(&self) -> ListState<L::Item> {
        self.inner.state.borrow().clone()
    }

    /// Index of the page most recently requested or shown.
    pub fn current_page_index(&self) -> u32 {
        self.inner.page_index.get()
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    pub fn source(&self) -> &L {
        &self.inner.source
    }

    pub fn is_closed(&self) -> bool {
        !self.inner.scope.is_alive()
    }

    /// Tear down: responses arriving from now on are discarded.
    pub fn close(&self) {
        self.inner.scope.close();
    }

    /// Load page `page_index`, superseding any fetch still in flight.
    pub async fn go_to_page(&self, page_index: u32) {
        let mut target = page_index;
        let mut hops = 0;

        loop {
            let Some(ticket) = self.begin(target) else {
                return;
            };
            let result = self
                .inner
                .source
                .fetch(target, self.inner.page_size)
                .await;
            if !self.is_current(ticket) {
                tracing::debug!("Dropping stale response for page {}", target);
                return;
            }

            match result {
                Ok(page) if page.is_out_of_range() && hops >= MAX_RECOVERY_HOPS => {
                    tracing::warn!(
                        "Page {} still past the end after {} retries",
                        page.page_index,
                        hops
                    );
                    self.inner.state.replace(ListState::Failed(ApiError::unexpected(
                        200,
                        format!(
                            "page {} is past the last page ({} pages)",
                            page.page_index + 1,
                            page.total_pages
                        ),
                    )));
                    return;
                }
                Ok(page) if page.is_out_of_range() => {
                    hops += 1;
                    let last = page.last_page_index().unwrap_or(0);
                    tracing::debug!(
                        "Page {} is past the end ({} pages), moving to {}",
                        page.page_index,
                        page.total_pages,
                        last
                    );
                    target = last;
                }
                Ok(page) => {
                    self.inner.page_index.set(page.page_index);
                    self.inner.state.replace(ListState::Loaded(page));
                    return;
                }
                Err(err) => {
                    tracing::warn!("Failed to load page {}: {}", target, err);
                    self.inner.state.replace(ListState::Failed(err));
                    return;
                }
            }
        }
    }

    /// Refetch the current page.
    pub async fn refresh(&self) {
        self.go_to_page(self.current_page_index()).await;
    }

    /// Apply a mutation, then refetch. On failure the shown page is untouched.
    pub async fn mutate(&self, mutation: L::Mutation) -> ApiResult<()> {
        self.inner.source.mutate(mutation).await?;
        if self.inner.scope.is_alive() {
            self.refresh().await;
        }
        Ok(())
    }

    fn begin(&self, page_index: u32) -> Option<u64> {
        if !self.inner.scope.is_alive() {
            tracing::debug!("List is closed, not fetching page {}", page_index);
            return None;
        }
        let ticket = self.inner.latest_ticket.get() + 1;
        self.inner.latest_ticket.set(ticket);
        self.inner.page_index.set(page_index);
        self.inner.state.replace(ListState::Loading);
        Some(ticket)
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.inner.scope.is_alive() && self.inner.latest_ticket.get() == ticket
    }
}
