//! # ResourceClient — typed access to the blog and member endpoints
//!
//! One method per operation. Each reads the token from the [`SessionStore`]
//! immediately before dispatch, never caching it between calls, so a login
//! or logout that happens while other requests are in flight is picked up by
//! the next request.
//!
//! ## Endpoints
//!
//! | Method | Request |
//! |--------|---------|
//! | [`list`](ResourceClient::list) | `GET /blogs?page&size` or `GET /blogs/member/{id}?page&size` |
//! | [`get`](ResourceClient::get) | `GET /blogs/{id}` |
//! | [`create`](ResourceClient::create) | `POST /blogs` |
//! | [`update`](ResourceClient::update) | `PUT /blogs/{id}` |
//! | [`remove`](ResourceClient::remove) | `DELETE /blogs/{id}` |
//! | [`signup`](ResourceClient::signup) | `POST /members/signup` |
//! | [`member_name`](ResourceClient::member_name) | `GET /members/{id}` |
//!
//! ## Errors
//!
//! Non-success responses go through [`ApiError::from_response`]. An
//! [`ApiError::Auth`] caused by a token we sent also invalidates that session.
//! Mutations without a session fail with [`ApiError::Auth`] and local
//! validation failures with [`ApiError::Validation`], both without touching
//! the network. Nothing is retried.

use serde::de::DeserializeOwned;
use store::{KeyValueStore, Page, Post};

use crate::error::{ApiError, ApiResult};
use crate::models::{MemberProfile, PageResponse, PostDraft, PostResponse, SignupForm};
use crate::session::SessionStore;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// A paginated set of posts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Every post.
    All,
    /// Posts written by one member.
    Member(i64),
}

impl Collection {
    pub fn path(&self) -> String {
        match self {
            Collection::All => "/blogs".to_string(),
            Collection::Member(id) => format!("/blogs/member/{id}"),
        }
    }
}

/// Typed client over the blog REST API.
pub struct ResourceClient<S: KeyValueStore, T: HttpTransport> {
    session: SessionStore<S, T>,
}

impl<S: KeyValueStore, T: HttpTransport> Clone for ResourceClient<S, T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
        }
    }
}

impl<S: KeyValueStore, T: HttpTransport> ResourceClient<S, T> {
    pub fn new(session: SessionStore<S, T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionStore<S, T> {
        &self.session
    }

    /// Fetch one page of a collection.
    pub async fn list(
        &self,
        collection: &Collection,
        page_index: u32,
        page_size: u32,
    ) -> ApiResult<Page<Post>> {
        if page_size == 0 {
            return Err(ApiError::validation("Page size must be positive"));
        }
        let request = HttpRequest::get(collection.path())
            .query("page", page_index)
            .query("size", page_size);

        let response = self.dispatch(request).await?;
        let wire: PageResponse = decode(&response)?;
        wire.into_page(page_index, page_size)
            .map_err(|e| ApiError::unexpected(response.status, e))
    }

    /// Fetch a single post.
    pub async fn get(&self, id: i64) -> ApiResult<Post> {
        let response = self.dispatch(HttpRequest::get(format!("/blogs/{id}"))).await?;
        decode_post(&response)
    }

    /// Create a post as the signed-in member.
    pub async fn create(&self, draft: &PostDraft) -> ApiResult<Post> {
        self.require_session()?;
        draft.validate().map_err(ApiError::validation)?;

        let request = HttpRequest::post("/blogs").json(draft)?;
        let response = self.dispatch(request).await?;
        let post = decode_post(&response)?;
        tracing::info!("Created post {}", post.id);
        Ok(post)
    }

    /// Replace the title and content of a post.
    pub async fn update(&self, id: i64, draft: &PostDraft) -> ApiResult<Post> {
        self.require_session()?;
        draft.validate().map_err(ApiError::validation)?;

        let request = HttpRequest::put(format!("/blogs/{id}")).json(draft)?;
        let response = self.dispatch(request).await?;
        let post = decode_post(&response)?;
        tracing::info!("Updated post {}", post.id);
        Ok(post)
    }

    /// Delete a post.
    pub async fn remove(&self, id: i64) -> ApiResult<()> {
        self.require_session()?;

        self.dispatch(HttpRequest::delete(format!("/blogs/{id}")))
            .await?;
        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    /// Register a new member. Does not sign in.
    pub async fn signup(&self, form: &SignupForm) -> ApiResult<()> {
        form.validate().map_err(ApiError::validation)?;

        let request = HttpRequest::post("/members/signup").json(&form.request())?;
        self.dispatch(request).await?;
        tracing::info!("Registered {}", form.email.trim());
        Ok(())
    }

    /// Display name of a member, for a member's list heading.
    pub async fn member_name(&self, member_id: i64) -> ApiResult<String> {
        let response = self
            .dispatch(HttpRequest::get(format!("/members/{member_id}")))
            .await?;
        let profile: MemberProfile = decode(&response)?;
        Ok(profile.name)
    }

    fn require_session(&self) -> ApiResult<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::auth("Login required"))
        }
    }

    async fn dispatch(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        // Read the token right before sending; it is never cached.
        let token = self.session.token();
        let request = request.bearer(token.clone());
        tracing::debug!(
            "{} {} ({})",
            request.method.as_str(),
            request.path,
            if token.is_some() { "authenticated" } else { "anonymous" }
        );

        let response = self.session.transport().send(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let err = ApiError::from_response(response.status, &response.body);
        if err.is_auth() {
            if let Some(token) = token {
                self.session.invalidate(&token).await;
            }
        }
        Err(err)
    }
}

fn decode<D: DeserializeOwned>(response: &HttpResponse) -> ApiResult<D> {
    serde_json::from_slice(&response.body).map_err(|e| {
        ApiError::unexpected(response.status, format!("Unreadable response body: {e}"))
    })
}

fn decode_post(response: &HttpResponse) -> ApiResult<Post> {
    let wire: PostResponse = decode(response)?;
    Post::try_from(wire).map_err(|e| ApiError::unexpected(response.status, e))
}
