//! # API crate — session ownership and typed access to the blog REST API
//!
//! Everything that talks to the server lives here. Frontends hold a
//! [`SessionStore`] for authentication state and a [`ResourceClient`] for
//! posts and members; both run over an [`HttpTransport`], which is
//! [`ReqwestTransport`] in production and [`testing::FakeBackend`] in tests.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`client`] | — | `ResourceClient`: list/get/create/update/remove posts, signup, member lookups |
//! | [`error`] | — | `ApiError` and the status-code classification |
//! | [`models`] | — | Request payloads, response shapes and their normalisation into `store` types |
//! | [`session`] | — | `SessionStore`: login, logout, rejection handling, change subscriptions |
//! | [`transport`] | — | `HttpRequest`/`HttpResponse`, the `HttpTransport` trait and `ReqwestTransport` |
//! | `testing` | `testing` | In-memory backend implementing `HttpTransport` |
//!
//! All futures here are single-threaded (`!Send`); drive them on a
//! current-thread runtime or the browser event loop.

pub mod client;
pub mod error;
pub mod models;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

pub use client::{Collection, ResourceClient};
pub use error::{ApiError, ApiResult};
pub use models::{Credentials, PostDraft, SignupForm};
pub use session::{SessionStore, SubscriptionId};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

pub use store::{ClientConfig, Identity, Page, Post, Session};
