//! Request payloads and response shapes of the blog REST API.

pub mod member;
pub mod post;

pub use member::{Credentials, LoginResponse, MemberProfile, SignupForm};
pub use post::{parse_timestamp, PageResponse, PostDraft, PostResponse};
