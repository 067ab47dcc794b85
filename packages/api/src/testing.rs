//! In-memory blog server for tests.
//!
//! [`FakeBackend`] implements [`HttpTransport`] by routing requests to a
//! small in-process model of the members and blogs endpoints. Clones share
//! state, so a test can keep a handle to seed data, revoke tokens or inspect
//! what was sent while the client owns another.
//!
//! List responses use the flat `memberId`/`memberName` shape with zone-less
//! timestamps; single-post responses use the nested `author` shape with RFC 3339
//! timestamps. Each `send` yields once before returning so concurrent requests
//! interleave.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportFailure};

const EPOCH_SECS: i64 = 1_704_067_200;

#[derive(Clone, Debug)]
struct Member {
    id: i64,
    email: String,
    password: String,
    name: String,
}

#[derive(Clone, Debug)]
struct StoredPost {
    id: i64,
    title: String,
    content: String,
    member_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct BackendState {
    members: Vec<Member>,
    posts: Vec<StoredPost>,
    tokens: HashMap<String, i64>,
    next_member_id: i64,
    next_post_id: i64,
    issued_tokens: u64,
    offline: bool,
    fail_next: Option<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Shared in-memory backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<RefCell<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member directly. Returns its id.
    pub fn add_member(&self, email: &str, password: &str, name: &str) -> i64 {
        self.state.borrow_mut().insert_member(email, password, name)
    }

    /// Store a post without going through the API. Returns its id.
    pub fn seed_post(&self, author_id: i64, title: &str, body: &str) -> i64 {
        self.state.borrow_mut().insert_post(author_id, title, body)
    }

    /// Forget every issued token, as if they all expired.
    pub fn revoke_tokens(&self) {
        self.state.borrow_mut().tokens.clear();
    }

    /// While offline every request fails without a response.
    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    /// Answer the next request with this status and body.
    pub fn fail_next(&self, status: u16, body: &str) {
        self.state.borrow_mut().fail_next = Some(HttpResponse::new(status, body));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn post_count(&self) -> usize {
        self.state.borrow().posts.len()
    }
}

impl HttpTransport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let result = {
            let mut state = self.state.borrow_mut();
            state.requests.push(request.clone());
            if state.offline {
                Err(TransportFailure("connection refused".to_string()))
            } else if let Some(response) = state.fail_next.take() {
                Ok(response)
            } else {
                Ok(state.handle(&request))
            }
        };
        tokio::task::yield_now().await;
        result
    }
}

fn message(status: u16, text: &str) -> HttpResponse {
    HttpResponse::json(status, &json!({ "message": text }))
}

fn body_str<'a>(request: &'a HttpRequest, field: &str) -> &'a str {
    request
        .body
        .as_ref()
        .and_then(|b| b.get(field))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

impl BackendState {
    fn insert_member(&mut self, email: &str, password: &str, name: &str) -> i64 {
        self.next_member_id += 1;
        let id = self.next_member_id;
        self.members.push(Member {
            id,
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        });
        id
    }

    fn insert_post(&mut self, member_id: i64, title: &str, content: &str) -> i64 {
        self.next_post_id += 1;
        let id = self.next_post_id;
        let created_at = DateTime::from_timestamp(EPOCH_SECS + id * 60, 0).unwrap_or_default();
        self.posts.push(StoredPost {
            id,
            title: title.to_string(),
            content: content.to_string(),
            member_id,
            created_at,
        });
        id
    }

    fn member(&self, id: i64) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    fn member_name(&self, id: i64) -> String {
        self.member(id).map(|m| m.name.clone()).unwrap_or_default()
    }

    fn handle(&mut self, request: &HttpRequest) -> HttpResponse {
        let caller = match &request.bearer {
            Some(token) => match self.tokens.get(token) {
                Some(id) => Some(*id),
                None => return message(401, "Token expired"),
            },
            None => None,
        };

        let segments: Vec<&str> = request
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["members", "login"]) => self.login(request),
            (Method::Post, ["members", "signup"]) => self.signup(request),
            (Method::Get, ["members", id]) => match id.parse().ok().and_then(|id| self.member(id)) {
                Some(m) => HttpResponse::json(
                    200,
                    &json!({ "id": m.id, "email": m.email, "name": m.name }),
                ),
                None => message(404, "Member not found"),
            },
            (Method::Get, ["blogs"]) => self.list(request, None),
            (Method::Get, ["blogs", "member", id]) => match id.parse() {
                Ok(id) => self.list(request, Some(id)),
                Err(_) => message(400, "Bad member id"),
            },
            (Method::Post, ["blogs"]) => self.create(request, caller),
            (method, ["blogs", id]) => match id.parse::<i64>() {
                Ok(id) => self.single(method, id, request, caller),
                Err(_) => message(400, "Bad post id"),
            },
            _ => message(404, "No such route"),
        }
    }

    fn login(&mut self, request: &HttpRequest) -> HttpResponse {
        let email = body_str(request, "email");
        let password = body_str(request, "password");
        let Some(member) = self
            .members
            .iter()
            .find(|m| m.email == email && m.password == password)
            .cloned()
        else {
            return message(401, "Invalid email or password");
        };

        self.issued_tokens += 1;
        let token = format!("token-{}", self.issued_tokens);
        self.tokens.insert(token.clone(), member.id);
        HttpResponse::json(
            200,
            &json!({ "token": token, "id": member.id, "email": member.email, "name": member.name }),
        )
    }

    fn signup(&mut self, request: &HttpRequest) -> HttpResponse {
        let email = body_str(request, "email").to_string();
        let password = body_str(request, "password").to_string();
        let name = body_str(request, "name").to_string();
        if self.members.iter().any(|m| m.email == email) {
            return message(400, "Email already registered");
        }
        let id = self.insert_member(&email, &password, &name);
        HttpResponse::json(201, &json!({ "id": id, "email": email, "name": name }))
    }

    fn list(&self, request: &HttpRequest, member: Option<i64>) -> HttpResponse {
        let page: usize = request
            .query_param("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(0);
        let size: usize = request
            .query_param("size")
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        if size == 0 {
            return message(400, "size must be positive");
        }

        let mut matching: Vec<&StoredPost> = self
            .posts
            .iter()
            .filter(|p| member.map_or(true, |m| p.member_id == m))
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));

        let total = matching.len();
        let content: Vec<Value> = matching
            .into_iter()
            .skip(page * size)
            .take(size)
            .map(|p| {
                json!({
                    "id": p.id,
                    "title": p.title,
                    "content": p.content,
                    "memberId": p.member_id,
                    "memberName": self.member_name(p.member_id),
                    "createdAt": p.created_at.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
                })
            })
            .collect();

        HttpResponse::json(
            200,
            &json!({
                "content": content,
                "totalPages": total.div_ceil(size),
                "totalElements": total,
                "number": page,
                "size": size,
            }),
        )
    }

    fn create(&mut self, request: &HttpRequest, caller: Option<i64>) -> HttpResponse {
        let Some(caller) = caller else {
            return message(401, "Login required");
        };
        let title = body_str(request, "title").to_string();
        let content = body_str(request, "content").to_string();
        if title.trim().is_empty() || content.trim().is_empty() {
            return message(400, "Title and content are required");
        }
        let id = self.insert_post(caller, &title, &content);
        self.render(id, 201)
    }

    fn single(
        &mut self,
        method: Method,
        id: i64,
        request: &HttpRequest,
        caller: Option<i64>,
    ) -> HttpResponse {
        let Some(owner) = self.posts.iter().find(|p| p.id == id).map(|p| p.member_id) else {
            return message(404, "Post not found");
        };
        if method == Method::Get {
            return self.render(id, 200);
        }

        let Some(caller) = caller else {
            return message(401, "Login required");
        };
        if caller != owner {
            return message(403, "Not the author");
        }

        match method {
            Method::Put => {
                let title = body_str(request, "title");
                let content = body_str(request, "content");
                if title.trim().is_empty() || content.trim().is_empty() {
                    return message(400, "Title and content are required");
                }
                if let Some(post) = self.posts.iter_mut().find(|p| p.id == id) {
                    post.title = title.to_string();
                    post.content = content.to_string();
                }
                self.render(id, 200)
            }
            Method::Delete => {
                self.posts.retain(|p| p.id != id);
                HttpResponse::new(204, Vec::new())
            }
            _ => message(405, "Method not allowed"),
        }
    }

    fn render(&self, id: i64, status: u16) -> HttpResponse {
        match self.posts.iter().find(|p| p.id == id) {
            Some(p) => HttpResponse::json(
                status,
                &json!({
                    "id": p.id,
                    "title": p.title,
                    "body": p.content,
                    "author": { "id": p.member_id, "name": self.member_name(p.member_id) },
                    "createdAt": p.created_at.to_rfc3339(),
                }),
            ),
            None => message(404, "Post not found"),
        }
    }
}
