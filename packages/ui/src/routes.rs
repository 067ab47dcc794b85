//! Route table and the signed-in guard.

use std::fmt;

use store::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Signup,
    Login,
    BlogList,
    CreatePost,
    EditPost(i64),
    PostDetail(i64),
    MemberBlog(i64),
}

impl Route {
    /// Match a path such as `/blog/edit/3`. Trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Route::Home,
            ["signup"] => Route::Signup,
            ["login"] => Route::Login,
            ["blog"] => Route::BlogList,
            ["blog", "create"] => Route::CreatePost,
            ["blog", "edit", id] => Route::EditPost(id.parse().ok()?),
            ["blog", "member", id] => Route::MemberBlog(id.parse().ok()?),
            ["blog", id] => Route::PostDetail(id.parse().ok()?),
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Login => "/login".to_string(),
            Route::BlogList => "/blog".to_string(),
            Route::CreatePost => "/blog/create".to_string(),
            Route::EditPost(id) => format!("/blog/edit/{id}"),
            Route::PostDetail(id) => format!("/blog/{id}"),
            Route::MemberBlog(id) => format!("/blog/member/{id}"),
        }
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, Route::CreatePost | Route::EditPost(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    Allow,
    Redirect(Route),
}

/// Decide whether `route` may be shown for `session`.
pub fn guard(route: &Route, session: &Session) -> Guard {
    if route.requires_session() && !session.is_authenticated() {
        tracing::debug!("{} requires a session, redirecting to login", route);
        return Guard::Redirect(Route::Login);
    }
    Guard::Allow
}
