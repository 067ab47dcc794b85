//! This crate contains the view state shared by every frontend.
//!
//! Nothing here renders. Each type holds what a screen shows and exposes the
//! operations a screen triggers; a frontend draws it however it likes.

pub mod activity_log;
pub use activity_log::{surface_for, ActivityLog, ErrorSurface, LogEntry, LogLevel};

mod detail;
pub use detail::{DetailState, PostDetail};

mod header;
pub use header::{HeaderModel, LiveHeader, NavItem};

mod list;
pub use list::{ListSource, ListState, PaginatedList, PostList, PostMutation};

pub mod ownership;
pub use ownership::{can_modify, Authored};

mod routes;
pub use routes::{guard, Guard, Route};

mod scope;
pub use scope::ViewScope;
