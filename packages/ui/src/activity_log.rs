use std::collections::VecDeque;

use api::ApiError;

use crate::routes::Route;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

/// Bounded record of user-visible events, oldest dropped first.
#[derive(Clone, Debug)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: current_time(),
            level,
            message: message.to_string(),
        });
    }

    /// Log a failure and return how it should be shown.
    pub fn record_error(&mut self, err: &ApiError) -> ErrorSurface {
        let surface = surface_for(err);
        let level = match surface {
            ErrorSurface::Field(_) => LogLevel::Warning,
            _ => LogLevel::Error,
        };
        self.log(level, &err.to_string());
        surface
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// How a failed operation is presented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorSurface {
    /// Session missing or rejected: send the user to a route.
    Redirect(Route),
    /// Shown next to the form that was submitted.
    Field(String),
    /// The resource is gone.
    NotFound,
    /// Dismissable banner. `retryable` offers a retry action.
    Banner { message: String, retryable: bool },
}

pub fn surface_for(err: &ApiError) -> ErrorSurface {
    match err {
        ApiError::Auth { .. } => ErrorSurface::Redirect(Route::Login),
        ApiError::Validation { message } => ErrorSurface::Field(message.clone()),
        ApiError::NotFound => ErrorSurface::NotFound,
        ApiError::Transport { .. } | ApiError::Unexpected { .. } => ErrorSurface::Banner {
            message: err.to_string(),
            retryable: err.is_retryable(),
        },
    }
}

#[cfg(target_arch = "wasm32")]
fn current_time() -> String {
    let date = js_sys::Date::new_0();
    let h = date.get_hours();
    let m = date.get_minutes();
    let s = date.get_seconds();
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(not(target_arch = "wasm32"))]
fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
