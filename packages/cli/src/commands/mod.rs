pub mod account;
pub mod posts;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use api::{ApiError, ReqwestTransport, ResourceClient, SessionStore};
use store::{ClientConfig, FileStore};
use ui::{ActivityLog, ErrorSurface, LogLevel, Route};

pub type Client = ResourceClient<FileStore, ReqwestTransport>;
pub type Session = SessionStore<FileStore, ReqwestTransport>;

/// Everything a command needs.
pub struct App {
    pub client: Client,
    pub config: ClientConfig,
    pub log: ActivityLog,
}

impl App {
    pub async fn open(config: ClientConfig, storage: FileStore) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.api.base_url, config.timeout())?;
        let session = SessionStore::open(storage, transport).await;
        Ok(Self {
            client: ResourceClient::new(session),
            config,
            log: ActivityLog::default(),
        })
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    pub fn success(&mut self, message: &str) {
        self.log.log(LogLevel::Success, message);
        println!("{message}");
    }

    /// Print a hint for an API failure.
    pub fn explain(&mut self, err: &ApiError) {
        match self.log.record_error(err) {
            ErrorSurface::Redirect(Route::Login) => {
                eprintln!("Not signed in, or the session expired. Run `blog login <email>`.")
            }
            ErrorSurface::Redirect(route) => eprintln!("See {route}"),
            ErrorSurface::Field(message) => eprintln!("Invalid input: {message}"),
            ErrorSurface::NotFound => eprintln!("Nothing found at that id."),
            ErrorSurface::Banner { retryable, .. } => {
                if retryable {
                    eprintln!("Could not reach {}. Try again later.", self.config.api.base_url)
                }
            }
        }
    }
}

/// Use `given`, or prompt for a line on stderr.
pub fn prompt(label: &str, given: Option<String>) -> Result<String> {
    if let Some(value) = given {
        return Ok(value);
    }
    eprint!("{label}: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("Failed to read {label}"))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
