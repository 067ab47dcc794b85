//! # Filesystem-backed key/value store
//!
//! [`FileStore`] is a [`KeyValueStore`] implementation that persists each key
//! as a small file. It is used by native front ends to keep the session across
//! restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── token          # raw bearer token
//! └── user           # identity JSON
//! ```
//!
//! ## Platform data directories
//!
//! [`FileStore::default_location`] uses [`dirs::data_dir()`]:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS | `~/Library/Application Support/blogclient/` |
//! | Linux | `~/.local/share/blogclient/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\blogclient\` |
//!
//! I/O failures are logged and otherwise ignored: an unreadable file is the
//! same as a missing one, and a failed write leaves the in-memory session
//! usable for the rest of the run.

use std::path::{Path, PathBuf};

use crate::vault::KeyValueStore;

const APP_DIR: &str = "blogclient";

/// Filesystem-backed KeyValueStore for desktop persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    /// `<data_dir>/blogclient`, or `./blogclient` when the platform has none.
    pub fn default_location() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self::new(base)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base.join(key)
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) {
        if let Err(e) = create_private_dir(&self.base) {
            tracing::warn!("Failed to create {}: {}", self.base.display(), e);
            return;
        }
        if let Err(e) = write_private(&self.key_path(key), value) {
            tracing::warn!("Failed to write {}: {}", key, e);
        }
    }

    async fn remove(&self, key: &str) {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove {}: {}", key, e),
        }
    }
}

/// The directory holds a bearer token: owner-only on unix.
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}

fn write_private(path: &Path, value: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten files left by older versions.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(value.as_bytes())
}
