//! Connection settings.

use std::path::PathBuf;
use std::time::Duration;

/// Settings for opening a [`SqliteConnection`](crate::SqliteConnection).
///
/// ```
/// use std::time::Duration;
/// use activerecord_sqlite::SqliteConfig;
///
/// let config = SqliteConfig::file("app.db").busy_timeout(Duration::from_secs(1));
/// assert!(config.path.is_some());
/// assert!(config.foreign_keys);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Database file; `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// Enforce foreign keys (`PRAGMA foreign_keys = ON`).
    pub foreign_keys: bool,
    /// How long to wait on a locked database.
    pub busy_timeout: Duration,
    /// Open read-only (ignored for in-memory databases).
    pub read_only: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: None,
            foreign_keys: true,
            busy_timeout: Duration::from_secs(5),
            read_only: false,
        }
    }
}

impl SqliteConfig {
    /// In-memory database.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Database file at `path`, created if missing.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
