//! SQLite driver for ActiveRecord Rust.
//!
//! Implements [`activerecord_core::Connection`] over `rusqlite` with the
//! bundled SQLite library.
//!
//! ```
//! use activerecord_core::{Connection, Value};
//! use activerecord_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_memory().unwrap();
//! conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)", &[]).unwrap();
//! let id = conn.insert("INSERT INTO t (name) VALUES (?)", &[Value::from("x")]).unwrap();
//! assert_eq!(id, 1);
//! ```

pub mod config;
pub mod connection;

pub use config::SqliteConfig;
pub use connection::SqliteConnection;
