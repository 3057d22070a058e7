//! SQLite DSN helpers.

mod dsn;
mod path;

pub use dsn::{absolutize_sqlite_dsn, is_memory_dsn};
pub(crate) use path::ensure_parent_dir;
