use std::path::PathBuf;

/// File path named by a SQLite DSN, if it names one.
fn sqlite_file_path(dsn: &str) -> Option<PathBuf> {
    if super::is_memory_dsn(dsn) {
        return None;
    }
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    let path = rest.split_once('?').map_or(rest, |(p, _)| p);
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// Create the directory that will hold the database file.
pub(crate) fn ensure_parent_dir(dsn: &str) -> std::io::Result<()> {
    let Some(path) = sqlite_file_path(dsn) else {
        return Ok(());
    };
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
