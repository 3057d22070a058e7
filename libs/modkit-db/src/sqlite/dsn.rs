use std::path::{Path, PathBuf};

use crate::{DbError, Result};

/// True for `sqlite::memory:`, `sqlite://:memory:` and DSNs carrying `mode=memory`.
pub fn is_memory_dsn(dsn: &str) -> bool {
    let dsn = dsn.trim();
    if dsn.eq_ignore_ascii_case("sqlite::memory:")
        || dsn.eq_ignore_ascii_case("sqlite://:memory:")
        || dsn.eq_ignore_ascii_case("sqlite://memory:")
    {
        return true;
    }

    url::Url::parse(dsn).is_ok_and(|url| {
        url.query_pairs()
            .any(|(k, v)| k.eq_ignore_ascii_case("mode") && v.eq_ignore_ascii_case("memory"))
    })
}

/// Rewrite a `sqlite://` DSN so that a relative file path is anchored at `base_dir`.
/// Query parameters are kept. Memory DSNs normalize to `sqlite::memory:`.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if is_memory_dsn(dsn) && !dsn.contains('?') {
        return Ok("sqlite::memory:".to_string());
    }

    let rest = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| DbError::InvalidSqliteDsn(format!("expected sqlite:// prefix: {dsn}")))?;

    let (path_str, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_str.is_empty() {
        return Err(DbError::InvalidSqliteDsn(format!("empty path: {dsn}")));
    }

    let mut p = PathBuf::from(path_str);
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = format!("sqlite://{}", p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}
