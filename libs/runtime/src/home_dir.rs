use std::io;
use std::path::{Path, PathBuf};

/// Resolve the service home directory into an absolute path.
///
/// * `Some(path)`: `~` / `~/...` expands against the user's home; relative
///   paths are made absolute against the current working directory.
/// * `None`: `<platform home>/<default_subdir>` (`%APPDATA%` on Windows).
///
/// With `create = true` the directory is created when missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> io::Result<PathBuf> {
    let resolved = match configured {
        Some(raw) => {
            let expanded = expand_tilde(raw.trim())?;
            if expanded.is_absolute() {
                expanded
            } else {
                std::env::current_dir()?.join(expanded)
            }
        }
        None => platform_base_dir()?.join(default_subdir),
    };

    if create {
        std::fs::create_dir_all(&resolved)?;
    }
    Ok(resolved)
}

fn expand_tilde(raw: &str) -> io::Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

fn user_home() -> io::Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cannot determine home directory"))
}

#[cfg(target_os = "windows")]
fn platform_base_dir() -> io::Result<PathBuf> {
    dirs::config_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cannot determine %APPDATA%"))
}

#[cfg(not(target_os = "windows"))]
fn platform_base_dir() -> io::Result<PathBuf> {
    user_home()
}
