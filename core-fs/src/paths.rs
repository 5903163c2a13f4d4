//! POSIX-style store path helpers.

use uuid::Uuid;

use crate::types::TempOptions;

pub const SEPARATOR: char = '/';

/// Normalize a `/`-separated path: collapse repeated separators and `.`,
/// resolve `..`. Absolute paths never climb above the root.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with(SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split(SEPARATOR) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Join `relative` onto `base` and normalize the result.
pub fn join(base: &str, relative: &str) -> String {
    normalize(&format!("{}/{}", base, relative))
}

/// Whether `path` lies strictly inside `dir`.
pub fn is_within(dir: &str, path: &str) -> bool {
    let dir = normalize(dir);
    let path = normalize(path);
    if dir == "/" {
        return path != "/";
    }
    path.len() > dir.len() && path.starts_with(&dir) && path[dir.len()..].starts_with(SEPARATOR)
}

/// Last component of `path`.
pub fn basename(path: &str) -> &str {
    path.trim_end_matches(SEPARATOR)
        .rsplit(SEPARATOR)
        .next()
        .unwrap_or_default()
}

/// Generate a temp path under `tmp_dir` without creating it.
///
/// Shape: `{tmp_dir}/{basename-}{uuid}{extname}`; directories never get an
/// extension.
pub fn generate_temp_path(tmp_dir: &str, options: &TempOptions) -> String {
    let base = if options.basename.is_empty() {
        String::new()
    } else {
        format!("{}-", options.basename)
    };
    let ext = if options.is_directory {
        ""
    } else {
        options.extname.as_str()
    };

    join(tmp_dir, &format!("{}{}{}", base, Uuid::new_v4(), ext))
}

/// Whether `path` is inside the temp root.
pub fn is_temp_path(tmp_dir: &str, path: &str) -> bool {
    path.starts_with(&format!("{}{}", tmp_dir, SEPARATOR))
}
