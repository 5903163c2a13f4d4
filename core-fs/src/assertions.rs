//! Contract checks. A failure here is a programming error and panics; it is
//! never reported through `IoResult`.

/// Store root.
pub const ROOT_DIR: &str = "/";

/// Panics unless `path` is absolute within the store.
#[track_caller]
pub fn assert_absolute_path(path: &str) {
    assert!(
        path.starts_with(ROOT_DIR),
        "Path must start with / but received {:?}",
        path
    );
}

/// Panics unless `file_url` is a fully qualified URL.
#[track_caller]
pub fn assert_file_url(file_url: &str) {
    assert!(
        url::Url::parse(file_url).is_ok(),
        "File url must be an absolute URL but received {:?}",
        file_url
    );
}
