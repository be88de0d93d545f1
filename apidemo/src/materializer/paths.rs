//! Destination path derivation for uploaded files.

use std::path::{Component, Path, PathBuf};

use crate::errors::{Error, Result};

/// Join a client-supplied file name onto `base`.
///
/// Only plain relative names are accepted. Root, prefix and `..` components are rejected,
/// `.` components are dropped. Nested names such as `reports/today.txt` are kept as-is so
/// the write creates the intermediate directories.
pub fn safe_join(base: &Path, file_name: &str) -> Result<PathBuf> {
    let mut relative = PathBuf::new();

    for component in Path::new(file_name).components() {
        match component {
            Component::Normal(segment) => relative.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::malformed(format!("File name '{file_name}' escapes the upload directory")));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(Error::malformed("File name must not be empty"));
    }

    Ok(base.join(relative))
}
