//! Mirror layout.
//!
//! An address is mirrored at `<root>/<host>/<segment>/.../<segment>`. Every
//! prefix of that path is created on the way down, so the tree on disk
//! mirrors the address's host/path structure one directory per segment.

use crate::address::Address;
use crate::error::{MirrorError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolve the mirror directory for `address` under `root`, creating it and
/// all of its parents.
///
/// Directories created before a failure are left in place.
pub fn resolve_target_path(address: &Address, root: &Path) -> Result<PathBuf> {
    let mut target = root.to_path_buf();
    ensure_dir(&target)?;

    for segment in address.without_scheme().split('/') {
        if segment.is_empty() {
            continue;
        }
        if segment == "." || segment == ".." {
            return Err(MirrorError::DirectoryCreation {
                path: target.join(segment),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "relative path segments are not allowed in a mirror path",
                ),
            });
        }
        target.push(segment);
        ensure_dir(&target)?;
    }

    Ok(target)
}

fn ensure_dir(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(MirrorError::DirectoryCreation {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            create_dir(path).map_err(|source| MirrorError::DirectoryCreation {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(MirrorError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(unix)]
fn create_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o777).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
