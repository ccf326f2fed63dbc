//! Shared filesystem helpers built on `cap-std` and `camino`.
#![forbid(unsafe_code)]

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// What a path points at on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Anything else (socket, fifo, device).
    Other,
}

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create (or truncate) a UTF-8 file for writing, creating missing parent
/// directories first.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let (dir, file_name) = open_dir_and_file(path)?;
    dir.create(file_name.as_str())
}

/// Resolve an ambient directory for the given path and return it with the
/// path's file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    if let Ok(relative) = parent.strip_prefix("/") {
        if relative.as_str().is_empty() {
            return Ok(());
        }
        let root = fs_utf8::Dir::open_ambient_dir("/", ambient_authority())?;
        return root.create_dir_all(relative);
    }
    if parent.is_absolute() {
        // Prefixed absolute path (Windows drives); cap-std cannot anchor a
        // relative walk here, so fall back to ambient creation.
        return std::fs::create_dir_all(parent.as_std_path());
    }
    let base = fs_utf8::Dir::open_ambient_dir(".", ambient_authority())?;
    base.create_dir_all(parent)
}

/// Classify what `path` currently points at.
pub fn path_kind(path: &Utf8Path) -> io::Result<PathKind> {
    let (dir, file_name) = open_dir_and_file(path)?;
    let metadata = dir.metadata(file_name.as_str())?;
    Ok(if metadata.is_file() {
        PathKind::File
    } else if metadata.is_dir() {
        PathKind::Directory
    } else {
        PathKind::Other
    })
}

/// Return whether a path exists and is a regular file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    path_kind(path).map(|kind| kind == PathKind::File)
}

/// List the regular files directly under `dir` carrying `extension`, sorted
/// by name for deterministic traversal order.
pub fn list_files_with_extension(
    dir: &Utf8Path,
    extension: &str,
) -> io::Result<Vec<Utf8PathBuf>> {
    let handle = fs_utf8::Dir::open_ambient_dir(dir, ambient_authority())?;
    let mut files = Vec::new();
    for read in handle.entries()? {
        let entry = read?;
        let file_name = entry.file_name()?;
        let candidate = Utf8Path::new(&file_name);
        if candidate.extension() == Some(extension) && entry.metadata()?.is_file() {
            files.push(dir.join(candidate));
        }
    }
    files.sort();
    Ok(files)
}
