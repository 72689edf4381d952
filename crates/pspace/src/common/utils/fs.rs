use std::os::unix::fs::MetadataExt;
use std::path::{Component, Path, PathBuf};

pub fn get_current_dir() -> std::io::Result<PathBuf> {
    std::env::current_dir()
}

pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// Replaces a leading `~` (or `~/`) with the home directory of the current user.
pub fn expand_user(path: &str) -> PathBuf {
    if path == "~" {
        home_dir()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Makes `path` absolute with respect to `base` and removes `.` and `..` components
/// without touching the filesystem.
pub fn absolute_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}

/// Computes the path of `path` relative to `base`. Both paths have to be absolute.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path = normalize_path(path);
    let base = normalize_path(base);
    let path_components: Vec<_> = path.components().collect();
    let base_components: Vec<_> = base.components().collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base_components.len() {
        result.push("..");
    }
    for component in &path_components[common..] {
        result.push(component);
    }
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}

/// Disk usage of a file or a directory tree in KiB (the value reported by `du -s`).
pub fn disk_usage_kib(path: &Path) -> std::io::Result<u64> {
    // `st_blocks` counts 512 byte units
    Ok(disk_usage_blocks(path)? / 2)
}

fn disk_usage_blocks(path: &Path) -> std::io::Result<u64> {
    let metadata = std::fs::symlink_metadata(path)?;
    let mut blocks = metadata.blocks();
    if metadata.is_dir() {
        for entry in std::fs::read_dir(path)? {
            blocks += disk_usage_blocks(&entry?.path())?;
        }
    }
    Ok(blocks)
}

/// Removes `dir` and its ancestors as long as they are empty, stopping at `stop`.
pub fn remove_empty_dirs(dir: &Path, stop: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut removed = vec![];
    let mut current = Some(dir);
    while let Some(dir) = current {
        if dir == stop || !dir.starts_with(stop) || std::fs::read_dir(dir)?.next().is_some() {
            break;
        }
        std::fs::remove_dir(dir)?;
        removed.push(dir.to_path_buf());
        current = dir.parent();
    }
    Ok(removed)
}
