use crate::config::ScanConfig;
use crate::error::{AppError, Result};
use crate::ignore_rules::IgnoreRuleSet;
use log;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// An admitted file: its slash-separated path below the scan root and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative_path: String,
    pub content: Vec<u8>,
}

/// Pruned depth-first walk of `root` yielding admitted files in lexicographic pre-order.
///
/// The root itself must exist, be a directory and be listable; anything that
/// goes wrong below it is logged and skipped.
pub fn walk<'a>(
    root: &'a Path,
    config: &'a ScanConfig,
    rules: &'a IgnoreRuleSet,
) -> Result<impl Iterator<Item = FileRecord> + 'a> {
    let metadata = fs::metadata(root).map_err(|e| AppError::RootAccess {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(AppError::RootNotDirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|e| AppError::RootAccess {
        path: root.to_path_buf(),
        source: e,
    })?;

    log::info!("Walking project directory: {}", root.display());
    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| admit_entry(entry, root, config, rules));

    Ok(walker.filter_map(move |entry_result| match entry_result {
        Ok(entry) => {
            if entry.file_type().is_dir() {
                return None;
            }
            read_record(&entry, root, config)
        }
        Err(e) => {
            log::warn!(
                "Skipping inaccessible entry {}: {}",
                e.path()
                    .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string()),
                e
            );
            None
        }
    }))
}

/// Steps 2 and 3 of the per-entry filter. Returning `false` for a directory prunes it.
fn admit_entry(entry: &DirEntry, root: &Path, config: &ScanConfig, rules: &IgnoreRuleSet) -> bool {
    let is_dir = entry.file_type().is_dir();
    if is_dir {
        let name = entry.file_name().to_string_lossy();
        if config.is_excluded_dir_name(&name) {
            log::trace!("Pruning hardcoded excluded directory: {}", entry.path().display());
            return false;
        }
    }

    let Some(relative_path) = relative_slash_path(entry.path(), root) else {
        log::warn!("Could not get relative path for: {}", entry.path().display());
        return false;
    };
    if rules.last_match_excludes(&relative_path, is_dir) {
        log::trace!(
            "{} excluded by ignore rules: {}",
            if is_dir { "Directory" } else { "File" },
            relative_path
        );
        return false;
    }
    true
}

fn read_record(entry: &DirEntry, root: &Path, config: &ScanConfig) -> Option<FileRecord> {
    let path = entry.path();
    if !config.is_whitelisted(path) {
        log::trace!("Extension not whitelisted: {}", path.display());
        return None;
    }
    let relative_path = relative_slash_path(path, root)?;
    match fs::read(path) {
        Ok(content) => {
            log::trace!("Admitted {} ({} bytes)", relative_path, content.len());
            Some(FileRecord {
                relative_path,
                content,
            })
        }
        Err(e) => {
            log::warn!("Skipping unreadable file {}: {}", path.display(), e);
            None
        }
    }
}

/// Path below `root` joined with `/` regardless of platform separator.
pub fn relative_slash_path(path: &Path, root: &Path) -> Option<String> {
    let relative: PathBuf = pathdiff::diff_paths(path, root)?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
