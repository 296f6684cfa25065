use crate::aggregate::ContentAggregator;
use crate::error::{AppError, Result};
use log;
use std::fs;
use std::path::Path;

pub const NO_DECISION_RECORDS: &str = "No ADRs found.";

/// Flat, unfiltered listing of `*.md` decision records in `adr_dir`, ordered by file name.
pub fn collect_decision_records(adr_dir: &Path) -> Result<String> {
    if !adr_dir.exists() {
        log::info!(
            "No decision record directory at {}; continuing without ADRs.",
            adr_dir.display()
        );
        return Ok(NO_DECISION_RECORDS.to_string());
    }

    let mut entries: Vec<fs::DirEntry> = fs::read_dir(adr_dir)
        .map_err(|e| AppError::FileRead {
            path: adr_dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", adr_dir.display(), e);
                None
            }
        })
        .collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut aggregator = ContentAggregator::for_decision_records();
    for entry in entries {
        if entry.file_type().map_or(true, |ft| ft.is_dir()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".md") {
            continue;
        }
        match fs::read(entry.path()) {
            Ok(content) => aggregator.append_block(&name, &content),
            Err(e) => log::warn!("Skipping unreadable decision record {}: {}", name, e),
        }
    }
    log::info!("Collected {} decision records.", aggregator.block_count());
    Ok(aggregator.finalize())
}
