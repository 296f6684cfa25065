use crate::config::ScanConfig;
use crate::error::Result;
use crate::ignore_rules::IgnoreRuleSet;
use crate::walker::{self, FileRecord};
use log;
use std::path::Path;

pub const FILE_MARKER: &str = "FILE";
pub const DECISION_RECORD_MARKER: &str = "DECISION RECORD";

/// Accumulates labeled blocks of the form `\n--- <MARKER>: <name> ---\n<content>\n`.
#[derive(Debug, Clone)]
pub struct ContentAggregator {
    marker: &'static str,
    buffer: String,
    blocks: usize,
}

impl ContentAggregator {
    pub fn new(marker: &'static str) -> Self {
        Self {
            marker,
            buffer: String::new(),
            blocks: 0,
        }
    }

    pub fn for_source_files() -> Self {
        Self::new(FILE_MARKER)
    }

    pub fn for_decision_records() -> Self {
        Self::new(DECISION_RECORD_MARKER)
    }

    pub fn append(&mut self, record: FileRecord) {
        self.append_block(&record.relative_path, &record.content);
    }

    /// Appends one framed block. Valid UTF-8 is copied unchanged; invalid
    /// sequences become U+FFFD, since the result is a `String` that ends up
    /// in a JSON request body.
    pub fn append_block(&mut self, label: &str, content: &[u8]) {
        self.buffer.push_str("\n--- ");
        self.buffer.push_str(self.marker);
        self.buffer.push_str(": ");
        self.buffer.push_str(label);
        self.buffer.push_str(" ---\n");
        self.buffer.push_str(&String::from_utf8_lossy(content));
        self.buffer.push('\n');
        self.blocks += 1;
    }

    pub fn block_count(&self) -> usize {
        self.blocks
    }

    pub fn finalize(self) -> String {
        self.buffer
    }
}

/// Result of scanning a source tree.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub text: String,
    pub files: Vec<String>,
    pub total_bytes: u64,
    pub ignore_rule_count: usize,
}

/// Loads the root ignore file (when enabled), walks the tree and serializes every admitted file.
pub fn scan_source_tree(root: &Path, config: &ScanConfig) -> Result<ScanOutput> {
    log::debug!("Starting source scan of {}", root.display());
    let rules = if config.use_gitignore {
        IgnoreRuleSet::load(root)
    } else {
        log::debug!("Ignore file support disabled; using hardcoded filters only.");
        IgnoreRuleSet::empty()
    };

    let mut aggregator = ContentAggregator::for_source_files();
    let mut files = Vec::new();
    let mut total_bytes = 0u64;
    for record in walker::walk(root, config, &rules)? {
        total_bytes += record.content.len() as u64;
        files.push(record.relative_path.clone());
        aggregator.append(record);
    }
    debug_assert_eq!(aggregator.block_count(), files.len());
    log::info!(
        "Source scan complete: {} files, {} bytes.",
        files.len(),
        total_bytes
    );

    Ok(ScanOutput {
        text: aggregator.finalize(),
        files,
        total_bytes,
        ignore_rule_count: rules.len(),
    })
}
