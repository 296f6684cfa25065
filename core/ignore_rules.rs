//! Gitignore-style exclusion rules.
//!
//! Rules keep the order of the ignore file. Each rule compiles to its own
//! [`GlobMatcher`] so that evaluation can walk the list backwards and let the
//! last matching rule decide, which is what gives `!pattern` lines their
//! re-including effect.

use globset::{GlobBuilder, GlobMatcher};
use log;
use std::fs;
use std::path::Path;

pub const IGNORE_FILENAME: &str = ".gitignore";

#[derive(Debug, Clone)]
pub struct IgnoreRule {
    raw: String,
    negated: bool,
    dir_only: bool,
    anchored: bool,
    matcher: GlobMatcher,
}

impl IgnoreRule {
    /// Compiles a single ignore-file line. Returns `None` for blank lines,
    /// comments and lines that do not form a valid pattern.
    pub fn parse(line: &str) -> Option<Self> {
        let raw = line.trim_start_matches('\u{feff}');
        let trimmed = trim_unescaped_trailing_whitespace(raw);
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let (negated, body) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        // `\#` and `\!` stand for the literal characters.
        let body = if body.starts_with("\\#") || body.starts_with("\\!") {
            &body[1..]
        } else {
            body
        };

        let (dir_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let anchored = body.contains('/');
        let body = body.trim_start_matches('/');
        if body.is_empty() {
            log::debug!("Skipping ignore line without a pattern: {:?}", line);
            return None;
        }

        let glob_text = if anchored {
            body.to_string()
        } else {
            format!("**/{}", body)
        };

        match GlobBuilder::new(&glob_text)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
        {
            Ok(glob) => {
                log::trace!(
                    "Compiled ignore rule {:?} as glob {:?} (negated: {}, dir_only: {}, anchored: {})",
                    line,
                    glob_text,
                    negated,
                    dir_only,
                    anchored
                );
                Some(Self {
                    raw: trimmed.to_string(),
                    negated,
                    dir_only,
                    anchored,
                    matcher: glob.compile_matcher(),
                })
            }
            Err(e) => {
                log::warn!("Skipping malformed ignore pattern {:?}: {}", line, e);
                None
            }
        }
    }

    pub fn pattern(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Whether this rule's pattern covers `relative_path`, ignoring negation.
    pub fn applies_to(&self, relative_path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        self.matcher.is_match(relative_path)
    }
}

/// Ordered rule list compiled from one ignore file.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn compile(content: &str) -> Self {
        let rules: Vec<IgnoreRule> = content.lines().filter_map(IgnoreRule::parse).collect();
        log::debug!("Compiled {} ignore rules.", rules.len());
        Self { rules }
    }

    /// Reads `<root>/.gitignore`. A missing or unreadable file gives an empty set.
    pub fn load(root: &Path) -> Self {
        let path = root.join(IGNORE_FILENAME);
        match fs::read_to_string(&path) {
            Ok(content) => {
                log::debug!("Loading ignore rules from {}", path.display());
                Self::compile(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No ignore file at {}", path.display());
                Self::empty()
            }
            Err(e) => {
                log::warn!(
                    "Could not read ignore file {}: {}. Continuing without ignore rules.",
                    path.display(),
                    e
                );
                Self::empty()
            }
        }
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Full gitignore decision for a slash-separated path relative to the root.
    ///
    /// A path below an excluded directory stays excluded even when a later
    /// negation matches the path itself.
    pub fn is_excluded(&self, relative_path: &str, is_dir: bool) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let relative_path = relative_path.trim_matches('/');
        for (idx, _) in relative_path.match_indices('/') {
            if self.last_match_excludes(&relative_path[..idx], true) {
                log::trace!(
                    "{} excluded through ancestor {}",
                    relative_path,
                    &relative_path[..idx]
                );
                return true;
            }
        }
        self.last_match_excludes(relative_path, is_dir)
    }

    /// Decision for the entry alone. The walker only asks about entries whose
    /// ancestors were already admitted, so ancestors need no re-check there.
    pub(crate) fn last_match_excludes(&self, relative_path: &str, is_dir: bool) -> bool {
        match self
            .rules
            .iter()
            .rev()
            .find(|rule| rule.applies_to(relative_path, is_dir))
        {
            Some(rule) => {
                log::trace!(
                    "{} matched ignore rule {:?} (negated: {})",
                    relative_path,
                    rule.raw,
                    rule.negated
                );
                !rule.negated
            }
            None => false,
        }
    }
}

fn trim_unescaped_trailing_whitespace(line: &str) -> &str {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut end = line.len();
    while end > 0 {
        let prefix = &line[..end];
        let Some(last) = prefix.chars().last() else {
            break;
        };
        if last != ' ' && last != '\t' {
            break;
        }
        if prefix[..end - 1].ends_with('\\') {
            break;
        }
        end -= 1;
    }
    &line[..end]
}
