pub mod aggregate;
pub mod config;
pub mod decisions;
pub mod error;
pub mod generation;
pub mod ignore_rules;
pub mod output;
pub mod prompt;
pub mod walker;

pub use aggregate::{ContentAggregator, ScanOutput, scan_source_tree};
pub use config::{Config, GenerationConfig, OutputConfig, PromptConfig, ScanConfig};
pub use decisions::collect_decision_records;
pub use error::{AppError, Result};
pub use generation::{GeminiClient, GenerationService};
pub use ignore_rules::{IgnoreRule, IgnoreRuleSet};
pub use output::write_output;
pub use prompt::{PreparedPrompt, PromptParts, TemplateKind, load_template, prepare_prompt};
pub use walker::{FileRecord, walk};
