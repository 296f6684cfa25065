use crate::aggregate::{ScanOutput, scan_source_tree};
use crate::config::{Config, DEFAULT_OUTPUT_TEMPLATE_PATH, DEFAULT_SYSTEM_INSTRUCTION_PATH};
use crate::decisions::collect_decision_records;
use crate::error::{AppError, Result};
use log;
use rust_embed::RustEmbed;
use std::fs;
use std::path::Path;

const SECTION_DELIMITER: &str = "\n---\n";
const DECISION_RECORDS_HEADER: &str = "Here are the Architecture Decision Records (ADR):\n";
const SOURCE_CODE_HEADER: &str = "Here is the source code:\n";

#[derive(RustEmbed)]
#[folder = "templates/"]
#[prefix = "templates/"]
struct EmbeddedTemplates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    SystemInstruction,
    OutputTemplate,
}

impl TemplateKind {
    pub fn default_path(self) -> &'static str {
        match self {
            TemplateKind::SystemInstruction => DEFAULT_SYSTEM_INSTRUCTION_PATH,
            TemplateKind::OutputTemplate => DEFAULT_OUTPUT_TEMPLATE_PATH,
        }
    }

    fn asset_name(self) -> &'static str {
        match self {
            TemplateKind::SystemInstruction => "templates/system_instruction.md",
            TemplateKind::OutputTemplate => "templates/output_template.md",
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::SystemInstruction => write!(f, "system instruction"),
            TemplateKind::OutputTemplate => write!(f, "output template"),
        }
    }
}

pub fn embedded_template(kind: TemplateKind) -> Result<String> {
    let asset = EmbeddedTemplates::get(kind.asset_name()).ok_or_else(|| {
        AppError::Template(format!("Embedded {} not found: {}", kind, kind.asset_name()))
    })?;
    let content = std::str::from_utf8(asset.data.as_ref()).map_err(|e| {
        AppError::Template(format!("UTF-8 error in embedded {}: {}", kind, e))
    })?;
    Ok(content.to_string())
}

/// Reads a template file. Only the default location may fall back to the built-in text;
/// an explicitly configured path that is missing is an error.
pub fn load_template(path: &Path, kind: TemplateKind) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            log::debug!("Loaded {} from {}", kind, path.display());
            Ok(content)
        }
        Err(e)
            if e.kind() == std::io::ErrorKind::NotFound
                && path == Path::new(kind.default_path()) =>
        {
            log::warn!(
                "No {} at {}; using the built-in default.",
                kind,
                path.display()
            );
            embedded_template(kind)
        }
        Err(e) => Err(AppError::Template(format!(
            "Failed to read {} '{}': {}",
            kind,
            path.display(),
            e
        ))),
    }
}

/// The four inputs of a generation request, concatenated in a fixed order.
#[derive(Debug, Clone, Default)]
pub struct PromptParts {
    pub system_instruction: String,
    pub output_template: String,
    pub decision_records: String,
    pub source_code: String,
}

impl PromptParts {
    pub fn assemble(&self) -> String {
        let mut prompt = String::with_capacity(
            self.system_instruction.len()
                + self.output_template.len()
                + self.decision_records.len()
                + self.source_code.len()
                + 128,
        );
        prompt.push_str(&self.system_instruction);
        prompt.push_str(SECTION_DELIMITER);

        prompt.push_str(&self.output_template);
        prompt.push_str(SECTION_DELIMITER);

        prompt.push_str(DECISION_RECORDS_HEADER);
        prompt.push_str(&self.decision_records);
        prompt.push_str(SECTION_DELIMITER);

        prompt.push_str(SOURCE_CODE_HEADER);
        prompt.push_str(&self.source_code);
        prompt
    }
}

/// A fully assembled prompt plus the scan it was built from.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub prompt: String,
    pub scan: ScanOutput,
}

/// Loads both templates, scans the source tree and the decision records, and assembles the prompt.
pub fn prepare_prompt(project_root: &Path, config: &Config) -> Result<PreparedPrompt> {
    log::debug!("Loading prompt templates...");
    let system_instruction =
        load_template(&config.prompt.system_instruction, TemplateKind::SystemInstruction)?;
    let output_template =
        load_template(&config.prompt.output_template, TemplateKind::OutputTemplate)?;

    let scan = scan_source_tree(project_root, &config.scan)?;
    let decision_records = collect_decision_records(&config.adr_dir(project_root))?;

    let parts = PromptParts {
        system_instruction,
        output_template,
        decision_records,
        source_code: scan.text.clone(),
    };
    let prompt = parts.assemble();
    log::info!("Assembled prompt of {} bytes.", prompt.len());
    Ok(PreparedPrompt { prompt, scan })
}
