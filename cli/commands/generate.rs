use crate::cli_args::GenerateArgs;
use crate::output;
use crate::{load_config_for_command, resolve_project_root};
use anyhow::{Context, Result};
use colored::Colorize;
use log;
use std::path::Path;
use archdoc_core::{self as core, Config, GeminiClient, GenerationService};

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let project_root = resolve_project_root(&args.project_config)?;
    let mut config =
        load_config_for_command(&project_root, &args.project_config, &args.scan_overrides)
            .context("Failed to load configuration")?;
    if let Some(model) = &args.model {
        config.generation.model = model.clone();
    }
    if let Some(filename) = &args.output_file {
        config.output.filename = filename.clone();
    }

    let prepared = core::prepare_prompt(&project_root, &config)
        .context("Failed to assemble the prompt")?;
    if !quiet {
        eprintln!(
            "{} Collected {} source files ({}) from {}",
            "ℹ️".blue(),
            prepared.scan.files.len(),
            output::readable_size(prepared.scan.total_bytes),
            project_root.display()
        );
    }

    if args.dry_run {
        log::info!("Dry run: printing prompt instead of calling the model.");
        return output::write_to_stdout(&prepared.prompt);
    }

    let client = GeminiClient::from_config(&config.generation)
        .context("Failed to set up the generation client")?;
    let document = generate_document(&client, &config, &prepared.prompt)?;

    if args.stdout {
        return output::write_to_stdout(&document);
    }
    save_document(&project_root, &config, &document, quiet)
}

fn generate_document(
    service: &dyn GenerationService,
    config: &Config,
    prompt: &str,
) -> Result<String> {
    log::debug!("Requesting generation from model {}", config.generation.model);
    service
        .generate(&config.generation.model, prompt)
        .with_context(|| format!("Generation with model '{}' failed", config.generation.model))
}

fn save_document(project_root: &Path, config: &Config, document: &str, quiet: bool) -> Result<()> {
    let output_path = core::write_output(project_root, &config.output, document)
        .context("Failed to save generated documentation")?;
    if !quiet {
        println!(
            "{} Documentation saved to: {}",
            "Success!".green().bold(),
            output_path.display().to_string().blue()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archdoc_core::{AppError, Result as CoreResult};
    use std::cell::RefCell;
    use std::fs;

    struct RecordingService {
        reply: Option<String>,
        seen: RefCell<Vec<(String, usize)>>,
    }

    impl RecordingService {
        fn new(reply: Option<&str>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl GenerationService for RecordingService {
        fn generate(&self, model: &str, prompt: &str) -> CoreResult<String> {
            self.seen.borrow_mut().push((model.to_string(), prompt.len()));
            self.reply
                .clone()
                .ok_or_else(|| AppError::Generation("Service returned 503".to_string()))
        }
    }

    #[test]
    fn document_is_generated_with_configured_model_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let service = RecordingService::new(Some("# Architecture\n"));
        let mut config = Config::default();
        config.generation.model = "gemini-2.5-pro".to_string();

        let document = generate_document(&service, &config, "PROMPT").unwrap();
        save_document(dir.path(), &config, &document, true).unwrap();

        assert_eq!(
            service.seen.borrow().as_slice(),
            &[("gemini-2.5-pro".to_string(), 6)]
        );
        let saved = fs::read_to_string(dir.path().join("docs").join("AI_GENERATED.md")).unwrap();
        assert_eq!(saved, "# Architecture\n");
    }

    #[test]
    fn service_failure_is_propagated() {
        let service = RecordingService::new(None);
        let err = generate_document(&service, &Config::default(), "PROMPT").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Generation(_))
        ));
    }
}
