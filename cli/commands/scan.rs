use crate::cli_args::ScanArgs;
use crate::output;
use crate::{load_config_for_command, resolve_project_root};
use anyhow::{Context, Result};
use colored::Colorize;
use log;
use archdoc_core as core;

pub fn handle_scan_command(args: ScanArgs, quiet: bool) -> Result<()> {
    let project_root = resolve_project_root(&args.project_config)?;
    let config = load_config_for_command(&project_root, &args.project_config, &args.scan_overrides)
        .context("Failed to load configuration for scan command")?;

    let scan = core::scan_source_tree(&project_root, &config.scan)
        .with_context(|| format!("Failed to scan {}", project_root.display()))?;
    log::debug!("Scan produced {} blocks.", scan.files.len());

    match &args.save {
        Some(path) => {
            output::write_to_file(path, &scan.text)?;
            if !quiet {
                println!(
                    "{} Saved {} files ({}) to: {}",
                    "✅".green(),
                    scan.files.len(),
                    output::readable_size(scan.total_bytes),
                    path.display().to_string().blue()
                );
            }
        }
        None => output::write_to_stdout(&scan.text)?,
    }
    Ok(())
}
