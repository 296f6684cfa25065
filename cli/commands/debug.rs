use crate::cli_args::DebugArgs;
use crate::output::readable_size;
use crate::{load_config_for_command, resolve_project_root};
use anyhow::{Context, Result};
use colored::*;
use log;
use std::path::Path;
use archdoc_core::{self as core, Config, IgnoreRuleSet, ScanOutput};

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let project_root = resolve_project_root(&args.project_config)?;
    let config = load_config_for_command(&project_root, &args.project_config, &args.scan_overrides)
        .context("Failed to load configuration for debug command")?;

    log::debug!("Debug: Compiling ignore rules...");
    let rules = if config.scan.use_gitignore {
        IgnoreRuleSet::load(&project_root)
    } else {
        IgnoreRuleSet::empty()
    };

    log::debug!("Debug: Scanning source tree...");
    let scan = core::scan_source_tree(&project_root, &config.scan)
        .context("Failed to scan source tree for debug")?;

    print_debug_info_pretty(&config, &project_root, &rules, &scan)
}

fn print_debug_info_pretty(
    config: &Config,
    project_root: &Path,
    rules: &IgnoreRuleSet,
    scan: &ScanOutput,
) -> Result<()> {
    println!(
        "{}",
        "\n--- Effective Configuration ---"
            .green()
            .bold()
            .underline()
    );
    let config_toml = config
        .to_toml_string()
        .context("Failed to serialize effective config to TOML")?;
    println!("{}", config_toml);
    println!("{:<16} {}", "Project root:".bold(), project_root.display());
    println!(
        "{:<16} {}",
        "Output file:".bold(),
        config.output_path(project_root).display()
    );

    display_ignore_rules(rules, config.scan.use_gitignore);

    println!(
        "{}",
        "\n--- Source Files Included ---"
            .green()
            .bold()
            .underline()
    );
    if scan.files.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        // Traversal order, which is also the order of blocks in the prompt.
        scan.files.iter().for_each(|p| println!("- {}", p.cyan()));
    }
    println!(
        "\n{} files, {}",
        scan.files.len().to_string().cyan(),
        readable_size(scan.total_bytes).cyan()
    );

    println!("{}", "\n--- End Debug Info ---".green().bold());
    Ok(())
}

fn display_ignore_rules(rules: &IgnoreRuleSet, enabled: bool) {
    println!("{}", "\n--- Ignore Rules ---".green().bold().underline());
    if !enabled {
        println!("{}", "(.gitignore support disabled)".dimmed());
        return;
    }
    if rules.is_empty() {
        println!("{}", "(No .gitignore rules found)".dimmed());
        return;
    }
    println!(
        "{:<4} {:<40} {}",
        "#".bold(),
        "Pattern".bold(),
        "Flags".bold()
    );
    println!("{:-<60}", "");
    for (idx, rule) in rules.rules().iter().enumerate() {
        let mut flags = Vec::new();
        if rule.is_negated() {
            flags.push("negated".green());
        }
        if rule.is_dir_only() {
            flags.push("dir-only".blue());
        }
        if rule.is_anchored() {
            flags.push("anchored".magenta());
        }
        let flags = flags
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:<4} {:<40} {}", idx + 1, rule.pattern().blue(), flags);
    }
}
