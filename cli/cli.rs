mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::Path;
use std::process;

use cli_args::{Cli, Commands, ProjectConfigOpts, ScanOverrides};
use archdoc_core::{AppError, Config};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            // Fatal errors are always shown, even with --quiet.
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::TomlSerialize(_)) => 1,
        Some(AppError::RootAccess { .. }) => 2,
        Some(AppError::RootNotDirectory(_)) => 2,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::DirCreation { .. }) => 2,
        Some(AppError::Template(_)) => 3,
        Some(AppError::Generation(_)) => 4,
        Some(AppError::JsonSerialize(_)) => 4,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(Commands::Generate(args)) => {
            log::debug!("Executing 'generate' command...");
            commands::generate::handle_generate_command(args, quiet)?;
        }
        Some(Commands::Scan(args)) => {
            log::debug!("Executing 'scan' command...");
            commands::scan::handle_scan_command(args, quiet)?;
        }
        Some(Commands::Debug(args)) => {
            log::debug!("Executing 'debug' command...");
            commands::debug::handle_debug_command(args)?;
        }
    }
    Ok(())
}

fn merge_scan_overrides(mut config: Config, overrides: &ScanOverrides) -> Config {
    log::trace!("Applying scan CLI overrides to config...");
    if !overrides.extensions.is_empty() {
        config.scan.extensions = overrides
            .extensions
            .iter()
            .map(|ext| {
                if ext.starts_with('.') {
                    ext.clone()
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
    }
    config
        .scan
        .excluded_dirs
        .extend(overrides.exclude_dirs.iter().cloned());
    if overrides.disable_gitignore {
        config.scan.use_gitignore = false;
    }
    if overrides.enable_gitignore {
        config.scan.use_gitignore = true;
    }
    config
}

/// Resolves the project root from `--path` / `PROJECT_ROOT` / the working directory.
pub fn resolve_project_root(project_opts: &ProjectConfigOpts) -> Result<std::path::PathBuf> {
    let project_root = Config::determine_project_root(project_opts.path.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());
    Ok(project_root)
}

/// Loads the config file (if any) and applies command-line scan overrides.
pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    scan_overrides: &ScanOverrides,
) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config_file.as_ref(),
        project_opts.disable_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let config = merge_scan_overrides(config, scan_overrides);
    config
        .validate()
        .context("Invalid configuration after applying command-line overrides")?;
    log::trace!("Effective config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_override_replaces_whitelist_and_adds_dot() {
        let overrides = ScanOverrides {
            extensions: vec!["rs".to_string(), ".toml".to_string()],
            ..ScanOverrides::default()
        };
        let config = merge_scan_overrides(Config::default(), &overrides);
        let exts: Vec<&str> = config.scan.extensions.iter().map(String::as_str).collect();
        assert_eq!(exts, vec![".rs", ".toml"]);
    }

    #[test]
    fn exclude_dirs_are_added_to_defaults() {
        let overrides = ScanOverrides {
            exclude_dirs: vec!["target".to_string()],
            disable_gitignore: true,
            ..ScanOverrides::default()
        };
        let config = merge_scan_overrides(Config::default(), &overrides);
        assert!(config.scan.is_excluded_dir_name("target"));
        assert!(config.scan.is_excluded_dir_name(".git"));
        assert!(!config.scan.use_gitignore);
    }

    #[test]
    fn root_errors_map_to_filesystem_exit_code() {
        let err = anyhow::Error::new(AppError::RootNotDirectory("/tmp/x".into()));
        assert_eq!(exit_code_for(&err), 2);
        let err = anyhow::Error::new(AppError::Generation("down".into()));
        assert_eq!(exit_code_for(&err), 4);
        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
