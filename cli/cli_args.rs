use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        short = 'p',
        long = "path",
        visible_alias = "project-root",
        help = "Path to your application code (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .archdoc/archdoc.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanOverrides {
    #[arg(
        long = "extension",
        value_name = "EXT",
        help = "Whitelisted extension, leading dot included (repeatable; replaces the configured list).",
        help_heading = "Scan Filters"
    )]
    pub extensions: Vec<String>,

    #[arg(
        long = "exclude-dir",
        value_name = "NAME",
        help = "Additional directory name to skip wherever it appears (repeatable).",
        help_heading = "Scan Filters"
    )]
    pub exclude_dirs: Vec<String>,

    #[arg(
        long,
        help = "Ignore the project's .gitignore.",
        conflicts_with = "enable_gitignore",
        help_heading = "Scan Filters"
    )]
    pub disable_gitignore: bool,

    #[arg(
        long,
        help = "Honor the project's .gitignore [default].",
        conflicts_with = "disable_gitignore",
        help_heading = "Scan Filters"
    )]
    pub enable_gitignore: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate architecture documentation for a code base with an AI model.",
    long_about = "archdoc scans source files and architecture decision records, sends them \nwith a documentation template to a text-generation model and saves the reply \nas docs/AI_GENERATED.md.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  archdoc generate --path ./service --model gemini-2.5-pro\n  archdoc generate --dry-run > prompt.txt\n  archdoc scan --save context.txt\n  archdoc debug",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Scan the project, call the model and save the generated documentation."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "s",
        about = "Print or save the aggregated source files without calling the model."
    )]
    Scan(ScanArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective configuration, ignore rules and included files."
    )]
    Debug(DebugArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub scan_overrides: ScanOverrides,

    #[arg(
        short = 'm',
        long,
        help = "Model used for generation (overrides config) [default: gemini-3-flash-preview].",
        value_name = "MODEL",
        help_heading = "Generation"
    )]
    pub model: Option<String>,

    #[arg(
        long,
        help = "Print the assembled prompt instead of calling the model.",
        help_heading = "Generation"
    )]
    pub dry_run: bool,

    #[arg(
        long,
        help = "Print the generated documentation instead of writing it to the output file.",
        help_heading = "Output Control"
    )]
    pub stdout: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Output file name inside the output directory (overrides config).",
        conflicts_with = "stdout",
        help_heading = "Output Control"
    )]
    pub output_file: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub scan_overrides: ScanOverrides,

    #[arg(
        short = 's',
        long,
        value_name = "FILE",
        help = "Save the aggregated source text to FILE instead of printing it.",
        help_heading = "Output Control"
    )]
    pub save: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub scan_overrides: ScanOverrides,
}
