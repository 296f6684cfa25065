use crate::error::{AppError, Result};
use log;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".archdoc";
pub const DEFAULT_CONFIG_FILENAME: &str = "archdoc.toml";
pub const DEFAULT_SYSTEM_INSTRUCTION_PATH: &str = "docs/templates/system_instruction.md";
pub const DEFAULT_OUTPUT_TEMPLATE_PATH: &str = "docs/templates/output_template.md";
pub const DEFAULT_ADR_DIR: &str = "docs/adr";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_OUTPUT_DIR: &str = "docs";
pub const DEFAULT_OUTPUT_FILENAME: &str = "AI_GENERATED.md";

const DEFAULT_EXCLUDED_DIRS: [&str; 4] = [".git", "docs", "node_modules", "vendor"];
const DEFAULT_EXTENSIONS: [&str; 7] = [".go", ".tf", ".yaml", ".py", ".md", ".ts", ".js"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Filters applied by the tree walker. Built once before a scan and only read afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory base names pruned wherever they appear.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: BTreeSet<String>,
    /// Admitted file extensions, leading dot included.
    #[serde(default = "default_extensions")]
    pub extensions: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    #[serde(default = "default_system_instruction_path")]
    pub system_instruction: PathBuf,
    #[serde(default = "default_output_template_path")]
    pub output_template: PathBuf,
    #[serde(default = "default_adr_dir")]
    pub adr_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_output_filename")]
    pub filename: String,
}

fn default_true() -> bool {
    true
}
fn default_excluded_dirs() -> BTreeSet<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}
fn default_extensions() -> BTreeSet<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}
fn default_system_instruction_path() -> PathBuf {
    PathBuf::from(DEFAULT_SYSTEM_INSTRUCTION_PATH)
}
fn default_output_template_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_TEMPLATE_PATH)
}
fn default_adr_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ADR_DIR)
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}
fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            extensions: default_extensions(),
            use_gitignore: default_true(),
        }
    }
}
impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_instruction: default_system_instruction_path(),
            output_template: default_output_template_path(),
            adr_dir: default_adr_dir(),
        }
    }
}
impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            filename: default_output_filename(),
        }
    }
}

impl OutputConfig {
    pub fn path_under(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.dir).join(&self.filename)
    }
}

impl ScanConfig {
    pub fn is_excluded_dir_name(&self, name: &str) -> bool {
        self.excluded_dirs.contains(name)
    }

    /// Extension check on the final path component. The extension is everything from the
    /// last `.` of the file name, so a file named `.md` has extension `.md`.
    pub fn is_whitelisted(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        match name.rfind('.') {
            Some(idx) => self.extensions.contains(&name[idx..]),
            None => false,
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve
            .canonicalize()
            .map_err(|e| AppError::RootAccess {
                path: path_to_resolve.clone(),
                source: e,
            })
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                let path = if path.is_absolute() || path.exists() {
                    path
                } else {
                    project_root.join(DEFAULT_CONFIG_DIR).join(&path)
                };
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = project_root
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(content)
            .map_err(|e| AppError::TomlParse(format!("{}. Check TOML syntax and structure.", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.scan.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(AppError::Config(format!(
                "Extension '{}' must include the leading dot (e.g. '.{}')",
                bad, bad
            )));
        }
        if let Some(bad) = self
            .scan
            .excluded_dirs
            .iter()
            .find(|d| d.is_empty() || d.contains(['/', '\\']))
        {
            return Err(AppError::Config(format!(
                "Excluded directory '{}' must be a plain directory name",
                bad
            )));
        }
        if self.generation.model.trim().is_empty() {
            return Err(AppError::Config("Generation model must not be empty".to_string()));
        }
        if self.generation.timeout_secs == 0 {
            return Err(AppError::Config(
                "Generation timeout must be greater than zero".to_string(),
            ));
        }
        if self.output.filename.trim().is_empty() {
            return Err(AppError::Config("Output filename must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn adr_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.prompt.adr_dir)
    }

    /// Renders the effective configuration in the same format it is loaded from.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn output_path(&self, project_root: &Path) -> PathBuf {
        self.output.path_under(project_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_sets() {
        let scan = ScanConfig::default();
        for dir in [".git", "docs", "node_modules", "vendor"] {
            assert!(scan.is_excluded_dir_name(dir), "{dir} should be excluded");
        }
        assert_eq!(scan.extensions.len(), 7);
        assert!(scan.use_gitignore);
    }

    #[test]
    fn whitelist_requires_known_extension() {
        let scan = ScanConfig::default();
        assert!(scan.is_whitelisted(Path::new("cmd/main.go")));
        assert!(scan.is_whitelisted(Path::new("infra/main.tf")));
        assert!(!scan.is_whitelisted(Path::new("secrets.env")));
        assert!(!scan.is_whitelisted(Path::new("Makefile")));
        assert!(!scan.is_whitelisted(Path::new("main.GO")));
        assert!(!scan.is_whitelisted(Path::new("notes.")));
    }

    #[test]
    fn whitelist_uses_suffix_after_last_dot() {
        let scan = ScanConfig::default();
        assert!(scan.is_whitelisted(Path::new(".md")));
        assert!(scan.is_whitelisted(Path::new("docs/.go")));
        assert!(scan.is_whitelisted(Path::new("bundle.min.js")));
        assert!(!scan.is_whitelisted(Path::new("release.tar.gz")));
        assert!(!scan.is_whitelisted(Path::new(".gitignore")));
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config = Config::from_toml_str(
            r#"
            [scan]
            extensions = [".rs"]

            [generation]
            model = "gemini-2.5-pro"
            "#,
        )
        .unwrap();
        assert_eq!(config.scan.extensions.len(), 1);
        assert!(config.scan.is_excluded_dir_name("vendor"));
        assert_eq!(config.generation.model, "gemini-2.5-pro");
        assert_eq!(config.generation.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[scan]\nfollow_links = true\n").unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
    }

    #[test]
    fn extension_without_dot_is_rejected() {
        let err = Config::from_toml_str("[scan]\nextensions = [\"go\"]\n").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn output_path_is_under_project_root() {
        let config = Config::default();
        assert_eq!(
            config.output_path(Path::new("/work/app")),
            PathBuf::from("/work/app/docs/AI_GENERATED.md")
        );
        assert_eq!(
            config.adr_dir(Path::new("/work/app")),
            PathBuf::from("/work/app/docs/adr")
        );
    }

    #[test]
    fn disabled_config_resolves_to_none() {
        let resolved = Config::resolve_config_path(Path::new("/nonexistent"), None, true).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn missing_default_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::resolve_config_path(dir.path(), None, false)
            .unwrap()
            .is_none());
    }

    #[test]
    fn config_file_found_in_default_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(DEFAULT_CONFIG_DIR);
        fs::create_dir_all(&cfg_dir).unwrap();
        fs::write(cfg_dir.join("custom.toml"), "[output]\nfilename = \"ARCH.md\"\n").unwrap();

        let name = "custom.toml".to_string();
        let path = Config::resolve_config_path(dir.path(), Some(&name), false)
            .unwrap()
            .unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.output.filename, "ARCH.md");
    }
}
