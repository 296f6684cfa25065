use crate::config::OutputConfig;
use crate::error::{AppError, Result};
use log;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the generated document below the project root, creating the output directory.
pub fn write_output(project_root: &Path, output: &OutputConfig, text: &str) -> Result<PathBuf> {
    let output_path = output.path_under(project_root);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(&output_path, text).map_err(|e| AppError::FileWrite {
        path: output_path.clone(),
        source: e,
    })?;
    log::info!(
        "Wrote {} bytes to {}",
        text.len(),
        output_path.display()
    );
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_output_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_output(dir.path(), &OutputConfig::default(), "# Generated\n").unwrap();
        assert_eq!(path, dir.path().join("docs").join("AI_GENERATED.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), "# Generated\n");
    }

    #[test]
    fn overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        write_output(dir.path(), &OutputConfig::default(), "old").unwrap();
        let path = write_output(dir.path(), &OutputConfig::default(), "new").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn honours_custom_directory_and_filename() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            dir: PathBuf::from("site/arch"),
            filename: "OVERVIEW.md".to_string(),
        };
        let path = write_output(dir.path(), &output, "x").unwrap();
        assert_eq!(path, dir.path().join("site").join("arch").join("OVERVIEW.md"));
        assert!(path.is_file());
    }
}
