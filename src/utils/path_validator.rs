use crate::error::{PomupError, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_POM: &str = "pom.xml";

/// Path checks for the project directory and the POM inside it.
pub struct PathValidator;

impl PathValidator {
    /// Canonical project directory; system directories are refused.
    pub fn validate_project_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            PomupError::ProjectValidation(format!("Invalid path '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(PomupError::ProjectValidation(format!(
                "Path '{}' is not a directory",
                canonical.display()
            )));
        }

        const FORBIDDEN: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

        let forbidden = FORBIDDEN.iter().find(|forbidden| {
            let forbidden_path = Path::new(forbidden);
            path.starts_with(forbidden_path)
                || canonical.starts_with(forbidden_path)
                || forbidden_path
                    .canonicalize()
                    .is_ok_and(|resolved| canonical.starts_with(resolved))
        });
        if let Some(forbidden) = forbidden {
            return Err(PomupError::ProjectValidation(format!(
                "Access to system directory '{}' is not allowed",
                forbidden
            )));
        }

        Ok(canonical)
    }

    /// The POM to operate on: `file` relative to the project directory when
    /// given, otherwise `<project>/pom.xml`. It must exist and be a file.
    pub fn resolve_pom(project_dir: &Path, file: Option<&Path>) -> Result<PathBuf> {
        let candidate = match file {
            Some(file) if file.is_absolute() => file.to_path_buf(),
            Some(file) => project_dir.join(file),
            None => project_dir.join(DEFAULT_POM),
        };

        if !candidate.is_file() {
            return Err(PomupError::ProjectValidation(format!(
                "POM file '{}' not found",
                candidate.display()
            )));
        }

        candidate.canonicalize().map_err(|e| {
            PomupError::ProjectValidation(format!(
                "Invalid POM path '{}': {e}",
                candidate.display()
            ))
        })
    }
}
