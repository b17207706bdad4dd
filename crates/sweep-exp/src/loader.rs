use std::fs;
use std::path::{Path, PathBuf};

use sweep_core::errors::{ErrorInfo, SweepError};
use sweep_core::ParameterSpec;
use tracing::debug;

/// Directory searched for experiment documents unless overridden.
pub const DEFAULT_EXPERIMENT_DIR: &str = "experiment";

/// Resolves experiment names to YAML documents under a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentLoader {
    dir: PathBuf,
}

impl Default for ExperimentLoader {
    fn default() -> Self {
        Self::new(DEFAULT_EXPERIMENT_DIR)
    }
}

impl ExperimentLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `name`: `<dir>/<name>.yaml`, or
    /// `<dir>/<name>` when the name already ends in `.yaml`/`.yml`.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let has_extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);
        if has_extension {
            self.dir.join(name)
        } else {
            self.dir.join(format!("{name}.yaml"))
        }
    }

    /// Loads and validates the experiment called `name`.
    pub fn load(&self, name: &str) -> Result<ParameterSpec, SweepError> {
        let path = self.resolve(name);
        if !path.is_file() {
            return Err(SweepError::SpecificationNotFound(
                ErrorInfo::new("spec-not-found", "experiment file not found")
                    .with_context("experiment", name)
                    .with_context("path", path.display().to_string()),
            ));
        }
        debug!(path = %path.display(), "loading experiment");
        let text = fs::read_to_string(&path).map_err(|err| {
            SweepError::InvalidSpecification(
                ErrorInfo::new("spec-read", "failed to read experiment file")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        ParameterSpec::from_yaml_str(&text)
            .map_err(|err| err.with_context("path", path.display().to_string()))
    }
}
